use criterion::{criterion_group, criterion_main, Criterion};
use std::path::Path;

use emlhtml::convert::rewrite::rewrite_html;
use emlhtml::convert::select::select_body;
use emlhtml::model::attachment::ContentIdMap;
use emlhtml::model::part::TEXT_HTML;
use emlhtml::parser::mime::parse_message;

fn fixture(name: &str) -> Vec<u8> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    std::fs::read(path).unwrap()
}

fn bench_parse_and_select(c: &mut Criterion) {
    let raw = fixture("related.eml");

    c.bench_function("parse_and_select_related", |b| {
        b.iter(|| {
            let msg = parse_message(&raw).unwrap();
            select_body(&msg.root, TEXT_HTML).len()
        })
    });
}

fn bench_rewrite(c: &mut Criterion) {
    let raw = fixture("related.eml");
    let msg = parse_message(&raw).unwrap();
    let html = select_body(&msg.root, TEXT_HTML)[0].to_vec();
    let cids: ContentIdMap = [("logo@example.com".to_string(), "logo.png".to_string())].into();

    c.bench_function("rewrite_related_html", |b| {
        b.iter(|| rewrite_html(&cids, &html).unwrap())
    });
}

fn bench_convert_tree(c: &mut Criterion) {
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures");
    let options = emlhtml::config::ConvertConfig::default();
    let plan = emlhtml::convert::plan(&fixtures, &options).unwrap();

    c.bench_function("convert_fixture_tree", |b| {
        b.iter(|| {
            let out = tempfile::tempdir().unwrap();
            emlhtml::convert::convert_plan(&plan, out.path(), &options, &|_, _| {}).unwrap()
        })
    });
}

criterion_group!(benches, bench_parse_and_select, bench_rewrite, bench_convert_tree);
criterion_main!(benches);
