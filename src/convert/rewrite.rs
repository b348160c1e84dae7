//! Rewrite an HTML body so it works once written out on its own.
//!
//! Two things are fixed up on the parsed DOM:
//! - `<meta>` charset declarations, because every body is written as UTF-8
//! - `src="cid:…"` references, which are pointed at the extracted attachment files

use html5ever::serialize::{serialize, SerializeOpts};
use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::{parse_document, Attribute, LocalName, Namespace, QualName};
use markup5ever_rcdom::{Handle, NodeData, RcDom, SerializableHandle};

use crate::error::{ConvertError, Result};
use crate::model::attachment::ContentIdMap;

const CID_PREFIX: &str = "cid:";

/// Relative location of the attachments directory, seen from a content artifact.
const ATTACHMENTS_FROM_CONTENT: &str = "../attachments/";

/// Parse `html`, rewrite charset declarations and `cid:` references, and
/// serialize it back.
///
/// Callers fall back to the original bytes when this fails.
pub fn rewrite_html(cids: &ContentIdMap, html: &[u8]) -> Result<Vec<u8>> {
    let dom = parse_document(RcDom::default(), Default::default())
        .from_utf8()
        .read_from(&mut &html[..])
        .map_err(|e| ConvertError::HtmlParse(e.to_string()))?;

    rewrite_node(&dom.document, cids);

    let document: SerializableHandle = dom.document.clone().into();
    let mut out = Vec::with_capacity(html.len());
    serialize(&mut out, &document, SerializeOpts::default())
        .map_err(|e| ConvertError::HtmlParse(e.to_string()))?;
    Ok(out)
}

fn rewrite_node(handle: &Handle, cids: &ContentIdMap) {
    if let NodeData::Element {
        ref name,
        ref attrs,
        ..
    } = handle.data
    {
        let mut attrs = attrs.borrow_mut();
        if &*name.local == "meta" {
            normalize_charset(&mut attrs);
        }
        rewrite_sources(&mut attrs, cids);
    }

    for child in handle.children.borrow().iter() {
        rewrite_node(child, cids);
    }
}

/// Replace any charset declaration on a `<meta>` element with UTF-8.
///
/// The element keeps only the attributes needed for the declaration. If an
/// element carries both forms, the one appearing last wins.
fn normalize_charset(attrs: &mut Vec<Attribute>) {
    let mut replacement = None;

    for attr in attrs.iter() {
        let key = &*attr.name.local;
        if key.eq_ignore_ascii_case("http-equiv") && attr.value.eq_ignore_ascii_case("content-type")
        {
            replacement = Some(vec![
                attribute("http-equiv", "Content-Type"),
                attribute("content", "text/html; charset=utf-8"),
            ]);
        }
        if key.eq_ignore_ascii_case("charset") {
            replacement = Some(vec![attribute("charset", "utf-8")]);
        }
    }

    if let Some(replacement) = replacement {
        *attrs = replacement;
    }
}

/// Point `src="cid:<id>"` at the file registered for `<id>`; unknown ids are left alone.
fn rewrite_sources(attrs: &mut [Attribute], cids: &ContentIdMap) {
    for attr in attrs.iter_mut() {
        let key: &str = &attr.name.local;
        if !key.eq_ignore_ascii_case("src") {
            continue;
        }
        let Some(id) = attr.value.strip_prefix(CID_PREFIX) else {
            continue;
        };
        if let Some(file_name) = cids.get(id) {
            attr.value = StrTendril::from(format!("{ATTACHMENTS_FROM_CONTENT}{file_name}"));
        }
    }
}

fn attribute(name: &str, value: &str) -> Attribute {
    Attribute {
        name: QualName::new(None, Namespace::from(""), LocalName::from(name)),
        value: StrTendril::from(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rewrite(cids: &[(&str, &str)], html: &str) -> String {
        let map: ContentIdMap = cids
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        String::from_utf8(rewrite_html(&map, html.as_bytes()).expect("rewrite")).expect("utf-8")
    }

    #[test]
    fn test_cid_reference_is_rewritten() {
        let out = rewrite(&[("img1", "photo.png")], "<img src=\"cid:img1\">");
        assert!(out.contains("<img src=\"../attachments/photo.png\">"), "{out}");
    }

    #[test]
    fn test_unknown_cid_is_untouched() {
        let out = rewrite(&[("img1", "photo.png")], "<img src=\"cid:missing\">");
        assert!(out.contains("<img src=\"cid:missing\">"), "{out}");
    }

    #[test]
    fn test_cid_lookup_is_case_sensitive() {
        let out = rewrite(&[("img1", "photo.png")], "<img SRC=\"cid:IMG1\">");
        assert!(out.contains("src=\"cid:IMG1\""), "{out}");
    }

    #[test]
    fn test_uppercase_src_attribute_matches() {
        let out = rewrite(&[("logo@x", "logo (1).png")], "<IMG SRC=\"cid:logo@x\" ALT=\"Logo\">");
        assert!(
            out.contains("<img src=\"../attachments/logo (1).png\" alt=\"Logo\">"),
            "{out}"
        );
    }

    #[test]
    fn test_non_src_attributes_are_untouched() {
        let out = rewrite(&[("img1", "photo.png")], "<a href=\"cid:img1\">x</a>");
        assert!(out.contains("<a href=\"cid:img1\">x</a>"), "{out}");
    }

    #[test]
    fn test_http_equiv_charset_is_normalized() {
        let out = rewrite(
            &[],
            "<html><head><meta http-equiv=\"content-type\" content=\"text/html; charset=iso-8859-1\" id=\"m\"></head><body>x</body></html>",
        );
        assert!(
            out.contains("<meta http-equiv=\"Content-Type\" content=\"text/html; charset=utf-8\">"),
            "{out}"
        );
        assert!(!out.contains("iso-8859-1"));
    }

    #[test]
    fn test_meta_charset_is_normalized() {
        let out = rewrite(
            &[],
            "<html><head><meta charset=\"windows-1252\" class=\"c\"></head><body>x</body></html>",
        );
        assert!(out.contains("<meta charset=\"utf-8\">"), "{out}");
        assert!(!out.contains("class"));
    }

    #[test]
    fn test_other_meta_is_untouched() {
        let out = rewrite(
            &[],
            "<html><head><meta name=\"viewport\" content=\"width=device-width\"></head><body></body></html>",
        );
        assert!(out.contains("<meta name=\"viewport\" content=\"width=device-width\">"));
    }

    #[test]
    fn test_roundtrip_without_references() {
        let html = "<html><head><title>Hi</title></head><body><p class=\"a\" id=\"b\">Hello <b>world</b></p></body></html>";
        assert_eq!(rewrite(&[], html), html);
    }
}
