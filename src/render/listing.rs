//! Directory listing pages.

use super::{escape_html, href, page, Navigation};
use crate::model::message::MessageMeta;

/// One row of a listing, in display order.
pub struct ListingRow<'a> {
    /// Entry name; the row links to `<name>/index.html`.
    pub name: &'a str,
    pub kind: RowKind<'a>,
}

pub enum RowKind<'a> {
    Directory,
    Message(&'a MessageMeta),
    Failed(&'a str),
}

/// Render the `index.html` of a directory.
pub fn listing_page(title: &str, rows: &[ListingRow<'_>], nav: &Navigation) -> String {
    let title = if title.is_empty() { "Messages" } else { title };

    let mut body = format!("<h1>{}</h1>\n", escape_html(title));
    if rows.is_empty() {
        body.push_str("<p class=\"empty\">No messages.</p>\n");
        return page(title, nav, &body);
    }

    body.push_str("<table class=\"listing\">\n");
    body.push_str("<tr><th>Date</th><th>From</th><th>Subject</th></tr>\n");
    for row in rows {
        let link = escape_html(&href(&format!("{}/index.html", row.name)));
        let (date, from, label, class) = match &row.kind {
            RowKind::Directory => (String::new(), String::new(), format!("{}/", row.name), "dir"),
            RowKind::Message(meta) => (
                meta.date
                    .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_default(),
                meta.from.display(),
                if meta.subject.is_empty() {
                    row.name.to_string()
                } else {
                    meta.subject.clone()
                },
                "message",
            ),
            RowKind::Failed(error) => (
                String::new(),
                String::new(),
                format!("{}: {error}", row.name),
                "error",
            ),
        };
        body.push_str(&format!(
            "<tr class=\"{class}\"><td>{}</td><td>{}</td><td><a href=\"{link}\">{}</a></td></tr>\n",
            escape_html(&date),
            escape_html(&from),
            escape_html(&label)
        ));
    }
    body.push_str("</table>\n");

    page(title, nav, &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::address::EmailAddress;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_listing_rows() {
        let meta = MessageMeta {
            subject: "Hello & welcome".into(),
            from: EmailAddress::parse("alice@example.com"),
            date: Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).single(),
            ..MessageMeta::default()
        };
        let rows = vec![
            ListingRow { name: "archive", kind: RowKind::Directory },
            ListingRow { name: "hello world.eml", kind: RowKind::Message(&meta) },
            ListingRow { name: "bad.eml", kind: RowKind::Failed("Unable to parse message") },
        ];

        let html = listing_page("inbox", &rows, &Navigation::with_parent("../index.html"));

        assert!(html.contains("<h1>inbox</h1>"));
        assert!(html.contains("href=\"archive/index.html\">archive/</a>"));
        assert!(html.contains("href=\"hello%20world.eml/index.html\">Hello &amp; welcome</a>"));
        assert!(html.contains("2024-03-01 09:30"));
        assert!(html.contains("alice@example.com"));
        assert!(html.contains("<tr class=\"error\">"));
        assert!(html.contains("bad.eml: Unable to parse message"));
    }

    #[test]
    fn test_empty_listing() {
        let html = listing_page("", &[], &Navigation::default());
        assert!(html.contains("<title>Messages</title>"));
        assert!(html.contains("No messages."));
        assert!(!html.contains("<nav"));
    }
}
