//! HTML page rendering for messages, listings and errors.
//!
//! Every page is a self-contained document with inline styles, so the
//! output tree can be opened straight from disk.

pub mod listing;
pub mod message;

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

/// Characters escaped in a relative link's path segments.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'\'')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

const STYLE: &str = "\
body { font-family: sans-serif; margin: 0 auto; max-width: 60em; padding: 1em; }
nav.links { margin-bottom: 1em; }
nav.links a { margin-right: 1em; }
table { border-collapse: collapse; width: 100%; }
table.headers th { text-align: right; vertical-align: top; padding-right: 1em; width: 6em; }
table.listing td, table.listing th { border-bottom: 1px solid #ddd; padding: 0.3em; text-align: left; }
iframe.body { border: 1px solid #ddd; width: 100%; height: 40em; margin-top: 1em; }
.size { color: #777; }
.error { color: #b00; }
.empty { color: #777; font-style: italic; }
";

/// Links from one page to its neighbours, relative to the page itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Navigation {
    pub prev: Option<String>,
    pub next: Option<String>,
    pub parent: Option<String>,
}

impl Navigation {
    /// Navigation with only an "up" link.
    pub fn with_parent(parent: impl Into<String>) -> Self {
        Self {
            parent: Some(parent.into()),
            ..Self::default()
        }
    }
}

/// Escape text for use in element content or a quoted attribute.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Turn a relative file path into an `href` value, percent-encoding each segment.
pub fn href(path: &str) -> String {
    path.split('/')
        .map(|segment| utf8_percent_encode(segment, SEGMENT).to_string())
        .collect::<Vec<_>>()
        .join("/")
}

/// Wrap `body` in a complete document with the navigation bar on top.
pub(crate) fn page(title: &str, nav: &Navigation, body: &str) -> String {
    let mut html = String::with_capacity(body.len() + STYLE.len() + 512);
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{}</title>\n", escape_html(title)));
    html.push_str(&format!("<style>\n{STYLE}</style>\n</head>\n<body>\n"));
    html.push_str(&nav_bar(nav));
    html.push_str(body);
    html.push_str("</body>\n</html>\n");
    html
}

fn nav_bar(nav: &Navigation) -> String {
    let links: Vec<String> = [
        (&nav.parent, "Up"),
        (&nav.prev, "Previous"),
        (&nav.next, "Next"),
    ]
    .into_iter()
    .filter_map(|(target, label)| {
        target
            .as_deref()
            .map(|t| format!("<a href=\"{}\">{label}</a>", escape_html(&href(t))))
    })
    .collect();

    if links.is_empty() {
        String::new()
    } else {
        format!("<nav class=\"links\">{}</nav>\n", links.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("<a href=\"x\">Tom & 'Jerry'</a>"),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_href_encodes_segments() {
        assert_eq!(href("attachments/report (1).pdf"), "attachments/report%20(1).pdf");
        assert_eq!(href("../a#b/index.html"), "../a%23b/index.html");
        assert_eq!(href("café.eml/index.html"), "caf%C3%A9.eml/index.html");
    }

    #[test]
    fn test_nav_bar_skips_missing_links() {
        assert_eq!(nav_bar(&Navigation::default()), "");

        let nav = Navigation {
            prev: Some("../a.eml/index.html".into()),
            next: None,
            parent: Some("../index.html".into()),
        };
        let bar = nav_bar(&nav);
        assert!(bar.contains("<a href=\"../index.html\">Up</a>"));
        assert!(bar.contains("<a href=\"../a.eml/index.html\">Previous</a>"));
        assert!(!bar.contains("Next"));
    }

    #[test]
    fn test_page_escapes_title() {
        let html = page("<script>", &Navigation::default(), "<p>x</p>\n");
        assert!(html.contains("<title>&lt;script&gt;</title>"));
        assert!(html.contains("<p>x</p>"));
        assert!(html.starts_with("<!DOCTYPE html>"));
    }
}
