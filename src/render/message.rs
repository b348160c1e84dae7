//! Message and error pages.

use humansize::{format_size, BINARY};

use super::{escape_html, href, page, Navigation};
use crate::convert::message::{ContentFiles, CONTENT_DIR};
use crate::model::address::EmailAddress;
use crate::model::attachment::AttachmentLink;
use crate::model::message::MessageMeta;

/// Everything shown on a message's `index.html`.
pub struct MessagePage<'a> {
    /// Directory name of the message, used as a fallback title.
    pub name: &'a str,
    pub meta: &'a MessageMeta,
    pub content: &'a ContentFiles,
    pub attachments: &'a [AttachmentLink],
    pub nav: &'a Navigation,
    /// File name of the copied original message, if one was kept.
    pub original: Option<&'a str>,
}

/// Render a message page: headers, body frames, attachment list.
pub fn message_page(msg: &MessagePage<'_>) -> String {
    let meta = msg.meta;
    let title = if meta.subject.is_empty() {
        msg.name
    } else {
        meta.subject.as_str()
    };

    let mut body = String::new();
    body.push_str(&format!("<h1>{}</h1>\n", escape_html(title)));

    body.push_str("<table class=\"headers\">\n");
    if !meta.from.address.is_empty() || !meta.from.display_name.is_empty() {
        header_row(&mut body, "From", &meta.from.display());
    }
    if !meta.to.is_empty() {
        header_row(&mut body, "To", &join_addresses(&meta.to));
    }
    if !meta.cc.is_empty() {
        header_row(&mut body, "Cc", &join_addresses(&meta.cc));
    }
    if let Some(date) = meta.date {
        header_row(
            &mut body,
            "Date",
            &date.format("%a, %d %b %Y %H:%M:%S %z").to_string(),
        );
    }
    header_row(&mut body, "Subject", &meta.subject);
    if !meta.message_id.is_empty() {
        header_row(&mut body, "Message-ID", &meta.message_id);
    }
    body.push_str("</table>\n");

    body.push_str("<section class=\"content\">\n");
    if msg.content.is_empty() {
        body.push_str("<p class=\"empty\">This message has no displayable body.</p>\n");
    }
    // HTML first, plain text as the secondary rendering
    for file in &msg.content.html {
        body.push_str(&format!(
            "<iframe class=\"body\" sandbox src=\"{}\"></iframe>\n",
            escape_html(&href(&format!("{CONTENT_DIR}/{file}")))
        ));
    }
    for file in &msg.content.text {
        body.push_str(&format!(
            "<iframe class=\"body text\" src=\"{}\"></iframe>\n",
            escape_html(&href(&format!("{CONTENT_DIR}/{file}")))
        ));
    }
    body.push_str("</section>\n");

    if !msg.attachments.is_empty() {
        body.push_str("<section class=\"attachments\">\n<h2>Attachments</h2>\n<ul>\n");
        for att in msg.attachments {
            body.push_str(&format!(
                "<li><a href=\"{}\">{}</a> <span class=\"size\">({})</span>",
                escape_html(&href(&att.link)),
                escape_html(&att.name),
                format_size(att.size, BINARY)
            ));
            if let Some(error) = &att.error {
                body.push_str(&format!(" <span class=\"error\">{}</span>", escape_html(error)));
            }
            body.push_str("</li>\n");
        }
        body.push_str("</ul>\n</section>\n");
    }

    if let Some(original) = msg.original {
        body.push_str(&format!(
            "<p class=\"original\"><a href=\"{}\">Original message</a></p>\n",
            escape_html(&href(original))
        ));
    }

    page(title, msg.nav, &body)
}

/// Render the page shown in place of a message that could not be converted.
pub fn error_page(name: &str, error: &str, nav: &Navigation) -> String {
    let body = format!(
        "<h1>{}</h1>\n<p class=\"error\">This message could not be converted.</p>\n<pre class=\"error\">{}</pre>\n",
        escape_html(name),
        escape_html(error)
    );
    page(name, nav, &body)
}

fn header_row(out: &mut String, label: &str, value: &str) {
    out.push_str(&format!(
        "<tr><th>{label}</th><td>{}</td></tr>\n",
        escape_html(value)
    ));
}

fn join_addresses(addrs: &[EmailAddress]) -> String {
    addrs
        .iter()
        .map(EmailAddress::display)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn meta() -> MessageMeta {
        MessageMeta {
            subject: "Q3 <numbers>".into(),
            from: EmailAddress::parse("Alice <alice@example.com>"),
            to: EmailAddress::parse_list("bob@example.com, Carol <carol@example.com>"),
            date: Utc.with_ymd_and_hms(2024, 1, 8, 12, 0, 0).single(),
            message_id: "<q3@example.com>".into(),
            ..MessageMeta::default()
        }
    }

    #[test]
    fn test_message_page_headers_and_bodies() {
        let meta = meta();
        let content = ContentFiles {
            text: vec!["q3.txt".into()],
            html: vec!["q3.html".into()],
        };
        let attachments = vec![AttachmentLink {
            name: "report (1).pdf".into(),
            link: "attachments/report (1).pdf".into(),
            size: 2048,
            error: None,
        }];
        let nav = Navigation::with_parent("../index.html");
        let html = message_page(&MessagePage {
            name: "q3.eml",
            meta: &meta,
            content: &content,
            attachments: &attachments,
            nav: &nav,
            original: Some("q3.eml"),
        });

        assert!(html.contains("<title>Q3 &lt;numbers&gt;</title>"));
        assert!(html.contains("Alice &lt;alice@example.com&gt;"));
        assert!(html.contains("bob@example.com, Carol &lt;carol@example.com&gt;"));
        assert!(html.contains("Mon, 08 Jan 2024 12:00:00 +0000"));
        assert!(html.contains("src=\"content/q3.html\""));
        assert!(html.contains("src=\"content/q3.txt\""));
        assert!(html.contains("href=\"attachments/report%20(1).pdf\""));
        assert!(html.contains("2 KiB"));
        assert!(html.contains("href=\"q3.eml\""));
        assert!(html.contains("<th>Message-ID</th><td>&lt;q3@example.com&gt;</td>"));
        assert!(!html.contains("<th>Cc</th>"));
    }

    #[test]
    fn test_message_page_without_body() {
        let meta = MessageMeta::default();
        let html = message_page(&MessagePage {
            name: "empty.eml",
            meta: &meta,
            content: &ContentFiles::default(),
            attachments: &[],
            nav: &Navigation::default(),
            original: None,
        });

        assert!(html.contains("<title>empty.eml</title>"));
        assert!(html.contains("no displayable body"));
        assert!(!html.contains("Attachments"));
        assert!(!html.contains("Original message"));
        assert!(!html.contains("<th>Message-ID</th>"));
    }

    #[test]
    fn test_attachment_error_is_shown() {
        let meta = MessageMeta::default();
        let attachments = vec![AttachmentLink {
            name: "attached.eml".into(),
            link: "attachments/attached.eml/index.html".into(),
            size: 10,
            error: Some("Unable to parse message: empty message".into()),
        }];
        let html = message_page(&MessagePage {
            name: "fwd.eml",
            meta: &meta,
            content: &ContentFiles::default(),
            attachments: &attachments,
            nav: &Navigation::default(),
            original: None,
        });

        assert!(html.contains("<span class=\"error\">Unable to parse message: empty message</span>"));
    }

    #[test]
    fn test_error_page() {
        let html = error_page("bad.eml", "I/O error <x>", &Navigation::with_parent("../index.html"));
        assert!(html.contains("<h1>bad.eml</h1>"));
        assert!(html.contains("I/O error &lt;x&gt;"));
        assert!(html.contains("href=\"../index.html\""));
    }
}
