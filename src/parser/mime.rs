//! MIME message parsing: part-tree construction and HTML-to-text conversion.

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use mail_parser::{MessageParser, MimeHeaders, PartType};
use markup5ever_rcdom::{Handle, NodeData, RcDom};

use crate::error::{ConvertError, Result};
use crate::model::message::ParsedMessage;
use crate::model::part::{MessagePart, MESSAGE_RFC822, MULTIPART_MIXED, TEXT_PLAIN};
use crate::parser::eml::find_header_end;
use crate::parser::header;

/// Maximum depth for recursive multipart descent (to prevent stack overflow on adversarial input).
const MAX_DEPTH: usize = 64;

/// Parse a complete raw message (headers + body) into an owned part tree.
///
/// Uses `mail-parser` for tokenizing and transfer/charset decoding.
pub fn parse_message(raw: &[u8]) -> Result<ParsedMessage> {
    let message_bytes = skip_from_line(raw);
    if message_bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(ConvertError::MessageParse("empty message".into()));
    }

    let parsed = MessageParser::default()
        .parse(message_bytes)
        .filter(|msg| !msg.parts.is_empty())
        .ok_or_else(|| ConvertError::MessageParse("no headers or body found".into()))?;

    let header_end = find_header_end(message_bytes).unwrap_or(message_bytes.len());
    let meta = header::parse_meta(&message_bytes[..header_end]);
    let root = build_part(&parsed, 0, 0);

    Ok(ParsedMessage { meta, root })
}

/// Convert the part with index `id` (and everything below it) into a [`MessagePart`].
fn build_part(msg: &mail_parser::Message<'_>, id: usize, depth: usize) -> MessagePart {
    let Some(part) = msg.parts.get(id) else {
        return MessagePart::default();
    };

    let mut node = MessagePart {
        content_type: content_type_of(part),
        file_name: part.attachment_name().unwrap_or_default().to_string(),
        content_id: part.content_id().unwrap_or_default().to_string(),
        disposition: part
            .content_disposition()
            .map(|d| d.ctype().to_ascii_lowercase())
            .unwrap_or_default(),
        ..MessagePart::default()
    };

    match &part.body {
        PartType::Multipart(ids) => {
            if depth >= MAX_DEPTH {
                tracing::warn!(depth, "Multipart nesting too deep, ignoring children");
            } else {
                node.children = ids
                    .iter()
                    .map(|&child| build_part(msg, child, depth + 1))
                    .collect();
            }
        }
        PartType::Message(inner) => node.content = inner.raw_message().to_vec(),
        _ => node.content = part.contents().to_vec(),
    }

    node
}

/// Lower-cased `type/subtype` of a part, with RFC 2045 style defaults.
fn content_type_of(part: &mail_parser::MessagePart<'_>) -> String {
    match part.content_type() {
        Some(ct) => {
            let full = match ct.subtype() {
                Some(sub) => format!("{}/{}", ct.ctype(), sub),
                None => ct.ctype().to_string(),
            };
            full.to_ascii_lowercase()
        }
        None => match part.body {
            PartType::Multipart(_) => MULTIPART_MIXED.to_string(),
            PartType::Message(_) => MESSAGE_RFC822.to_string(),
            _ => TEXT_PLAIN.to_string(),
        },
    }
}

/// Skip a BOM and the `From ` separator line some tools leave at the top of `.eml` files.
fn skip_from_line(data: &[u8]) -> &[u8] {
    let data = data.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(data);

    if data.starts_with(b"From ") {
        if let Some(pos) = data.iter().position(|&b| b == b'\n') {
            return &data[pos + 1..];
        }
    }
    data
}

/// Convert HTML to plain text.
///
/// Used to decide whether an HTML body carries any visible text at all. The
/// body goes through the HTML5 parser, so every named and numeric entity is
/// decoded the way a browser would.
///
/// - Preserves line breaks from `<br>`, `<p>`, `<div>` and friends
/// - Drops the document head, scripts, styles and templates
/// - Trims whitespace and zero-width characters from every line
/// - Collapses runs of blank lines
pub fn html_to_text(html: &str) -> String {
    let dom = parse_document(RcDom::default(), Default::default()).one(html);
    let mut raw = String::with_capacity(html.len());
    collect_text(&dom.document, &mut raw);

    let mut prev_was_blank = false;
    let mut cleaned = String::with_capacity(raw.len());
    for line in raw.lines() {
        let trimmed = line.trim_matches(|c: char| c.is_whitespace() || is_invisible(c));
        if trimmed.is_empty() {
            if !prev_was_blank {
                cleaned.push('\n');
                prev_was_blank = true;
            }
        } else {
            cleaned.push_str(trimmed);
            cleaned.push('\n');
            prev_was_blank = false;
        }
    }

    cleaned.trim().to_string()
}

/// Elements whose text is never shown.
const HIDDEN_TAGS: &[&str] = &["head", "script", "style", "template", "title", "noscript"];

/// Elements that start a new line.
const BLOCK_TAGS: &[&str] = &[
    "br", "p", "div", "tr", "li", "h1", "h2", "h3", "h4", "h5", "h6", "table", "blockquote", "pre",
    "hr",
];

/// Append the text below `handle` to `out`.
fn collect_text(handle: &Handle, out: &mut String) {
    match &handle.data {
        NodeData::Text { contents } => out.push_str(&contents.borrow()),
        NodeData::Element { name, .. } => {
            let tag: &str = &name.local;
            if HIDDEN_TAGS.contains(&tag) {
                return;
            }
            let block = BLOCK_TAGS.contains(&tag);
            if block {
                out.push('\n');
            }
            for child in handle.children.borrow().iter() {
                collect_text(child, out);
            }
            if block {
                out.push('\n');
            }
        }
        NodeData::Document => {
            for child in handle.children.borrow().iter() {
                collect_text(child, out);
            }
        }
        _ => {}
    }
}

/// Format characters that take no space on screen.
fn is_invisible(c: char) -> bool {
    matches!(
        c,
        '\u{00AD}' | '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{2060}' | '\u{FEFF}'
    )
}
