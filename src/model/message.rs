//! Parsed message and its header metadata.

use chrono::{DateTime, Utc};

use super::address::EmailAddress;
use super::part::MessagePart;

/// Header metadata shown on the message page and used for sort order.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct MessageMeta {
    /// Decoded subject line (RFC 2047 encoded-words resolved).
    pub subject: String,

    /// Sender (first `From:` header).
    pub from: EmailAddress,

    /// Primary recipients (`To:`).
    pub to: Vec<EmailAddress>,

    /// Carbon-copy recipients (`CC:`).
    pub cc: Vec<EmailAddress>,

    /// Parsed `Date:` header, `None` if missing or unparseable.
    pub date: Option<DateTime<Utc>>,

    /// The `Message-ID` header value.
    pub message_id: String,
}

/// A message turned into an owned part tree plus its metadata.
#[derive(Debug, Clone)]
pub struct ParsedMessage {
    pub meta: MessageMeta,
    pub root: MessagePart,
}

impl ParsedMessage {
    /// Every leaf that is materialized instead of displayed: attachments
    /// first, then inline parts, each group in document order.
    pub fn attachment_parts(&self) -> Vec<&MessagePart> {
        let mut attachments = Vec::new();
        let mut inlines = Vec::new();
        collect_attachments(&self.root, &mut attachments, &mut inlines);
        attachments.append(&mut inlines);
        attachments
    }
}

fn collect_attachments<'a>(
    part: &'a MessagePart,
    attachments: &mut Vec<&'a MessagePart>,
    inlines: &mut Vec<&'a MessagePart>,
) {
    if part.is_multipart() {
        for child in &part.children {
            collect_attachments(child, attachments, inlines);
        }
        return;
    }

    if part.is_body_candidate() {
        return;
    }

    if part.disposition == "inline" {
        inlines.push(part);
    } else {
        attachments.push(part);
    }
}
