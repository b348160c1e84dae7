//! Body selection: pick the displayable plain-text or HTML payloads out of a part tree.

use crate::model::part::{
    MessagePart, MULTIPART_ALTERNATIVE, MULTIPART_RELATED, MULTIPART_REPORT,
};

/// How a container's children relate to each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MultipartKind {
    /// Mutually exclusive renderings of one body; pick one.
    Alternative,
    /// A body bundled with its inline resources; pick one.
    Related,
    /// Delivery/disposition reports; narrow fixed structure.
    Report,
    /// `multipart/mixed` and every unknown subtype; collect everything.
    Mixed,
}

impl MultipartKind {
    fn of(content_type: &str) -> Self {
        match content_type {
            MULTIPART_ALTERNATIVE => Self::Alternative,
            MULTIPART_RELATED => Self::Related,
            MULTIPART_REPORT => Self::Report,
            _ => Self::Mixed,
        }
    }
}

/// Select the payloads that make up the body of type `target` (`text/plain`
/// or `text/html`), in document order.
///
/// An empty result means the part has no such body; that is not an error.
pub fn select_body<'a>(part: &'a MessagePart, target: &str) -> Vec<&'a [u8]> {
    if part.content_type == target {
        return vec![part.content.as_slice()];
    }
    if !part.is_multipart() {
        return Vec::new();
    }

    match MultipartKind::of(&part.content_type) {
        MultipartKind::Alternative => direct_child(part, target)
            .or_else(|| first_nested(part, target, |c| c.content_type == MULTIPART_RELATED))
            .or_else(|| first_nested(part, target, MessagePart::is_multipart))
            .unwrap_or_default(),
        MultipartKind::Related => direct_child(part, target)
            .or_else(|| first_nested(part, target, |c| c.content_type == MULTIPART_ALTERNATIVE))
            .or_else(|| first_nested(part, target, MessagePart::is_multipart))
            .unwrap_or_default(),
        MultipartKind::Report => direct_child(part, target)
            .or_else(|| first_nested(part, target, |c| c.content_type == MULTIPART_RELATED))
            .unwrap_or_default(),
        MultipartKind::Mixed => {
            let mut body = Vec::new();
            for child in &part.children {
                if child.content_type == target {
                    body.push(child.content.as_slice());
                } else if child.is_multipart() {
                    body.extend(select_body(child, target));
                }
            }
            body
        }
    }
}

/// The first direct child of type `target`.
fn direct_child<'a>(part: &'a MessagePart, target: &str) -> Option<Vec<&'a [u8]>> {
    part.children
        .iter()
        .find(|c| c.content_type == target)
        .map(|c| vec![c.content.as_slice()])
}

/// Recurse into the first child accepted by `pick`, if that yields anything.
fn first_nested<'a>(
    part: &'a MessagePart,
    target: &str,
    pick: impl Fn(&MessagePart) -> bool,
) -> Option<Vec<&'a [u8]>> {
    part.children
        .iter()
        .find(|&c| pick(c))
        .map(|c| select_body(c, target))
        .filter(|body| !body.is_empty())
}
