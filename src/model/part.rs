//! The owned MIME part tree consumed by body selection and materialization.

/// `text/plain`
pub const TEXT_PLAIN: &str = "text/plain";
/// `text/html`
pub const TEXT_HTML: &str = "text/html";
/// `message/rfc822`
pub const MESSAGE_RFC822: &str = "message/rfc822";

pub const MULTIPART_PREFIX: &str = "multipart/";
pub const MULTIPART_ALTERNATIVE: &str = "multipart/alternative";
pub const MULTIPART_MIXED: &str = "multipart/mixed";
pub const MULTIPART_RELATED: &str = "multipart/related";
pub const MULTIPART_REPORT: &str = "multipart/report";

/// One node of a parsed message.
///
/// A part is either a container (`multipart/*`, with children and no
/// content) or a leaf (content, no children). Embedded `message/rfc822`
/// parts are leaves holding the raw embedded message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessagePart {
    /// Lower-cased `type/subtype`, without parameters.
    pub content_type: String,

    /// Decoded payload (leaf parts only).
    pub content: Vec<u8>,

    /// Child parts in document order (container parts only).
    pub children: Vec<MessagePart>,

    /// Attachment file name from `Content-Disposition` or `Content-Type`, may be empty.
    pub file_name: String,

    /// Content-ID as found in the headers, may be empty.
    pub content_id: String,

    /// Lower-cased disposition type (`inline`, `attachment`), may be empty.
    pub disposition: String,
}

impl MessagePart {
    /// Build a leaf part.
    pub fn leaf(content_type: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            content_type: content_type.into(),
            content: content.into(),
            ..Self::default()
        }
    }

    /// Build a container part.
    pub fn container(content_type: impl Into<String>, children: Vec<MessagePart>) -> Self {
        Self {
            content_type: content_type.into(),
            children,
            ..Self::default()
        }
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    pub fn with_content_id(mut self, content_id: impl Into<String>) -> Self {
        self.content_id = content_id.into();
        self
    }

    pub fn with_disposition(mut self, disposition: impl Into<String>) -> Self {
        self.disposition = disposition.into();
        self
    }

    /// `true` for `multipart/*` containers.
    pub fn is_multipart(&self) -> bool {
        self.content_type.starts_with(MULTIPART_PREFIX)
    }

    /// `true` if this part carries a whole message that must be converted on its own.
    ///
    /// Some mailers label forwarded messages as `mime-attachment` or give them
    /// a bare `.eml…` name instead of the proper content type.
    pub fn is_embedded_message(&self) -> bool {
        self.content_type == MESSAGE_RFC822
            || self.file_name == "mime-attachment"
            || self.file_name.starts_with(".eml")
    }

    /// `true` if the part is a candidate for the displayed body rather than an attachment.
    pub fn is_body_candidate(&self) -> bool {
        (self.content_type == TEXT_PLAIN || self.content_type == TEXT_HTML)
            && self.file_name.is_empty()
            && self.disposition != "attachment"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_multipart() {
        assert!(MessagePart::container(MULTIPART_MIXED, vec![]).is_multipart());
        assert!(!MessagePart::leaf(TEXT_PLAIN, "hi").is_multipart());
    }

    #[test]
    fn test_embedded_message_detection() {
        assert!(MessagePart::leaf(MESSAGE_RFC822, "").is_embedded_message());
        assert!(MessagePart::leaf("application/octet-stream", "")
            .with_file_name("mime-attachment")
            .is_embedded_message());
        assert!(MessagePart::leaf("application/octet-stream", "")
            .with_file_name(".eml")
            .is_embedded_message());
        assert!(!MessagePart::leaf("application/pdf", "")
            .with_file_name("report.eml")
            .is_embedded_message());
    }

    #[test]
    fn test_body_candidate() {
        assert!(MessagePart::leaf(TEXT_HTML, "<p>x</p>").is_body_candidate());
        assert!(!MessagePart::leaf(TEXT_PLAIN, "x")
            .with_disposition("attachment")
            .is_body_candidate());
        assert!(!MessagePart::leaf(TEXT_PLAIN, "x")
            .with_file_name("notes.txt")
            .is_body_candidate());
        assert!(!MessagePart::leaf("image/png", "x").is_body_candidate());
    }
}
