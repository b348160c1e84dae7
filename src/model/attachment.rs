//! Attachment descriptors handed to the page renderer.

use std::collections::HashMap;

/// Content-ID (angle brackets stripped) → file name inside `attachments/`.
pub type ContentIdMap = HashMap<String, String>;

/// One materialized attachment or embedded message.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct AttachmentLink {
    /// Display name (the final, de-duplicated file name).
    pub name: String,

    /// Path relative to the message output directory.
    ///
    /// Plain files point at `attachments/<name>`, embedded messages at
    /// their own generated `attachments/<name>/index.html`.
    pub link: String,

    /// Size of the stored payload in bytes.
    pub size: u64,

    /// Set when an embedded message could not be converted.
    pub error: Option<String>,
}
