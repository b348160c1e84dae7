//! Per-message pipeline: original copy, attachments, body artifacts and page.

use std::path::Path;

use tracing::{debug, warn};

use crate::config::ConvertConfig;
use crate::convert::attachment::{split_extension, write_attachments};
use crate::convert::rewrite::rewrite_html;
use crate::convert::select::select_body;
use crate::error::{ConvertError, Result};
use crate::model::attachment::ContentIdMap;
use crate::model::message::ParsedMessage;
use crate::model::part::{TEXT_HTML, TEXT_PLAIN};
use crate::parser::mime::{html_to_text, parse_message};
use crate::render::message::{error_page, message_page, MessagePage};
use crate::render::Navigation;

/// Directory (inside a message directory) holding the body artifacts.
pub const CONTENT_DIR: &str = "content";

/// Page written for every message, listing and error.
pub const INDEX_FILE: &str = "index.html";

/// Plain-text error report written next to a failed message's page.
pub const ERROR_FILE: &str = "error.txt";

/// Body artifacts of one message, as file names inside [`CONTENT_DIR`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentFiles {
    pub text: Vec<String>,
    pub html: Vec<String>,
}

impl ContentFiles {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.html.is_empty()
    }
}

/// Create `<root>/<name>/`, copy the original message into it and parse it.
///
/// The directory exists afterwards even when parsing fails, so an error page
/// can take the message's place.
pub fn write_message_root(
    root: &Path,
    name: &str,
    raw: &[u8],
    options: &ConvertConfig,
) -> Result<ParsedMessage> {
    let dir = root.join(name);
    std::fs::create_dir_all(&dir).map_err(|e| ConvertError::io(&dir, e))?;

    if raw.len() > options.max_message_size {
        return Err(ConvertError::TooLarge {
            size: raw.len(),
            limit: options.max_message_size,
        });
    }

    if options.copy_original {
        let original = dir.join(name);
        std::fs::write(&original, raw).map_err(|e| ConvertError::io(&original, e))?;
    }

    parse_message(raw)
}

/// Write attachments, body artifacts and `index.html` for a parsed message
/// into `<root>/<name>/`.
///
/// `depth` counts how many embedded messages enclose this one.
pub fn write_message(
    root: &Path,
    name: &str,
    msg: &ParsedMessage,
    nav: &Navigation,
    options: &ConvertConfig,
    depth: usize,
) -> Result<()> {
    let dir = root.join(name);

    let parts = msg.attachment_parts();
    let (attachments, cids) = write_attachments(&dir, &parts, options, depth)?;
    let content = write_content(&dir, name, msg, &cids)?;

    let page = MessagePage {
        name,
        meta: &msg.meta,
        content: &content,
        attachments: &attachments,
        nav,
        original: options.copy_original.then_some(name),
    };
    let index = dir.join(INDEX_FILE);
    std::fs::write(&index, message_page(&page)).map_err(|e| ConvertError::io(&index, e))?;

    debug!(
        path = %dir.display(),
        attachments = attachments.len(),
        text = content.text.len(),
        html = content.html.len(),
        "Wrote message"
    );
    Ok(())
}

/// Write the selected plain-text and HTML bodies into `<dir>/content/`.
///
/// Bodies without visible text are dropped. When a selection yields more than
/// one body, every artifact of that kind gets a `_<n>` suffix.
pub fn write_content(
    dir: &Path,
    name: &str,
    msg: &ParsedMessage,
    cids: &ContentIdMap,
) -> Result<ContentFiles> {
    let content_dir = dir.join(CONTENT_DIR);
    std::fs::create_dir_all(&content_dir).map_err(|e| ConvertError::io(&content_dir, e))?;

    let stem = match split_extension(name).0 {
        "" => "message",
        stem => stem,
    };
    let mut files = ContentFiles::default();

    let text_bodies = select_body(&msg.root, TEXT_PLAIN);
    let numbered = text_bodies.len() > 1;
    let kept = text_bodies.into_iter().filter(|body| has_visible_text(body));
    for (i, body) in kept.enumerate() {
        let file = artifact_name(stem, numbered.then_some(i + 1), "txt");
        let path = content_dir.join(&file);
        std::fs::write(&path, body).map_err(|e| ConvertError::io(&path, e))?;
        files.text.push(file);
    }

    let html_bodies = select_body(&msg.root, TEXT_HTML);
    let numbered = html_bodies.len() > 1;
    let kept = html_bodies.into_iter().filter(|body| has_visible_html(body));
    for (i, body) in kept.enumerate() {
        let file = artifact_name(stem, numbered.then_some(i + 1), "html");
        let path = content_dir.join(&file);
        let rewritten = rewrite_html(cids, body).unwrap_or_else(|e| {
            warn!(path = %path.display(), error = %e, "Keeping HTML body unmodified");
            body.to_vec()
        });
        std::fs::write(&path, rewritten).map_err(|e| ConvertError::io(&path, e))?;
        files.html.push(file);
    }

    Ok(files)
}

/// Write `error.txt` and an error page into `<root>/<name>/`.
pub fn write_error(root: &Path, name: &str, error: &str, nav: &Navigation) -> Result<()> {
    let dir = root.join(name);
    std::fs::create_dir_all(&dir).map_err(|e| ConvertError::io(&dir, e))?;

    let report = dir.join(ERROR_FILE);
    std::fs::write(&report, format!("{error}\n")).map_err(|e| ConvertError::io(&report, e))?;

    let index = dir.join(INDEX_FILE);
    std::fs::write(&index, error_page(name, error, nav)).map_err(|e| ConvertError::io(&index, e))
}

fn artifact_name(stem: &str, number: Option<usize>, ext: &str) -> String {
    match number {
        Some(n) => format!("{stem}_{n}.{ext}"),
        None => format!("{stem}.{ext}"),
    }
}

fn has_visible_text(body: &[u8]) -> bool {
    !String::from_utf8_lossy(body).trim().is_empty()
}

fn has_visible_html(body: &[u8]) -> bool {
    !html_to_text(&String::from_utf8_lossy(body)).is_empty()
}
