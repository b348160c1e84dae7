//! Materialize attachments, inline parts and embedded messages.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use tracing::{debug, warn};

use crate::config::ConvertConfig;
use crate::convert::message;
use crate::error::{ConvertError, Result};
use crate::model::attachment::{AttachmentLink, ContentIdMap};
use crate::model::part::MessagePart;
use crate::render::Navigation;

/// Directory (inside a message directory) that receives attachments.
pub const ATTACHMENTS_DIR: &str = "attachments";

/// Base name given to every embedded message.
const EMBEDDED_NAME: &str = "attached.eml";

/// Parent page of an embedded message, seen from its own `index.html`.
const EMBEDDED_PARENT: &str = "../../index.html";

/// Longest file name written to disk, in bytes.
const MAX_FILE_NAME: usize = 200;

/// Hands out collision-free file names within one message.
///
/// Each base name has a counter that is read and then incremented on every
/// claim, so the first `report.pdf` keeps its name and the second one
/// becomes `report (1).pdf`. A candidate that was already handed out (a
/// literal `report (1).pdf`, say) is skipped and the counter moves on.
#[derive(Debug, Default)]
pub struct NameRegistry {
    counters: HashMap<String, usize>,
    taken: HashSet<String>,
}

impl NameRegistry {
    /// Return the name to use for the next file called `base`.
    pub fn claim(&mut self, base: &str) -> String {
        let counter = self.counters.entry(base.to_string()).or_insert(0);
        loop {
            let name = if *counter == 0 {
                base.to_string()
            } else {
                let (stem, ext) = split_extension(base);
                format!("{stem} ({counter}){ext}")
            };
            *counter += 1;
            if self.taken.insert(name.clone()) {
                return name;
            }
        }
    }
}

/// Split `name` into stem and extension, the extension keeping its dot.
///
/// `"report.pdf"` → `("report", ".pdf")`, `"README"` → `("README", "")`.
pub fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(dot) => name.split_at(dot),
        None => (name, ""),
    }
}

/// Make an attachment name safe to use as a single path component.
pub fn safe_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c == '/' || c == '\\' || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();
    let cleaned = cleaned.trim();

    if cleaned.is_empty() || cleaned == "." || cleaned == ".." {
        return "_".to_string();
    }
    if cleaned.len() <= MAX_FILE_NAME {
        return cleaned.to_string();
    }

    let (stem, ext) = split_extension(cleaned);
    let ext = if ext.len() < MAX_FILE_NAME / 2 { ext } else { "" };
    let mut end = MAX_FILE_NAME - ext.len();
    while !stem.is_char_boundary(end.min(stem.len())) {
        end -= 1;
    }
    format!("{}{ext}", &stem[..end.min(stem.len())])
}

/// Write every attachment of a message below `<message_dir>/attachments/`.
///
/// Parts are processed in order. Embedded messages are converted into their
/// own sub-directory by running the whole message pipeline on them; parts
/// without a file name are skipped. Returns the descriptors for the page and
/// the Content-ID map used to rewrite the HTML body.
pub fn write_attachments(
    message_dir: &Path,
    parts: &[&MessagePart],
    options: &ConvertConfig,
    depth: usize,
) -> Result<(Vec<AttachmentLink>, ContentIdMap)> {
    let root = message_dir.join(ATTACHMENTS_DIR);
    std::fs::create_dir_all(&root).map_err(|e| ConvertError::io(&root, e))?;

    let mut names = NameRegistry::default();
    let mut links = Vec::with_capacity(parts.len());
    let mut cids = ContentIdMap::new();

    for part in parts {
        if part.is_embedded_message() {
            let name = names.claim(EMBEDDED_NAME);
            links.push(write_embedded(&root, name, &part.content, options, depth)?);
            continue;
        }

        if part.file_name.is_empty() {
            debug!(content_type = %part.content_type, "Skipping attachment without a file name");
            continue;
        }

        let name = names.claim(&safe_file_name(&part.file_name));
        let path = root.join(&name);
        std::fs::write(&path, &part.content).map_err(|e| ConvertError::io(&path, e))?;
        debug!(path = %path.display(), size = part.content.len(), "Wrote attachment");

        let cid = part.content_id.trim_matches(|c| c == '<' || c == '>');
        if !cid.is_empty() {
            cids.insert(cid.to_string(), name.clone());
        }

        links.push(AttachmentLink {
            link: format!("{ATTACHMENTS_DIR}/{name}"),
            name,
            size: part.content.len() as u64,
            error: None,
        });
    }

    Ok((links, cids))
}

/// Convert one embedded message into `<root>/<name>/`.
///
/// A conversion failure does not fail the parent: it is logged, an error page
/// is written in place of the message, and the descriptor carries the error.
fn write_embedded(
    root: &Path,
    name: String,
    raw: &[u8],
    options: &ConvertConfig,
    depth: usize,
) -> Result<AttachmentLink> {
    let size = raw.len() as u64;

    if depth >= options.max_embedded_depth {
        warn!(name = %name, depth, "Embedded messages nested too deep, storing as a file");
        let path = root.join(&name);
        std::fs::write(&path, raw).map_err(|e| ConvertError::io(&path, e))?;
        return Ok(AttachmentLink {
            link: format!("{ATTACHMENTS_DIR}/{name}"),
            name,
            size,
            error: None,
        });
    }

    let nav = Navigation::with_parent(EMBEDDED_PARENT);
    let result = message::write_message_root(root, &name, raw, options)
        .and_then(|msg| message::write_message(root, &name, &msg, &nav, options, depth + 1));

    let error = match result {
        Ok(()) => None,
        Err(e) => {
            warn!(name = %name, error = %e, "Failed to convert embedded message");
            if let Err(page_err) = message::write_error(root, &name, &e.to_string(), &nav) {
                warn!(name = %name, error = %page_err, "Failed to write error page");
            }
            Some(e.to_string())
        }
    };

    Ok(AttachmentLink {
        link: format!("{ATTACHMENTS_DIR}/{name}/{}", message::INDEX_FILE),
        name,
        size,
        error,
    })
}
