//! Convert one source directory: every message in it plus its listing page.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use crate::config::ConvertConfig;
use crate::convert::message::{write_error, write_message, write_message_root, INDEX_FILE};
use crate::error::{ConvertError, Result};
use crate::model::message::ParsedMessage;
use crate::parser::eml::read_eml;
use crate::render::listing::{listing_page, ListingRow, RowKind};
use crate::render::Navigation;

/// Something found in a source directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceEntry {
    /// A sub-directory, converted separately; only linked from here.
    Directory(String),
    /// A message file.
    File { name: String, path: PathBuf },
}

impl SourceEntry {
    pub fn name(&self) -> &str {
        match self {
            Self::Directory(name) => name,
            Self::File { name, .. } => name,
        }
    }
}

/// A message that could not be converted.
#[derive(Debug, Clone, Serialize)]
pub struct Failure {
    /// Path relative to the output root.
    pub path: PathBuf,
    pub error: String,
}

/// Outcome of converting one directory.
#[derive(Debug, Default, Serialize)]
pub struct DirSummary {
    pub converted: usize,
    pub failures: Vec<Failure>,
}

enum EntryState {
    Directory,
    Message(ParsedMessage),
    Failed(String),
}

struct DirEntry {
    name: String,
    state: EntryState,
}

impl DirEntry {
    fn message(&self) -> Option<&ParsedMessage> {
        match &self.state {
            EntryState::Message(msg) => Some(msg),
            _ => None,
        }
    }
}

/// Convert `entries` into `<output>/<relative>/`.
///
/// Messages are parsed first so they can be sorted by date; each one then
/// gets its page with links to its neighbours. A failing message gets an
/// error page and does not stop the others. `progress` is called once per
/// message file.
pub fn write_dir(
    output: &Path,
    relative: &Path,
    entries: &[SourceEntry],
    nav: &Navigation,
    options: &ConvertConfig,
    progress: &dyn Fn(&str),
) -> Result<DirSummary> {
    let root = output.join(relative);
    std::fs::create_dir_all(&root).map_err(|e| ConvertError::io(&root, e))?;

    let mut dir_entries: Vec<DirEntry> = entries
        .iter()
        .map(|entry| {
            let state = match entry {
                SourceEntry::Directory(_) => EntryState::Directory,
                SourceEntry::File { name, path } => {
                    match read_eml(path).and_then(|raw| write_message_root(&root, name, &raw, options)) {
                        Ok(msg) => EntryState::Message(msg),
                        Err(e) => {
                            warn!(path = %path.display(), error = %e, "Failed to read message");
                            EntryState::Failed(e.to_string())
                        }
                    }
                }
            };
            DirEntry {
                name: entry.name().to_string(),
                state,
            }
        })
        .collect();

    dir_entries.sort_by(compare_entries);

    let links: Vec<String> = dir_entries
        .iter()
        .map(|e| format!("../{}/{INDEX_FILE}", e.name))
        .collect();

    let mut summary = DirSummary::default();
    for idx in 0..dir_entries.len() {
        let entry_nav = Navigation {
            prev: idx.checked_sub(1).map(|i| links[i].clone()),
            next: links.get(idx + 1).cloned(),
            parent: Some(format!("../{INDEX_FILE}")),
        };
        let entry = &dir_entries[idx];

        let error = match &entry.state {
            EntryState::Directory => continue,
            EntryState::Message(msg) => {
                match write_message(&root, &entry.name, msg, &entry_nav, options, 0) {
                    Ok(()) => None,
                    Err(e) => {
                        warn!(name = %entry.name, error = %e, "Failed to convert message");
                        Some(e.to_string())
                    }
                }
            }
            EntryState::Failed(error) => Some(error.clone()),
        };
        progress(&entry.name);

        match error {
            None => summary.converted += 1,
            Some(error) => {
                if let Err(e) = write_error(&root, &entry.name, &error, &entry_nav) {
                    warn!(name = %entry.name, error = %e, "Failed to write error page");
                }
                summary.failures.push(Failure {
                    path: relative.join(&entry.name),
                    error: error.clone(),
                });
                dir_entries[idx].state = EntryState::Failed(error);
            }
        }
    }

    let rows: Vec<ListingRow<'_>> = dir_entries
        .iter()
        .map(|entry| ListingRow {
            name: &entry.name,
            kind: match &entry.state {
                EntryState::Directory => RowKind::Directory,
                EntryState::Message(msg) => RowKind::Message(&msg.meta),
                EntryState::Failed(error) => RowKind::Failed(error),
            },
        })
        .collect();
    let title = relative.to_string_lossy();
    let index = root.join(INDEX_FILE);
    std::fs::write(&index, listing_page(&title, &rows, nav))
        .map_err(|e| ConvertError::io(&index, e))?;

    info!(
        path = %root.display(),
        converted = summary.converted,
        failed = summary.failures.len(),
        "Wrote directory"
    );
    Ok(summary)
}

/// Non-message entries first by name, then messages oldest first.
///
/// Messages without a date sort before dated ones; ties go by name.
fn compare_entries(a: &DirEntry, b: &DirEntry) -> Ordering {
    match (a.message(), b.message()) {
        (None, None) => a.name.cmp(&b.name),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => x
            .meta
            .date
            .cmp(&y.meta.date)
            .then_with(|| a.name.cmp(&b.name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn eml(date: Option<&str>, subject: &str) -> String {
        let mut raw = String::new();
        if let Some(date) = date {
            raw.push_str(&format!("Date: {date}\r\n"));
        }
        raw.push_str(&format!("From: a@example.com\r\nSubject: {subject}\r\n\r\nBody of {subject}\r\n"));
        raw
    }

    fn source(dir: &Path, name: &str, content: &str) -> SourceEntry {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        SourceEntry::File {
            name: name.to_string(),
            path,
        }
    }

    fn read(path: PathBuf) -> String {
        std::fs::read_to_string(path).unwrap()
    }

    #[test]
    fn test_messages_sorted_and_linked() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        let entries = vec![
            source(input.path(), "b.eml", &eml(Some("Tue, 02 Jan 2024 10:00:00 +0000"), "Second")),
            source(input.path(), "a.eml", &eml(Some("Wed, 03 Jan 2024 10:00:00 +0000"), "Third")),
            source(input.path(), "c.eml", &eml(None, "Undated")),
            SourceEntry::Directory("sub".into()),
        ];
        let seen = RefCell::new(Vec::new());

        let summary = write_dir(
            output.path(),
            Path::new(""),
            &entries,
            &Navigation::default(),
            &ConvertConfig::default(),
            &|name| seen.borrow_mut().push(name.to_string()),
        )
        .unwrap();

        assert_eq!(summary.converted, 3);
        assert!(summary.failures.is_empty());
        assert_eq!(seen.into_inner(), vec!["c.eml", "b.eml", "a.eml"]);

        // order: sub, c (undated), b, a
        let middle = read(output.path().join("b.eml").join(INDEX_FILE));
        assert!(middle.contains("href=\"../c.eml/index.html\">Previous"));
        assert!(middle.contains("href=\"../a.eml/index.html\">Next"));
        assert!(middle.contains("href=\"../index.html\">Up"));

        let first = read(output.path().join("c.eml").join(INDEX_FILE));
        assert!(first.contains("href=\"../sub/index.html\">Previous"));

        let last = read(output.path().join("a.eml").join(INDEX_FILE));
        assert!(!last.contains("Next"));

        let listing = read(output.path().join(INDEX_FILE));
        let positions: Vec<usize> = ["sub/index.html", "c.eml/", "b.eml/", "a.eml/"]
            .iter()
            .map(|needle| listing.find(needle).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{listing}");
    }

    #[test]
    fn test_failed_message_does_not_stop_siblings() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        let entries = vec![
            source(input.path(), "empty.eml", ""),
            source(input.path(), "good.eml", &eml(None, "Good")),
            SourceEntry::File {
                name: "gone.eml".into(),
                path: input.path().join("gone.eml"),
            },
        ];

        let summary = write_dir(
            output.path(),
            Path::new("inbox"),
            &entries,
            &Navigation::with_parent("../index.html"),
            &ConvertConfig::default(),
            &|_| {},
        )
        .unwrap();

        assert_eq!(summary.converted, 1);
        assert_eq!(summary.failures.len(), 2);
        assert!(summary
            .failures
            .iter()
            .any(|f| f.path == Path::new("inbox").join("gone.eml")));

        let root = output.path().join("inbox");
        assert!(root.join("empty.eml").join("error.txt").is_file());
        assert!(root.join("gone.eml").join("error.txt").is_file());
        assert!(root.join("good.eml").join(INDEX_FILE).is_file());

        let listing = read(root.join(INDEX_FILE));
        assert!(listing.contains("<h1>inbox</h1>"));
        assert!(listing.contains("<tr class=\"error\">"));
        assert!(listing.contains("href=\"../index.html\">Up"));
    }
}
