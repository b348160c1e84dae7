//! Discover message files below an input path and drive the conversion.

use std::cell::Cell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::config::ConvertConfig;
use crate::convert::dir::{write_dir, Failure, SourceEntry};
use crate::error::{ConvertError, Result};
use crate::render::Navigation;

/// What will be converted, grouped by source directory.
#[derive(Debug)]
pub struct Plan {
    /// Source path that maps onto the output root.
    pub base: PathBuf,
    /// Every directory to convert with its entries, in name order.
    pub dirs: BTreeMap<PathBuf, Vec<SourceEntry>>,
}

impl Plan {
    /// Number of message files in the plan.
    pub fn message_count(&self) -> usize {
        self.dirs
            .values()
            .flatten()
            .filter(|e| matches!(e, SourceEntry::File { .. }))
            .count()
    }
}

/// Totals for a whole run.
#[derive(Debug, Default, Serialize)]
pub struct ConversionReport {
    pub directories: usize,
    pub converted: usize,
    pub failures: Vec<Failure>,
}

/// Build the conversion plan for `input`.
///
/// A single file is converted on its own, rooted at its parent directory.
/// For a directory, every sub-directory is included (it gets a listing even
/// when empty) and files are kept when their extension is configured.
pub fn plan(input: &Path, options: &ConvertConfig) -> Result<Plan> {
    let metadata = std::fs::metadata(input).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ConvertError::FileNotFound(input.to_path_buf())
        } else {
            ConvertError::io(input, e)
        }
    })?;

    let mut dirs = BTreeMap::new();

    if metadata.is_file() {
        let name = input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| ConvertError::InvalidPath(input.display().to_string()))?;
        let base = input.parent().map(Path::to_path_buf).unwrap_or_default();
        dirs.insert(
            base.clone(),
            vec![SourceEntry::File {
                name,
                path: input.to_path_buf(),
            }],
        );
        return Ok(Plan { base, dirs });
    }

    dirs.insert(input.to_path_buf(), Vec::new());
    for entry in WalkDir::new(input).min_depth(1).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "Skipping unreadable entry");
                continue;
            }
        };
        let path = entry.path();
        let Some(parent) = path.parent() else {
            continue;
        };
        let name = entry.file_name().to_string_lossy().into_owned();

        if entry.file_type().is_dir() {
            dirs.entry(path.to_path_buf()).or_default();
            dirs.entry(parent.to_path_buf())
                .or_default()
                .push(SourceEntry::Directory(name));
        } else if options.matches_extension(&name) {
            dirs.entry(parent.to_path_buf())
                .or_default()
                .push(SourceEntry::File {
                    name,
                    path: path.to_path_buf(),
                });
        } else {
            debug!(path = %path.display(), "Ignoring file");
        }
    }

    Ok(Plan {
        base: input.to_path_buf(),
        dirs,
    })
}

/// Convert everything in `plan` into `output`.
///
/// A directory that cannot be written is recorded as a failure and the run
/// goes on. `progress` receives `(done, total)` message counts.
pub fn convert_plan(
    plan: &Plan,
    output: &Path,
    options: &ConvertConfig,
    progress: &dyn Fn(usize, usize),
) -> Result<ConversionReport> {
    std::fs::create_dir_all(output).map_err(|e| ConvertError::io(output, e))?;

    let total = plan.message_count();
    let done = Cell::new(0usize);
    let tick = |_: &str| {
        done.set(done.get() + 1);
        progress(done.get(), total);
    };

    let mut report = ConversionReport::default();
    for (dir, entries) in &plan.dirs {
        let relative = dir
            .strip_prefix(&plan.base)
            .map_err(|_| ConvertError::InvalidPath(dir.display().to_string()))?;
        let nav = if relative.as_os_str().is_empty() {
            Navigation::default()
        } else {
            Navigation::with_parent("../index.html")
        };

        match write_dir(output, relative, entries, &nav, options, &tick) {
            Ok(summary) => {
                report.directories += 1;
                report.converted += summary.converted;
                report.failures.extend(summary.failures);
            }
            Err(e) => {
                warn!(path = %dir.display(), error = %e, "Failed to convert directory");
                report.failures.push(Failure {
                    path: relative.to_path_buf(),
                    error: e.to_string(),
                });
            }
        }
    }

    Ok(report)
}
