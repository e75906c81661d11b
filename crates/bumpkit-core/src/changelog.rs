//! Append-only changelog maintenance.
//!
//! Entries are appended to the end of an existing changelog in a
//! Keep a Changelog-style layout:
//!
//! ```text
//! ## [1.2.4] - 2024-05-01
//!
//! ### Patch
//! - Bumped patch version.
//! ```
//!
//! Earlier entries are never rewritten. A project without a changelog is
//! left alone: the missing file is reported, not created.

use std::fs::OpenOptions;
use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use chrono::NaiveDate;
use semver::Version;
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::error::FsError;
use crate::version::BumpLevel;

/// Changelog file name looked up under the project root by default.
pub const DEFAULT_CHANGELOG: &str = "CHANGELOG.md";

/// One release entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangelogEntry {
    /// Released version.
    pub version: Version,
    /// Release date.
    pub date: NaiveDate,
    /// Bump level, rendered as the subheading.
    pub level: BumpLevel,
    /// Body line text.
    pub notes: String,
}

impl ChangelogEntry {
    /// Entry with the default notes line for `level`.
    pub fn new(version: Version, date: NaiveDate, level: BumpLevel) -> Self {
        Self {
            version,
            date,
            level,
            notes: default_notes(level),
        }
    }

    /// Override the body line.
    pub fn with_notes<S: Into<String>>(mut self, notes: S) -> Self {
        self.notes = notes.into();
        self
    }

    /// Markdown text appended to the changelog.
    pub fn render(&self) -> String {
        format!(
            "\n## [{version}] - {date}\n\n### {title}\n- {notes}\n",
            version = self.version,
            date = self.date.format("%Y-%m-%d"),
            title = self.level.title(),
            notes = self.notes,
        )
    }
}

/// Body line used when no notes are configured.
pub fn default_notes(level: BumpLevel) -> String {
    format!("Bumped {level} version.")
}

/// What happened to the changelog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ChangelogOutcome {
    /// The entry was appended.
    Appended {
        /// Changelog path.
        path: Utf8PathBuf,
        /// Text that was appended.
        entry: String,
    },
    /// Dry run: the entry that would have been appended.
    Planned {
        /// Changelog path.
        path: Utf8PathBuf,
        /// Text that would be appended.
        entry: String,
    },
    /// No changelog exists; nothing was written.
    Missing {
        /// Path that was checked.
        path: Utf8PathBuf,
    },
}

/// Append `entry` to the changelog at `path`.
///
/// A missing changelog is not an error; it yields [`ChangelogOutcome::Missing`].
#[instrument(skip(entry), fields(version = %entry.version))]
pub fn append_entry(
    path: &Utf8Path,
    entry: &ChangelogEntry,
    dry_run: bool,
) -> Result<ChangelogOutcome, FsError> {
    if !path.is_file() {
        warn!(%path, "changelog not found, skipping");
        return Ok(ChangelogOutcome::Missing {
            path: path.to_path_buf(),
        });
    }

    let text = entry.render();
    if dry_run {
        info!(%path, "dry run: changelog entry not written");
        return Ok(ChangelogOutcome::Planned {
            path: path.to_path_buf(),
            entry: text,
        });
    }

    let mut file = OpenOptions::new()
        .append(true)
        .open(path)
        .map_err(|e| FsError::from_io(path, "opening for append", e))?;
    file.write_all(text.as_bytes())
        .map_err(|e| FsError::from_io(path, "appending", e))?;

    info!(%path, "updated changelog");
    Ok(ChangelogOutcome::Appended {
        path: path.to_path_buf(),
        entry: text,
    })
}
