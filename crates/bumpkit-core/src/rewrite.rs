//! In-place version rewriting for a single file.
//!
//! A [`VersionRewriter`] is built once per run (compiling the locating
//! pattern) and then applied to each candidate file. The first match
//! determines the current version; every match is then replaced with the
//! normalized assignment of the bumped version.

use std::fs;
use std::io::Write;
use std::path::Path;

use camino::{Utf8Path, Utf8PathBuf};
use regex::{NoExpand, Regex};
use semver::Version;
use serde::Serialize;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info, instrument, trace};

use crate::error::FsError;
use crate::version::{self, BumpLevel, VersionError};

/// Locates Python-style `__version__ = "X.Y.Z"` assignments.
pub const DEFAULT_FIND_PATTERN: &str = r#"__version__\s*=\s*["'](\d+\.\d+\.\d+)["']"#;

/// Assignment written back in place of every match.
pub const DEFAULT_REPLACEMENT: &str = r#"__version__ = "{version}""#;

/// Placeholder substituted with the new version in replacement templates.
pub const VERSION_PLACEHOLDER: &str = "{version}";

/// Errors from rewriting a file.
#[derive(Error, Debug)]
pub enum RewriteError {
    /// Reading or writing the file failed.
    #[error(transparent)]
    Fs(#[from] FsError),

    /// The pattern matched text that is not a `major.minor.patch` version,
    /// or the version found cannot be bumped.
    #[error("{path}: {source}")]
    Format {
        /// File containing the bad match.
        path: Utf8PathBuf,
        /// Parse failure details.
        source: VersionError,
    },

    /// The locating pattern is not a valid regular expression.
    #[error("invalid find pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// Result alias for rewrite operations.
pub type RewriteResult<T> = Result<T, RewriteError>;

/// A version change applied (or planned, under dry-run) to one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileChange {
    /// The rewritten file.
    pub path: Utf8PathBuf,
    /// Version found in the file.
    pub previous: Version,
    /// Version written to the file.
    pub new: Version,
}

/// The outcome of bumping a block of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BumpedText {
    /// Version found by the first match.
    pub previous: Version,
    /// Bumped version.
    pub new: Version,
    /// Text with every match replaced.
    pub text: String,
}

/// Finds and bumps a version string inside files.
#[derive(Debug, Clone)]
pub struct VersionRewriter {
    pattern: Regex,
    replacement: String,
    level: BumpLevel,
    dry_run: bool,
}

impl VersionRewriter {
    /// Compile `pattern` into a rewriter for the given bump level.
    ///
    /// If the pattern has a capture group, group 1 is the version;
    /// otherwise the whole match is.
    pub fn new(pattern: &str, level: BumpLevel, dry_run: bool) -> RewriteResult<Self> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            replacement: DEFAULT_REPLACEMENT.to_string(),
            level,
            dry_run,
        })
    }

    /// Use a different assignment template. `{version}` is substituted.
    pub fn with_replacement<S: Into<String>>(mut self, template: S) -> Self {
        self.replacement = template.into();
        self
    }

    /// Bump the first version found in `text`.
    ///
    /// Returns `Ok(None)` when the pattern does not match at all.
    pub fn bump_text(&self, text: &str) -> Result<Option<BumpedText>, VersionError> {
        let Some(captures) = self.pattern.captures(text) else {
            return Ok(None);
        };
        let Some(matched) = captures.get(1).or_else(|| captures.get(0)) else {
            return Ok(None);
        };

        let previous = version::parse_version(matched.as_str())?;
        let new = version::next_version(&previous, self.level)?;
        let assignment = self
            .replacement
            .replace(VERSION_PLACEHOLDER, &new.to_string());
        let text = self
            .pattern
            .replace_all(text, NoExpand(&assignment))
            .into_owned();

        Ok(Some(BumpedText {
            previous,
            new,
            text,
        }))
    }

    /// Bump the version in `path`, writing the file back unless in dry-run.
    ///
    /// Returns `Ok(None)` when the file holds no version or the rewrite
    /// would leave it unchanged.
    #[instrument(skip(self), fields(level = %self.level, dry_run = self.dry_run))]
    pub fn rewrite_file(&self, path: &Utf8Path) -> RewriteResult<Option<FileChange>> {
        let original =
            fs::read_to_string(path).map_err(|e| FsError::from_io(path, "reading", e))?;

        let bumped = self
            .bump_text(&original)
            .map_err(|source| RewriteError::Format {
                path: path.to_path_buf(),
                source,
            })?;

        let Some(bumped) = bumped else {
            trace!("no version string");
            return Ok(None);
        };
        if bumped.text == original {
            debug!(version = %bumped.previous, "rewrite would not change file");
            return Ok(None);
        }

        info!(%path, previous = %bumped.previous, new = %bumped.new, "bumping version");
        if !self.dry_run {
            write_replacing(path, &bumped.text)?;
        }

        Ok(Some(FileChange {
            path: path.to_path_buf(),
            previous: bumped.previous,
            new: bumped.new,
        }))
    }
}

/// Replace `path` with `contents` via a sibling temp file and rename, so a
/// failed write never truncates the original.
///
/// A symlinked `path` is resolved first so the link target is rewritten and
/// the link itself survives.
fn write_replacing(path: &Utf8Path, contents: &str) -> Result<(), FsError> {
    let target = match fs::symlink_metadata(path) {
        Ok(meta) if meta.file_type().is_symlink() => {
            fs::canonicalize(path).map_err(|e| FsError::from_io(path, "resolving link", e))?
        }
        _ => path.as_std_path().to_path_buf(),
    };
    let dir = target
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut tmp =
        NamedTempFile::new_in(dir).map_err(|e| FsError::from_io(path, "creating temp file", e))?;
    tmp.write_all(contents.as_bytes())
        .map_err(|e| FsError::from_io(path, "writing", e))?;

    if let Ok(metadata) = fs::metadata(&target) {
        // Keep the executable bit and friends; the temp file starts at 0600.
        if let Err(error) = tmp.as_file().set_permissions(metadata.permissions()) {
            debug!(%path, %error, "could not copy permissions to replacement file");
        }
    }

    tmp.persist(&target)
        .map_err(|e| FsError::from_io(path, "replacing", e.error))?;
    Ok(())
}
