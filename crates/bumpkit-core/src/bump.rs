//! Version bump orchestration.
//!
//! All orchestration logic lives here. The CLI is purely a display layer.
//!
//! # Flow
//!
//! 1. **Scan** the project for candidate files ([`FileScanner`]).
//! 2. **Rewrite** each file in turn ([`VersionRewriter`]). The most recent
//!    file that produced a new version determines "the" version of the run.
//! 3. If nothing changed, stop. Otherwise **append** a changelog entry.
//! 4. If commit or tag was requested, **commit and tag** with git.
//!
//! Any rewrite failure aborts the run immediately. Files already rewritten
//! stay rewritten; there is no rollback.

use camino::{Utf8Path, Utf8PathBuf};
use chrono::{Local, NaiveDate};
use semver::Version;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::changelog::{self, ChangelogEntry, ChangelogOutcome, DEFAULT_CHANGELOG};
use crate::config::BumpConfig;
use crate::error::FsError;
use crate::git::{self, DEFAULT_MESSAGE, GitError, ReleaseCommit};
use crate::rewrite::{
    DEFAULT_FIND_PATTERN, DEFAULT_REPLACEMENT, FileChange, RewriteError, VersionRewriter,
};
use crate::scan::{DEFAULT_EXCLUDE, DEFAULT_EXTENSIONS, FileScanner, ScanError};
use crate::version::BumpLevel;

// ──────────────────────────────────────────────
// Errors
// ──────────────────────────────────────────────

/// Errors from a bump run.
#[derive(Error, Debug)]
pub enum BumpError {
    /// Walking the project tree failed.
    #[error(transparent)]
    Scan(#[from] ScanError),

    /// Reading, parsing or writing a version file failed.
    #[error(transparent)]
    Rewrite(#[from] RewriteError),

    /// Appending to the changelog failed.
    #[error("changelog update failed: {0}")]
    Changelog(#[from] FsError),

    /// Committing or tagging failed. Earlier writes are kept.
    #[error("release commit failed: {0}")]
    Git(#[from] GitError),
}

/// Result alias for bump operations.
pub type BumpResult<T> = Result<T, BumpError>;

// ──────────────────────────────────────────────
// Options
// ──────────────────────────────────────────────

/// Everything a bump run needs, resolved from CLI flags, config and defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BumpOptions {
    /// Directory to scan; also where git runs.
    pub project_root: Utf8PathBuf,
    /// Which component to increment.
    pub level: BumpLevel,
    /// Regex locating the version.
    pub find_pattern: String,
    /// Assignment template written back.
    pub replacement: String,
    /// Directory names pruned from the scan.
    pub exclude: Vec<String>,
    /// File extensions scanned.
    pub extensions: Vec<String>,
    /// Changelog path; relative paths resolve against `project_root`.
    pub changelog: Utf8PathBuf,
    /// Changelog body line; defaults per bump level.
    pub notes: Option<String>,
    /// Commit and tag message template.
    pub message: String,
    /// Create a release commit.
    pub commit: bool,
    /// Create a release tag.
    pub tag: bool,
    /// Compute and report only.
    pub dry_run: bool,
}

impl BumpOptions {
    /// Built-in defaults for `project_root`.
    pub fn new<P: Into<Utf8PathBuf>>(project_root: P) -> Self {
        Self {
            project_root: project_root.into(),
            level: BumpLevel::default(),
            find_pattern: DEFAULT_FIND_PATTERN.to_string(),
            replacement: DEFAULT_REPLACEMENT.to_string(),
            exclude: DEFAULT_EXCLUDE.iter().map(|s| (*s).to_string()).collect(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|s| (*s).to_string()).collect(),
            changelog: Utf8PathBuf::from(DEFAULT_CHANGELOG),
            notes: None,
            message: DEFAULT_MESSAGE.to_string(),
            commit: false,
            tag: false,
            dry_run: false,
        }
    }

    /// Defaults overlaid with the `[bump]` config section.
    pub fn from_config<P: Into<Utf8PathBuf>>(project_root: P, config: Option<&BumpConfig>) -> Self {
        let mut options = Self::new(project_root);
        let Some(config) = config else {
            return options;
        };

        if let Some(exclude) = &config.exclude {
            options.exclude.clone_from(exclude);
        }
        if let Some(extensions) = &config.extensions {
            options.extensions.clone_from(extensions);
        }
        if let Some(pattern) = &config.find_pattern {
            options.find_pattern.clone_from(pattern);
        }
        if let Some(replacement) = &config.replacement {
            options.replacement.clone_from(replacement);
        }
        if let Some(message) = &config.message {
            options.message.clone_from(message);
        }
        if let Some(changelog) = &config.changelog {
            options.changelog.clone_from(changelog);
        }
        if config.notes.is_some() {
            options.notes.clone_from(&config.notes);
        }
        options
    }

    /// Whether the run ends with git operations.
    pub const fn wants_release(&self) -> bool {
        self.commit || self.tag
    }

    /// Changelog path resolved against the project root.
    pub fn changelog_path(&self) -> Utf8PathBuf {
        if self.changelog.is_absolute() {
            self.changelog.clone()
        } else {
            self.project_root.join(&self.changelog)
        }
    }
}

// ──────────────────────────────────────────────
// Report
// ──────────────────────────────────────────────

/// The outcome of one bump run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BumpReport {
    /// Version produced by the last rewritten file; `None` if nothing changed.
    pub new_version: Option<Version>,
    /// Bump level applied.
    pub level: BumpLevel,
    /// Whether this was a dry run.
    pub dry_run: bool,
    /// Number of candidate files examined.
    pub scanned: usize,
    /// Every file rewritten (or that would be), in visit order.
    pub files: Vec<FileChange>,
    /// Changelog result, if the changelog step ran.
    pub changelog: Option<ChangelogOutcome>,
    /// Release commit, if the git step ran.
    pub release: Option<ReleaseCommit>,
}

impl BumpReport {
    /// `true` when no file held a version to bump.
    pub const fn is_idle(&self) -> bool {
        self.new_version.is_none()
    }
}

// ──────────────────────────────────────────────
// Session
// ──────────────────────────────────────────────

/// State for a single bump run.
#[derive(Debug)]
pub struct BumpSession {
    options: BumpOptions,
    today: NaiveDate,
    scanned: usize,
    new_version: Option<Version>,
    changes: Vec<FileChange>,
}

impl BumpSession {
    /// Session dated today (local time).
    pub fn new(options: BumpOptions) -> Self {
        Self {
            options,
            today: Local::now().date_naive(),
            scanned: 0,
            new_version: None,
            changes: Vec::new(),
        }
    }

    /// Override the changelog date.
    pub fn with_date(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Options this session runs with.
    pub const fn options(&self) -> &BumpOptions {
        &self.options
    }

    /// Scan, rewrite, update the changelog and optionally commit.
    #[instrument(skip(self), fields(root = %self.options.project_root, level = %self.options.level, dry_run = self.options.dry_run))]
    pub fn run(mut self) -> BumpResult<BumpReport> {
        let rewriter = VersionRewriter::new(
            &self.options.find_pattern,
            self.options.level,
            self.options.dry_run,
        )?
        .with_replacement(self.options.replacement.as_str());

        let scanner = FileScanner::new(&self.options.project_root)
            .with_exclude(&self.options.exclude)
            .with_extensions(&self.options.extensions);

        for path in scanner.scan() {
            let path = path?;
            self.scanned += 1;
            if let Some(change) = rewriter.rewrite_file(&path)? {
                self.new_version = Some(change.new.clone());
                self.changes.push(change);
            }
        }

        let Some(version) = self.new_version.clone() else {
            info!(scanned = self.scanned, "no version string found or no change needed");
            return Ok(self.into_report(None, None));
        };
        debug!(%version, files = self.changes.len(), "rewrite phase complete");

        let changelog = self.update_changelog(&version)?;

        let release = if self.options.wants_release() {
            Some(git::commit_and_tag(
                &self.options.project_root,
                &version,
                &self.options.message,
                self.options.dry_run,
            )?)
        } else {
            None
        };

        Ok(self.into_report(Some(changelog), release))
    }

    fn update_changelog(&self, version: &Version) -> BumpResult<ChangelogOutcome> {
        let mut entry = ChangelogEntry::new(version.clone(), self.today, self.options.level);
        if let Some(notes) = &self.options.notes {
            entry = entry.with_notes(notes.as_str());
        }
        let path = self.options.changelog_path();
        Ok(changelog::append_entry(&path, &entry, self.options.dry_run)?)
    }

    fn into_report(
        self,
        changelog: Option<ChangelogOutcome>,
        release: Option<ReleaseCommit>,
    ) -> BumpReport {
        BumpReport {
            new_version: self.new_version,
            level: self.options.level,
            dry_run: self.options.dry_run,
            scanned: self.scanned,
            files: self.changes,
            changelog,
            release,
        }
    }
}

/// Run a bump with today's date.
pub fn run_bump(options: BumpOptions) -> BumpResult<BumpReport> {
    BumpSession::new(options).run()
}

/// Resolve `path` for display relative to `root` when possible.
pub fn display_path<'a>(root: &Utf8Path, path: &'a Utf8Path) -> &'a Utf8Path {
    path.strip_prefix(root).unwrap_or(path)
}
