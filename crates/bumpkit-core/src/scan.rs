//! Candidate file discovery.
//!
//! Walks a project tree and yields files whose extension marks them as
//! version-bearing source, pruning excluded directories (VCS metadata,
//! virtual environments, editor state) without descending into them.

use std::collections::BTreeSet;

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;
use tracing::{debug, trace};
use walkdir::WalkDir;

/// Directory names skipped unless the caller overrides them.
pub const DEFAULT_EXCLUDE: &[&str] = &[".git", "env", "venv", ".venv", ".env", ".idea", ".vscode"];

/// File extensions scanned unless the caller overrides them.
pub const DEFAULT_EXTENSIONS: &[&str] = &["py"];

/// Errors from directory traversal.
#[derive(Error, Debug)]
pub enum ScanError {
    /// A directory entry could not be read.
    #[error("failed to walk {root}: {source}")]
    Walk {
        /// The scan root.
        root: Utf8PathBuf,
        /// The underlying traversal error (carries the failing path).
        source: walkdir::Error,
    },
}

/// Result alias for scan operations.
pub type ScanResult<T> = Result<T, ScanError>;

/// Finds candidate files under a project root.
#[derive(Debug, Clone)]
pub struct FileScanner {
    root: Utf8PathBuf,
    exclude: BTreeSet<String>,
    extensions: BTreeSet<String>,
}

impl FileScanner {
    /// Scanner rooted at `root` with the default exclusions and extensions.
    pub fn new<P: AsRef<Utf8Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            exclude: DEFAULT_EXCLUDE.iter().map(|s| (*s).to_string()).collect(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    /// Replace the set of directory names to prune.
    pub fn with_exclude<I, S>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude = dirs.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the set of file extensions (without the dot) to yield.
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions
            .into_iter()
            .map(|ext| ext.into().trim_start_matches('.').to_string())
            .collect();
        self
    }

    /// Lazily walk the tree.
    ///
    /// Siblings are visited in file-name order. The root itself is never
    /// pruned, even if its name is in the exclusion set. Symlinks to files
    /// are yielded; symlinks to directories are not descended into.
    pub fn scan(&self) -> impl Iterator<Item = ScanResult<Utf8PathBuf>> + '_ {
        debug!(root = %self.root, exclude = ?self.exclude, "scanning for version files");

        WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |entry| {
                if entry.depth() == 0 || !entry.file_type().is_dir() {
                    return true;
                }
                let pruned = entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| self.exclude.contains(name));
                if pruned {
                    trace!(path = %entry.path().display(), "pruning excluded directory");
                }
                !pruned
            })
            .filter_map(move |entry| {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(source) => {
                        return Some(Err(ScanError::Walk {
                            root: self.root.clone(),
                            source,
                        }));
                    }
                };
                // Symlinked files count; symlinked directories are not followed.
                let is_file = entry.file_type().is_file()
                    || (entry.path_is_symlink() && entry.path().is_file());
                if !is_file {
                    return None;
                }
                match Utf8PathBuf::from_path_buf(entry.into_path()) {
                    Ok(path) if self.matches(&path) => Some(Ok(path)),
                    Ok(_) => None,
                    Err(path) => {
                        debug!(path = %path.display(), "skipping non-UTF-8 path");
                        None
                    }
                }
            })
    }

    fn matches(&self, path: &Utf8Path) -> bool {
        path.extension()
            .is_some_and(|ext| self.extensions.contains(ext))
    }
}

/// Split a comma-separated directory list, dropping blanks.
pub fn parse_exclude(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}
