//! Error types for bumpkit-core

use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;

/// Errors that can occur when working with configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to deserialize configuration.
    #[error("invalid configuration: {0}")]
    Deserialize(#[from] Box<figment::Error>),
}

/// Result type alias using [`ConfigError`].
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Filesystem failures, classified by what the caller can do about them.
///
/// Every variant carries the path involved so log lines and error chains
/// point at the file without extra context.
#[derive(Error, Debug)]
pub enum FsError {
    /// The file or directory does not exist.
    #[error("{path}: no such file or directory")]
    NotFound {
        /// Path that was missing.
        path: Utf8PathBuf,
    },

    /// The file exists but cannot be read or written.
    #[error("{path}: permission denied while {operation}")]
    PermissionDenied {
        /// Path that was refused.
        path: Utf8PathBuf,
        /// What we were doing (e.g. "reading", "writing").
        operation: &'static str,
    },

    /// Any other I/O failure.
    #[error("{path}: failed while {operation}: {source}")]
    Io {
        /// Path involved.
        path: Utf8PathBuf,
        /// What we were doing.
        operation: &'static str,
        /// The underlying I/O error.
        source: io::Error,
    },
}

impl FsError {
    /// Classify an [`io::Error`] raised while performing `operation` on `path`.
    pub fn from_io(path: &Utf8Path, operation: &'static str, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::NotFound {
                path: path.to_path_buf(),
            },
            io::ErrorKind::PermissionDenied => Self::PermissionDenied {
                path: path.to_path_buf(),
                operation,
            },
            _ => Self::Io {
                path: path.to_path_buf(),
                operation,
                source: err,
            },
        }
    }

    /// The path this error refers to.
    pub fn path(&self) -> &Utf8Path {
        match self {
            Self::NotFound { path } | Self::PermissionDenied { path, .. } | Self::Io { path, .. } => {
                path
            }
        }
    }
}
