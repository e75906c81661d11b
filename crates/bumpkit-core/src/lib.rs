//! Core library for bumpkit.
//!
//! This crate provides the types and functionality behind the
//! `version-bump` and `pdf-to-speech` binaries.
//!
//! # Modules
//!
//! - [`bump`] - Bump orchestration (scan, rewrite, changelog, commit)
//! - [`changelog`] - Append-only changelog entries
//! - [`config`] - Configuration loading and management
//! - [`error`] - Shared error types and result aliases
//! - [`git`] - Release commit and tag creation
//! - [`info`] - Tool name and version resolved at start-up
//! - [`pdf`] - PDF text extraction
//! - [`rewrite`] - In-place version string rewriting
//! - [`scan`] - Candidate file discovery
//! - [`speech`] - Text-to-speech backends
//! - [`version`] - Version parsing and bump computation
//!
//! # Quick Start
//!
//! ```no_run
//! use bumpkit_core::bump::{BumpOptions, run_bump};
//!
//! let report = run_bump(BumpOptions::new(".")).expect("bump failed");
//! if let Some(version) = report.new_version {
//!     println!("bumped to {version}");
//! }
//! ```
#![deny(unsafe_code)]

pub mod bump;

pub mod changelog;

pub mod config;

pub mod error;

pub mod git;

pub mod info;

pub mod pdf;

pub mod rewrite;

pub mod scan;

pub mod speech;

pub mod version;

pub use config::{Config, ConfigLoader, LogLevel};

pub use error::{ConfigError, ConfigResult, FsError};

pub use info::ToolInfo;

// Re-export semver so downstream crates don't need a direct dependency.
pub use semver;
