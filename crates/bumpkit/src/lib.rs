//! Library interface for the bumpkit binaries.
//!
//! This crate exposes the argument parsers and command implementations of
//! `version-bump` and `pdf-to-speech` as a library, primarily for
//! documentation generation and testing. The entry points are `main.rs`
//! and `bin/pdf_to_speech.rs`.
//!
//! # Structure
//!
//! - [`BumpCli`] - `version-bump` argument parser (clap derive)
//! - [`SpeechCli`] - `pdf-to-speech` argument parser
//! - [`GlobalArgs`] - flags shared by both binaries
//! - [`commands`] - Command implementations
//! - [`observability`] - Logging setup
//!
//! # Documentation Generation
//!
//! [`bump_command()`] and [`speech_command()`] return the clap `Command`s
//! used by `xtask` for man pages and shell completions.

pub mod commands;

pub mod observability;

use std::path::PathBuf;

use anyhow::Context;
use bumpkit_core::config::{Config, ConfigLoader};
use bumpkit_core::speech::SpeechEngine;
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Args, CommandFactory, Parser};

/// Color output preference.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum ColorChoice {
    /// Detect terminal capabilities automatically.
    #[default]
    Auto,
    /// Always emit colors.
    Always,
    /// Never emit colors.
    Never,
}

impl ColorChoice {
    /// Configure global color output based on this choice.
    ///
    /// Call this once at startup to set the color mode.
    pub fn apply(self) {
        match self {
            Self::Auto => {} // owo-colors auto-detects by default
            Self::Always => owo_colors::set_override(true),
            Self::Never => owo_colors::set_override(false),
        }
    }
}

const ENV_HELP: &str = "\
ENVIRONMENT VARIABLES:
    RUST_LOG             Log filter (e.g., debug, bumpkit_core=trace)
    BUMPKIT_LOG_PATH     Explicit log file path
    BUMPKIT_LOG_DIR      Log directory
";

/// Flags shared by both binaries.
#[derive(Args, Debug, Default)]
pub struct GlobalArgs {
    /// Path to configuration file (overrides discovery)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Only print errors (suppresses warnings/info)
    #[arg(short, long)]
    pub quiet: bool,

    /// More detail (repeatable; e.g. -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Colorize output
    #[arg(long, value_enum, default_value_t)]
    pub color: ColorChoice,
}

/// Command-line interface for `version-bump`.
#[derive(Parser, Debug)]
#[command(name = "version-bump")]
#[command(about = "Bump the semantic version in project files and record it in the changelog", long_about = None)]
#[command(version)]
#[command(after_long_help = ENV_HELP)]
pub struct BumpCli {
    /// Bump options.
    #[command(flatten)]
    pub bump: commands::bump::BumpArgs,

    /// Shared flags.
    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Command-line interface for `pdf-to-speech`.
#[derive(Parser, Debug)]
#[command(name = "pdf-to-speech")]
#[command(about = "Convert the text of a PDF into spoken audio", long_about = None)]
#[command(version)]
#[command(after_long_help = ENV_HELP)]
pub struct SpeechCli {
    /// Input PDF file
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output audio file (must end in .mp3)
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Speech engine [default: google, or `speech.engine` from config]
    #[arg(short, long, value_enum)]
    pub engine: Option<SpeechEngine>,

    /// Language / voice code [default: en, or `speech.lang` from config]
    #[arg(short, long, value_name = "LANG")]
    pub lang: Option<String>,

    /// Write the JSONL log to this file
    #[arg(long, value_name = "FILE")]
    pub logfile: Option<PathBuf>,

    /// Shared flags.
    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Returns the `version-bump` clap command for documentation generation.
pub fn bump_command() -> clap::Command {
    BumpCli::command()
}

/// Returns the `pdf-to-speech` clap command for documentation generation.
pub fn speech_command() -> clap::Command {
    SpeechCli::command()
}

/// Convert a CLI path to UTF-8.
pub fn utf8_path(path: PathBuf, what: &str) -> anyhow::Result<Utf8PathBuf> {
    Utf8PathBuf::try_from(path)
        .map_err(|e| anyhow::anyhow!("{what} is not valid UTF-8: {}", e.into_path_buf().display()))
}

/// The current directory as UTF-8.
pub fn current_dir() -> anyhow::Result<Utf8PathBuf> {
    let cwd = std::env::current_dir().context("failed to determine current directory")?;
    utf8_path(cwd, "current directory")
}

/// Load layered configuration, searching for project config from `search_from`.
pub fn load_config(global: &GlobalArgs, search_from: &Utf8Path) -> anyhow::Result<Config> {
    let mut loader = ConfigLoader::new().with_project_search(search_from);
    if let Some(ref config_path) = global.config {
        let config_path = utf8_path(config_path.clone(), "config path")?;
        loader = loader.with_file(&config_path);
    }
    loader.load().context("failed to load configuration")
}

/// Install logging for `service`. Hold the returned guard until exit.
pub fn init_logging(
    service: &str,
    global: &GlobalArgs,
    config: &Config,
    log_path: Option<PathBuf>,
) -> anyhow::Result<observability::ObservabilityGuard> {
    let obs_config = observability::ObservabilityConfig::new(service)
        .with_log_dir(config.log_dir.as_ref().map(|dir| dir.as_std_path().to_path_buf()))
        .with_log_path(log_path)
        .with_stderr_level(observability::stderr_level(global.quiet, global.verbose));
    let env_filter =
        observability::env_filter(global.quiet, global.verbose, config.log_level.as_str());
    observability::init_observability(&obs_config, env_filter)
        .context("failed to initialize logging")
}
