//! Build automation tasks for bumpkit.
//!
//! This crate provides development utilities:
//! - `completions` - Generate shell completions for both binaries
//! - `man` - Generate man pages for both binaries
//!
//! Run `cargo xtask --help` to see available commands.

#![deny(unsafe_code)]

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "xtask")]
#[command(about = "Project maintenance tasks")]
struct Xtask {
    #[command(subcommand)]
    command: Task,
}

#[derive(Subcommand, Debug)]
enum Task {
    /// Generate shell completions for version-bump and pdf-to-speech.
    Completions(commands::completions::CompletionsArgs),

    /// Generate manpages for version-bump and pdf-to-speech.
    Man(commands::man::ManArgs),
}

fn main() -> Result<(), String> {
    let task = Xtask::parse();
    match task.command {
        Task::Completions(args) => commands::completions::cmd_completions(args),
        Task::Man(args) => commands::man::cmd_man(args),
    }
}

pub fn workspace_root() -> PathBuf {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    manifest_dir.parent().unwrap_or(&manifest_dir).to_path_buf()
}

/// Every shipped binary with its clap command.
pub fn binaries() -> [(&'static str, clap::Command); 2] {
    [
        ("version-bump", bumpkit::bump_command()),
        ("pdf-to-speech", bumpkit::speech_command()),
    ]
}
