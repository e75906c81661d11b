//! Release commit and tag creation.
//!
//! Shells out to `git` for all operations. This ensures we inherit the user's
//! SSH keys, GPG signing, hooks, and other configuration.
//!
//! The three steps (stage, commit, tag) run in sequence with no rollback: if
//! tagging fails, the commit stays.

use std::process::Command;

use camino::Utf8Path;
use semver::Version;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::rewrite::VERSION_PLACEHOLDER;

/// Default commit and tag message.
pub const DEFAULT_MESSAGE: &str = "chore: bump version to {version}";

/// Errors from git operations.
#[derive(Error, Debug)]
pub enum GitError {
    /// Failed to execute the `git` command.
    #[error("failed to run git: {0}")]
    Exec(#[from] std::io::Error),

    /// `git` returned a non-zero exit code.
    #[error("git {command} failed: {stderr}")]
    Command {
        /// The git subcommand that failed (e.g., "commit").
        command: String,
        /// Captured stderr.
        stderr: String,
    },

    /// Not inside a git repository.
    #[error("not a git repository (or any parent up to mount point)")]
    NotARepo,
}

/// Result alias for git operations.
pub type GitResult<T> = Result<T, GitError>;

/// A release commit and tag, created or planned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseCommit {
    /// Tag name (`v<version>`).
    pub tag: String,
    /// Rendered commit and tag message.
    pub message: String,
    /// `false` under dry-run.
    pub executed: bool,
}

/// Substitute `{version}` in a message template.
pub fn render_message(template: &str, version: &Version) -> String {
    template.replace(VERSION_PLACEHOLDER, &version.to_string())
}

/// Tag name for a version.
pub fn tag_name(version: &Version) -> String {
    format!("v{version}")
}

/// Stage everything, commit, and create an annotated tag in `repo_dir`.
///
/// Under `dry_run` the commands are logged and nothing runs.
#[instrument(skip(template), fields(%repo_dir, %version))]
pub fn commit_and_tag(
    repo_dir: &Utf8Path,
    version: &Version,
    template: &str,
    dry_run: bool,
) -> GitResult<ReleaseCommit> {
    let message = render_message(template, version);
    let tag = tag_name(version);

    let steps: [&[&str]; 3] = [
        &["add", "."],
        &["commit", "-m", message.as_str()],
        &["tag", "-a", tag.as_str(), "-m", message.as_str()],
    ];

    for args in steps {
        if dry_run {
            info!(command = %display_command(args), "dry run: not executing");
            continue;
        }
        git(repo_dir, args)?;
    }

    if !dry_run {
        info!(%tag, "created release commit and tag");
    }

    Ok(ReleaseCommit {
        tag,
        message,
        executed: !dry_run,
    })
}

fn display_command(args: &[&str]) -> String {
    let mut line = String::from("git");
    for arg in args {
        line.push(' ');
        if arg.contains(char::is_whitespace) {
            line.push_str(&format!("{arg:?}"));
        } else {
            line.push_str(arg);
        }
    }
    line
}

/// Run a git command in `dir` and return its stdout.
fn git(dir: &Utf8Path, args: &[&str]) -> GitResult<String> {
    debug!(command = %display_command(args), %dir, "running git");
    let output = Command::new("git")
        .args(args)
        .current_dir(dir.as_std_path())
        .output()?;

    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

        // Detect "not a git repo" specifically
        if stderr.contains("not a git repository") {
            return Err(GitError::NotARepo);
        }

        Err(GitError::Command {
            command: args.first().unwrap_or(&"").to_string(),
            stderr,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use tempfile::TempDir;

    #[test]
    fn renders_message_placeholder() {
        let v = Version::new(1, 2, 4);
        assert_eq!(
            render_message(DEFAULT_MESSAGE, &v),
            "chore: bump version to 1.2.4"
        );
        assert_eq!(render_message("release", &v), "release");
    }

    #[test]
    fn tag_is_v_prefixed() {
        assert_eq!(tag_name(&Version::new(3, 0, 0)), "v3.0.0");
    }

    #[test]
    fn display_quotes_arguments_with_spaces() {
        assert_eq!(
            display_command(&["commit", "-m", "chore: bump"]),
            r#"git commit -m "chore: bump""#
        );
    }

    #[test]
    fn dry_run_executes_nothing() {
        // No repository here; a real run would fail.
        let tmp = TempDir::new().unwrap();
        let dir = Utf8PathBuf::try_from(tmp.path().to_path_buf()).unwrap();

        let release = commit_and_tag(&dir, &Version::new(0, 1, 1), DEFAULT_MESSAGE, true).unwrap();
        assert_eq!(release.tag, "v0.1.1");
        assert_eq!(release.message, "chore: bump version to 0.1.1");
        assert!(!release.executed);
    }

    #[test]
    fn fails_outside_a_repository() {
        let tmp = TempDir::new().unwrap();
        let dir = Utf8PathBuf::try_from(tmp.path().to_path_buf()).unwrap();

        // Either git is missing (Exec) or it refuses to run outside a repo.
        let result = commit_and_tag(&dir, &Version::new(0, 1, 1), DEFAULT_MESSAGE, false);
        assert!(result.is_err());
    }

    #[test]
    fn git_error_on_bad_command() {
        let tmp = TempDir::new().unwrap();
        let dir = Utf8PathBuf::try_from(tmp.path().to_path_buf()).unwrap();
        assert!(git(&dir, &["not-a-real-subcommand"]).is_err());
    }
}
