//! End-to-end tests for `version-bump`
//!
//! These tests invoke the compiled binary as a subprocess to verify
//! that the CLI behaves correctly from a user's perspective.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Returns a Command running `version-bump` with logs kept out of the way.
///
/// Note: `cargo_bin` is marked deprecated for edge cases involving custom
/// cargo build directories, but works correctly for standard project layouts.
#[allow(deprecated)]
fn cmd(logs: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("version-bump").unwrap();
    cmd.env("BUMPKIT_LOG_DIR", logs.path())
        .env_remove("BUMPKIT_LOG_PATH")
        .env_remove("RUST_LOG");
    cmd
}

/// A project with `pkg/app.py` at 1.2.3 and, optionally, a changelog.
fn project(with_changelog: bool) -> TempDir {
    let tmp = TempDir::new().unwrap();
    fs::create_dir_all(tmp.path().join("pkg")).unwrap();
    fs::write(tmp.path().join("pkg/app.py"), "__version__ = \"1.2.3\"\n").unwrap();
    if with_changelog {
        fs::write(tmp.path().join("CHANGELOG.md"), "# Changelog\n").unwrap();
    }
    tmp
}

fn read(path: impl AsRef<Path>) -> String {
    fs::read_to_string(path).unwrap()
}

// =============================================================================
// Help & Version
// =============================================================================

#[test]
fn help_flag_shows_usage() {
    let logs = TempDir::new().unwrap();
    cmd(&logs)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("--find-pattern"))
        .stdout(predicate::str::contains("--git-tag"));
}

#[test]
fn version_flag_shows_version() {
    let logs = TempDir::new().unwrap();
    cmd(&logs)
        .arg("-V")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn rejects_unknown_bump_type() {
    let logs = TempDir::new().unwrap();
    cmd(&logs)
        .args(["--type", "huge"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

// =============================================================================
// Bumping
// =============================================================================

#[test]
fn patch_bump_updates_file_and_changelog() {
    let logs = TempDir::new().unwrap();
    let project = project(true);

    cmd(&logs)
        .arg("--project")
        .arg(project.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("1.2.4"));

    assert_eq!(
        read(project.path().join("pkg/app.py")),
        "__version__ = \"1.2.4\"\n"
    );
    let changelog = read(project.path().join("CHANGELOG.md"));
    assert!(changelog.starts_with("# Changelog\n"));
    assert!(changelog.contains("## [1.2.4] - "));
    assert!(changelog.contains("### Patch\n- Bumped patch version.\n"));
}

#[test]
fn major_bump_from_current_directory() {
    let logs = TempDir::new().unwrap();
    let project = project(false);

    cmd(&logs)
        .current_dir(project.path())
        .args(["-t", "major"])
        .assert()
        .success();

    assert_eq!(
        read(project.path().join("pkg/app.py")),
        "__version__ = \"2.0.0\"\n"
    );
}

#[test]
fn missing_changelog_is_skipped() {
    let logs = TempDir::new().unwrap();
    let project = project(false);

    cmd(&logs)
        .arg("-p")
        .arg(project.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No changelog"))
        .stderr(predicate::str::contains("changelog not found"));

    assert!(!project.path().join("CHANGELOG.md").exists());
}

#[test]
fn quiet_silences_missing_changelog_warning() {
    let logs = TempDir::new().unwrap();
    let project = project(false);

    cmd(&logs)
        .arg("-p")
        .arg(project.path())
        .arg("-q")
        .assert()
        .success()
        .stderr(predicate::str::contains("changelog not found").not());
}

#[test]
fn dry_run_changes_nothing() {
    let logs = TempDir::new().unwrap();
    let project = project(true);

    for _ in 0..2 {
        cmd(&logs)
            .arg("-p")
            .arg(project.path())
            .args(["--dry-run", "-t", "minor"])
            .assert()
            .success()
            .stdout(predicate::str::contains("1.3.0"))
            .stdout(predicate::str::contains("Dry run"));
    }

    assert_eq!(
        read(project.path().join("pkg/app.py")),
        "__version__ = \"1.2.3\"\n"
    );
    assert_eq!(read(project.path().join("CHANGELOG.md")), "# Changelog\n");
}

#[test]
fn nothing_to_bump_still_succeeds() {
    let logs = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();
    fs::write(project.path().join("main.py"), "print('hello')\n").unwrap();

    cmd(&logs)
        .arg("-p")
        .arg(project.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "No version string found or no change needed.",
        ));
}

#[test]
fn excluded_directories_are_left_alone() {
    let logs = TempDir::new().unwrap();
    let project = project(false);
    fs::create_dir_all(project.path().join("vendor")).unwrap();
    fs::write(
        project.path().join("vendor/lib.py"),
        "__version__ = \"9.9.9\"\n",
    )
    .unwrap();

    cmd(&logs)
        .arg("-p")
        .arg(project.path())
        .args(["--exclude", "vendor,.git"])
        .assert()
        .success();

    assert_eq!(
        read(project.path().join("vendor/lib.py")),
        "__version__ = \"9.9.9\"\n"
    );
    assert_eq!(
        read(project.path().join("pkg/app.py")),
        "__version__ = \"1.2.4\"\n"
    );
}

#[test]
fn custom_find_pattern() {
    let logs = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();
    fs::write(project.path().join("setup.py"), "__version__ = '0.4.1'\n").unwrap();

    cmd(&logs)
        .arg("-p")
        .arg(project.path())
        .args(["-f", r"__version__ = '(\d+\.\d+\.\d+)'"])
        .assert()
        .success();

    assert_eq!(
        read(project.path().join("setup.py")),
        "__version__ = \"0.4.2\"\n"
    );
}

#[test]
fn invalid_find_pattern_fails() {
    let logs = TempDir::new().unwrap();
    let project = project(false);

    cmd(&logs)
        .arg("-p")
        .arg(project.path())
        .args(["-f", "("])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid find pattern"));
}

#[test]
fn malformed_version_fails() {
    let logs = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();
    fs::write(project.path().join("app.py"), "__version__ = \"1.2\"\n").unwrap();

    cmd(&logs)
        .arg("-p")
        .arg(project.path())
        .args(["-f", r#"__version__ = "([^"]+)""#])
        .assert()
        .failure()
        .stderr(predicate::str::contains("malformed version"));
}

#[test]
fn missing_project_directory_fails() {
    let logs = TempDir::new().unwrap();
    let tmp = TempDir::new().unwrap();

    cmd(&logs)
        .arg("-p")
        .arg(tmp.path().join("nope"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("project directory not found"));
}

// =============================================================================
// JSON Output
// =============================================================================

#[test]
fn json_report_is_valid() {
    let logs = TempDir::new().unwrap();
    let project = project(true);

    let output = cmd(&logs)
        .arg("-p")
        .arg(project.path())
        .args(["--json", "--dry-run"])
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&output.get_output().stdout);
    let json: serde_json::Value = serde_json::from_str(&stdout).expect("valid JSON");
    assert_eq!(json["new_version"], "1.2.4");
    assert_eq!(json["level"], "patch");
    assert_eq!(json["dry_run"], true);
    assert_eq!(json["tool"]["name"], "version-bump");
    assert_eq!(json["changelog"]["status"], "planned");
    assert_eq!(json["files"][0]["previous"], "1.2.3");
}

// =============================================================================
// Git
// =============================================================================

#[test]
fn commit_outside_repository_fails_after_writing() {
    let logs = TempDir::new().unwrap();
    let project = project(true);

    cmd(&logs)
        .arg("-p")
        .arg(project.path())
        .arg("--commit")
        .env("GIT_CEILING_DIRECTORIES", project.path().parent().unwrap())
        .assert()
        .failure()
        .stderr(predicate::str::contains("release commit failed"));

    assert_eq!(
        read(project.path().join("pkg/app.py")),
        "__version__ = \"1.2.4\"\n"
    );
    assert!(read(project.path().join("CHANGELOG.md")).contains("## [1.2.4]"));
}

#[test]
fn commit_and_tag_in_repository() {
    if !git_available() {
        return;
    }
    let logs = TempDir::new().unwrap();
    let project = project(true);
    git(project.path(), &["init", "-q"]);
    git(project.path(), &["add", "."]);
    git(project.path(), &["commit", "-q", "-m", "initial"]);

    cmd(&logs)
        .arg("-p")
        .arg(project.path())
        .args(["-c", "-g", "-m", "release {version}"])
        .envs(git_identity())
        .assert()
        .success()
        .stdout(predicate::str::contains("v1.2.4"));

    let tags = git(project.path(), &["tag", "--list"]);
    assert_eq!(tags.trim(), "v1.2.4");
    let subject = git(project.path(), &["log", "-1", "--format=%s"]);
    assert_eq!(subject.trim(), "release 1.2.4");
}

fn git_identity() -> [(&'static str, &'static str); 4] {
    [
        ("GIT_AUTHOR_NAME", "Test"),
        ("GIT_AUTHOR_EMAIL", "test@example.com"),
        ("GIT_COMMITTER_NAME", "Test"),
        ("GIT_COMMITTER_EMAIL", "test@example.com"),
    ]
}

fn git_available() -> bool {
    std::process::Command::new("git")
        .arg("--version")
        .output()
        .is_ok_and(|o| o.status.success())
}

fn git(dir: &Path, args: &[&str]) -> String {
    let output = std::process::Command::new("git")
        .args(args)
        .current_dir(dir)
        .envs(git_identity())
        .env("GIT_CONFIG_NOSYSTEM", "1")
        .output()
        .unwrap();
    assert!(output.status.success(), "git {args:?} failed");
    String::from_utf8_lossy(&output.stdout).into_owned()
}
