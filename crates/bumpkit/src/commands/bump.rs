//! Bump command: thin CLI layer over `bumpkit_core::bump`.

use std::path::PathBuf;

use anyhow::{Context, bail};
use camino::{Utf8Path, Utf8PathBuf};
use clap::Args;
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::{debug, instrument};

use bumpkit_core::ToolInfo;
use bumpkit_core::bump::{self, BumpOptions, BumpReport, display_path};
use bumpkit_core::changelog::ChangelogOutcome;
use bumpkit_core::config::Config;
use bumpkit_core::scan::parse_exclude;
use bumpkit_core::version::BumpLevel;

/// Arguments for `version-bump`.
#[derive(Args, Debug, Default)]
pub struct BumpArgs {
    /// Project root to scan [default: current directory]
    #[arg(short, long, value_name = "PATH")]
    pub project: Option<PathBuf>,

    /// Which version component to bump
    #[arg(short = 't', long = "type", value_enum, default_value_t)]
    pub level: BumpLevel,

    /// Regex locating the version; group 1 is the version if present
    #[arg(short, long, value_name = "REGEX")]
    pub find_pattern: Option<String>,

    /// Commit the bump with git
    #[arg(short, long)]
    pub commit: bool,

    /// Create an annotated git tag v<version>
    #[arg(short = 'g', long)]
    pub git_tag: bool,

    /// Commit and tag message; {version} is replaced
    #[arg(short, long, value_name = "TEMPLATE")]
    pub message: Option<String>,

    /// Show what would change without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Comma-separated directory names to skip
    #[arg(long, value_delimiter = ',', value_name = "DIRS")]
    pub exclude: Option<Vec<String>>,

    /// Output as JSON (for scripting)
    #[arg(long)]
    pub json: bool,
}

impl BumpArgs {
    /// Project root: `--project` resolved against `cwd`, else `cwd`.
    pub fn project_root(&self, cwd: &Utf8Path) -> anyhow::Result<Utf8PathBuf> {
        let Some(project) = &self.project else {
            return Ok(cwd.to_path_buf());
        };
        let project = crate::utf8_path(project.clone(), "project path")?;
        Ok(if project.is_absolute() {
            project
        } else {
            cwd.join(project)
        })
    }

    /// Merge flags over the config-derived options.
    fn apply(self, mut options: BumpOptions) -> BumpOptions {
        options.level = self.level;
        options.commit = self.commit;
        options.tag = self.git_tag;
        options.dry_run = self.dry_run;
        if let Some(pattern) = self.find_pattern {
            options.find_pattern = pattern;
        }
        if let Some(message) = self.message {
            options.message = message;
        }
        if let Some(exclude) = self.exclude {
            options.exclude = parse_exclude(&exclude.join(","));
        }
        options
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    tool: &'a ToolInfo,
    #[serde(flatten)]
    report: &'a BumpReport,
}

/// Execute `version-bump`.
#[instrument(name = "cmd_bump", skip_all, fields(%project_root))]
pub fn cmd_bump(
    args: BumpArgs,
    tool: &ToolInfo,
    config: &Config,
    project_root: &Utf8Path,
) -> anyhow::Result<()> {
    if !project_root.is_dir() {
        bail!("project directory not found: {project_root}");
    }

    let json = args.json;
    let options = args.apply(BumpOptions::from_config(project_root, config.bump.as_ref()));
    debug!(?options, "resolved bump options");

    let report = bump::run_bump(options).context("version bump failed")?;

    if json {
        let out = JsonReport {
            tool,
            report: &report,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        print_report(&report, project_root);
    }
    Ok(())
}

fn print_report(report: &BumpReport, root: &Utf8Path) {
    let Some(version) = &report.new_version else {
        println!("{}", "No version string found or no change needed.".yellow());
        return;
    };

    for file in &report.files {
        println!(
            "  {} {}: {} → {}",
            "→".dimmed(),
            display_path(root, &file.path).cyan(),
            file.previous.to_string().dimmed(),
            file.new.to_string().green()
        );
    }

    let verb = if report.dry_run { "Would bump" } else { "Bumped" };
    println!(
        "  {} {verb} {} version to {}",
        "✓".green(),
        report.level,
        version.to_string().green().bold()
    );

    match &report.changelog {
        Some(ChangelogOutcome::Appended { path, .. }) => {
            println!("  {} Changelog updated: {}", "✓".green(), display_path(root, path));
        }
        Some(ChangelogOutcome::Planned { path, entry }) => {
            println!("  {} Would append to {}:", "·".dimmed(), display_path(root, path));
            for line in entry.lines().filter(|l| !l.is_empty()) {
                println!("      {}", line.dimmed());
            }
        }
        Some(ChangelogOutcome::Missing { path }) => {
            println!(
                "  {} No changelog at {}, skipped",
                "!".yellow(),
                display_path(root, path)
            );
        }
        None => {}
    }

    if let Some(release) = &report.release {
        if release.executed {
            println!("  {} Committed and tagged {}", "✓".green(), release.tag.bold());
        } else {
            println!(
                "  {} Would commit and tag {}: {}",
                "·".dimmed(),
                release.tag.bold(),
                release.message.dimmed()
            );
        }
    }

    if report.dry_run {
        println!();
        println!("{}", "Dry run: no changes made.".yellow());
    }
}
