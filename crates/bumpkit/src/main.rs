//! version-bump CLI
#![deny(unsafe_code)]

use anyhow::Context;
use bumpkit::{BumpCli, commands, current_dir, init_logging, load_config};
use bumpkit_core::ToolInfo;
use bumpkit_core::config::find_project_config;
use clap::Parser;
use tracing::debug;

fn main() -> anyhow::Result<()> {
    let tool = ToolInfo::resolve(env!("CARGO_BIN_NAME"), env!("CARGO_PKG_VERSION"))
        .context("invalid package version")?;
    let cli = BumpCli::parse();
    cli.global.color.apply();

    let cwd = current_dir()?;
    let project_root = cli.bump.project_root(&cwd)?;
    let config = load_config(&cli.global, &project_root)?;
    let _guard = init_logging(tool.name(), &cli.global, &config, None)?;

    debug!(
        %tool,
        verbose = cli.global.verbose,
        quiet = cli.global.quiet,
        json = cli.bump.json,
        color = ?cli.global.color,
        %project_root,
        config_file = ?find_project_config(&project_root),
        "CLI initialized"
    );

    let result = commands::bump::cmd_bump(cli.bump, &tool, &config, &project_root);
    if let Err(ref err) = result {
        tracing::error!(error = %err, "fatal error");
    }
    result
}
