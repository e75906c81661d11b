//! pdf-to-speech CLI
#![deny(unsafe_code)]

use anyhow::Context;
use bumpkit::commands::speak::{self, SpeakRequest};
use bumpkit::{SpeechCli, current_dir, init_logging, load_config, utf8_path};
use bumpkit_core::ToolInfo;
use clap::Parser;
use tracing::debug;

fn main() -> anyhow::Result<()> {
    let tool = ToolInfo::resolve(env!("CARGO_BIN_NAME"), env!("CARGO_PKG_VERSION"))
        .context("invalid package version")?;
    let cli = SpeechCli::parse();
    cli.global.color.apply();

    let cwd = current_dir()?;
    let config = load_config(&cli.global, &cwd)?;
    let _guard = init_logging(tool.name(), &cli.global, &config, cli.logfile.clone())?;

    let input = utf8_path(cli.input, "input path")?;
    let output = utf8_path(cli.output, "output path")?;
    let request = SpeakRequest::resolve(
        &input,
        &output,
        cli.engine,
        cli.lang,
        config.speech.as_ref(),
    );

    debug!(
        %tool,
        verbose = cli.global.verbose,
        quiet = cli.global.quiet,
        engine = %request.engine,
        lang = %request.lang,
        "CLI initialized"
    );

    let result = speak::cmd_speak(&request);
    if let Err(ref err) = result {
        tracing::error!(error = %err, "fatal error");
    }
    result
}
