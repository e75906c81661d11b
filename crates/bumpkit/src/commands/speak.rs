//! Speak command: read a PDF aloud into an audio file.

use std::time::Duration;

use anyhow::{Context, bail};
use camino::Utf8Path;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use tracing::{info, instrument};

use bumpkit_core::config::SpeechConfig;
use bumpkit_core::pdf;
use bumpkit_core::speech::{self, DEFAULT_LANG, SpeechEngine};

/// Resolved inputs for one conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeakRequest<'a> {
    /// PDF to read.
    pub input: &'a Utf8Path,
    /// Audio file to write.
    pub output: &'a Utf8Path,
    /// Backend to use.
    pub engine: SpeechEngine,
    /// Language / voice code.
    pub lang: String,
}

impl<'a> SpeakRequest<'a> {
    /// Merge CLI choices over config over defaults.
    pub fn resolve(
        input: &'a Utf8Path,
        output: &'a Utf8Path,
        engine: Option<SpeechEngine>,
        lang: Option<String>,
        config: Option<&SpeechConfig>,
    ) -> Self {
        let engine = engine
            .or_else(|| config.and_then(|c| c.engine))
            .unwrap_or_default();
        let lang = lang
            .or_else(|| config.and_then(|c| c.lang.clone()))
            .unwrap_or_else(|| DEFAULT_LANG.to_string());
        Self {
            input,
            output,
            engine,
            lang,
        }
    }
}

/// Execute `pdf-to-speech`.
#[instrument(name = "cmd_speak", skip_all, fields(input = %request.input, engine = %request.engine))]
pub fn cmd_speak(request: &SpeakRequest<'_>) -> anyhow::Result<()> {
    speech::ensure_mp3_output(request.output)?;

    info!(input = %request.input, "extracting text");
    let text = pdf::extract_text(request.input).context("failed to read PDF")?;
    if text.is_empty() {
        bail!("no text extracted from {}", request.input);
    }
    info!(chars = text.len(), "text extracted");

    let backend = request
        .engine
        .backend(&request.lang)
        .with_context(|| format!("{} engine unavailable", request.engine))?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner:.cyan} {msg}")?);
    spinner.set_message(format!("Synthesizing speech with {}...", backend.name()));
    spinner.enable_steady_tick(Duration::from_millis(80));

    let result = backend.synthesize(&text, request.output);
    spinner.finish_and_clear();
    result.context("speech synthesis failed")?;

    info!(output = %request.output, "conversion complete");
    println!(
        "{} Audio saved to {}",
        "✓".green(),
        request.output.cyan()
    );
    Ok(())
}
