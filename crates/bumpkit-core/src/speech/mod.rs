//! Text-to-speech backends.
//!
//! Synthesis is delegated to external services. Two interchangeable
//! backends implement [`SpeechBackend`]:
//!
//! - [`google::GoogleSpeech`] - Google Translate's speech endpoint (network)
//! - [`espeak::EspeakSpeech`] - local `espeak-ng` / `espeak` binary

pub mod espeak;
pub mod google;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::FsError;

/// Language used when none is configured.
pub const DEFAULT_LANG: &str = "en";

/// Errors from speech synthesis.
#[derive(Error, Debug)]
pub enum SpeechError {
    /// Writing the audio file failed.
    #[error(transparent)]
    Fs(#[from] FsError),

    /// The output path does not name an `.mp3` file.
    #[error("output file must have .mp3 extension: {path}")]
    UnsupportedOutput {
        /// Rejected path.
        path: Utf8PathBuf,
    },

    /// There is nothing to say.
    #[error("no text to synthesize")]
    EmptyText,

    /// The HTTP request could not be made or its body read.
    #[error("speech request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The speech service answered with an error status.
    #[error("speech service returned HTTP {status} for chunk {chunk}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Zero-based chunk index.
        chunk: usize,
    },

    /// No binary for the requested engine was found on `PATH`.
    #[error("{0} is not installed or not on PATH")]
    EngineUnavailable(String),

    /// The synthesis tool ran but failed.
    #[error("{tool} failed: {message}")]
    ToolFailed {
        /// Tool name.
        tool: String,
        /// Error details.
        message: String,
    },
}

/// Result alias for speech operations.
pub type SpeechResult<T> = Result<T, SpeechError>;

/// Converts text into an audio file.
pub trait SpeechBackend {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Synthesize `text` into `output`, replacing any existing file.
    fn synthesize(&self, text: &str, output: &Utf8Path) -> SpeechResult<()>;
}

/// Available synthesis engines.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum SpeechEngine {
    /// Google Translate speech (requires internet).
    #[default]
    Google,
    /// Local espeak-ng / espeak.
    Espeak,
}

impl SpeechEngine {
    /// Build the backend for this engine speaking `lang`.
    pub fn backend(self, lang: &str) -> SpeechResult<Box<dyn SpeechBackend>> {
        Ok(match self {
            Self::Google => Box::new(google::GoogleSpeech::new(lang)?),
            Self::Espeak => Box::new(espeak::EspeakSpeech::locate(lang)?),
        })
    }
}

impl std::fmt::Display for SpeechEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Google => write!(f, "google"),
            Self::Espeak => write!(f, "espeak"),
        }
    }
}

/// Reject output paths that do not end in `.mp3` (case-insensitive).
pub fn ensure_mp3_output(path: &Utf8Path) -> SpeechResult<()> {
    let is_mp3 = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("mp3"));
    if is_mp3 {
        Ok(())
    } else {
        Err(SpeechError::UnsupportedOutput {
            path: path.to_path_buf(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_mp3_any_case() {
        assert!(ensure_mp3_output(Utf8Path::new("out.mp3")).is_ok());
        assert!(ensure_mp3_output(Utf8Path::new("dir/OUT.MP3")).is_ok());
    }

    #[test]
    fn rejects_other_extensions() {
        for bad in ["out.wav", "out", "mp3", "out.mp3.txt"] {
            assert!(
                matches!(
                    ensure_mp3_output(Utf8Path::new(bad)),
                    Err(SpeechError::UnsupportedOutput { .. })
                ),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn engine_names() {
        assert_eq!(SpeechEngine::default(), SpeechEngine::Google);
        assert_eq!(SpeechEngine::Espeak.to_string(), "espeak");
    }
}
