//! Offline speech via `espeak-ng` or `espeak`.
//!
//! The text is fed on stdin so arbitrarily long documents avoid argv limits.
//! espeak writes WAV data; the file keeps the requested name.

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use camino::Utf8Path;
use tracing::{debug, info, instrument};

use super::{SpeechBackend, SpeechError, SpeechResult};

const CANDIDATES: [&str; 2] = ["espeak-ng", "espeak"];

/// Local espeak synthesizer.
#[derive(Debug, Clone)]
pub struct EspeakSpeech {
    binary: PathBuf,
    voice: String,
}

impl EspeakSpeech {
    /// Find an espeak binary on `PATH`, preferring `espeak-ng`.
    pub fn locate(voice: &str) -> SpeechResult<Self> {
        let binary = CANDIDATES
            .iter()
            .find_map(|name| which::which(name).ok())
            .ok_or_else(|| SpeechError::EngineUnavailable(CANDIDATES.join(" / ")))?;
        debug!(binary = %binary.display(), "found espeak");
        Ok(Self::with_binary(binary, voice))
    }

    /// Use a specific binary.
    pub fn with_binary(binary: impl Into<PathBuf>, voice: &str) -> Self {
        Self {
            binary: binary.into(),
            voice: voice.to_string(),
        }
    }

    fn tool_name(&self) -> String {
        self.binary
            .file_name()
            .map_or_else(|| "espeak".to_string(), |n| n.to_string_lossy().into_owned())
    }
}

impl SpeechBackend for EspeakSpeech {
    fn name(&self) -> &'static str {
        "espeak"
    }

    #[instrument(skip(self, text), fields(voice = %self.voice, chars = text.len()))]
    fn synthesize(&self, text: &str, output: &Utf8Path) -> SpeechResult<()> {
        if text.trim().is_empty() {
            return Err(SpeechError::EmptyText);
        }

        let tool = self.tool_name();
        let failed = |message: String| SpeechError::ToolFailed {
            tool: tool.clone(),
            message,
        };

        let mut child = Command::new(&self.binary)
            .args(["-v", self.voice.as_str(), "-w", output.as_str(), "--stdin"])
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| failed(e.to_string()))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(text.as_bytes())
                .map_err(|e| failed(e.to_string()))?;
        }

        let result = child.wait_with_output().map_err(|e| failed(e.to_string()))?;
        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr).trim().to_string();
            return Err(failed(if stderr.is_empty() {
                result.status.to_string()
            } else {
                stderr
            }));
        }

        info!(%output, "audio file written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn empty_text_is_rejected_before_spawning() {
        let espeak = EspeakSpeech::with_binary("/nonexistent/espeak", "en");
        let err = espeak
            .synthesize("  \n", Utf8Path::new("out.mp3"))
            .unwrap_err();
        assert!(matches!(err, SpeechError::EmptyText));
    }

    #[test]
    fn missing_binary_is_a_tool_failure() {
        let tmp = TempDir::new().unwrap();
        let out = camino::Utf8PathBuf::try_from(tmp.path().join("out.mp3")).unwrap();
        let espeak = EspeakSpeech::with_binary("/nonexistent/espeak-ng", "en");

        let err = espeak.synthesize("hello", &out).unwrap_err();
        match err {
            SpeechError::ToolFailed { tool, .. } => assert_eq!(tool, "espeak-ng"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
