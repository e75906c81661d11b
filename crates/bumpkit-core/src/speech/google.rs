//! Google Translate speech backend.
//!
//! The endpoint only accepts short inputs, so text is split on whitespace
//! into chunks of at most [`MAX_CHUNK_CHARS`] characters. Each chunk comes
//! back as an MP3 frame stream; the streams are concatenated in order.

use std::fs;
use std::time::Duration;

use camino::Utf8Path;
use reqwest::blocking::Client;
use tracing::{debug, info, instrument};

use super::{SpeechBackend, SpeechError, SpeechResult};
use crate::error::FsError;

const ENDPOINT: &str = "https://translate.google.com/translate_tts";

/// Longest chunk the endpoint accepts.
pub const MAX_CHUNK_CHARS: usize = 100;

/// Synthesizes speech through Google Translate.
#[derive(Debug, Clone)]
pub struct GoogleSpeech {
    client: Client,
    lang: String,
}

impl GoogleSpeech {
    /// Backend speaking `lang` (e.g. `en`, `fr`).
    pub fn new(lang: &str) -> SpeechResult<Self> {
        let client = Client::builder()
            .user_agent(concat!("bumpkit/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            lang: lang.to_string(),
        })
    }

    fn fetch_chunk(&self, chunk: &str, index: usize, total: usize) -> SpeechResult<Vec<u8>> {
        let textlen = chunk.chars().count().to_string();
        let total = total.to_string();
        let idx = index.to_string();

        let response = self
            .client
            .get(ENDPOINT)
            .query(&[
                ("ie", "UTF-8"),
                ("client", "tw-ob"),
                ("q", chunk),
                ("tl", self.lang.as_str()),
                ("total", total.as_str()),
                ("idx", idx.as_str()),
                ("textlen", textlen.as_str()),
            ])
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(SpeechError::Status {
                status: status.as_u16(),
                chunk: index,
            });
        }
        Ok(response.bytes()?.to_vec())
    }
}

impl SpeechBackend for GoogleSpeech {
    fn name(&self) -> &'static str {
        "google"
    }

    #[instrument(skip(self, text), fields(lang = %self.lang, chars = text.len()))]
    fn synthesize(&self, text: &str, output: &Utf8Path) -> SpeechResult<()> {
        let chunks = chunk_text(text, MAX_CHUNK_CHARS);
        if chunks.is_empty() {
            return Err(SpeechError::EmptyText);
        }

        let mut audio = Vec::new();
        for (index, chunk) in chunks.iter().enumerate() {
            debug!(index, total = chunks.len(), "requesting chunk");
            audio.extend(self.fetch_chunk(chunk, index, chunks.len())?);
        }

        fs::write(output, &audio).map_err(|e| FsError::from_io(output, "writing audio", e))?;
        info!(%output, bytes = audio.len(), "MP3 file written");
        Ok(())
    }
}

/// Split `text` on whitespace into chunks of at most `max` characters.
///
/// Words longer than `max` are hard-split. Whitespace runs collapse to a
/// single space.
pub fn chunk_text(text: &str, max: usize) -> Vec<String> {
    let max = max.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if word_len > max {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let chars: Vec<char> = word.chars().collect();
            let mut pieces = chars.chunks(max).map(|c| c.iter().collect::<String>());
            let last = pieces.next_back().unwrap_or_default();
            chunks.extend(pieces);
            current_len = last.chars().count();
            current = last;
            continue;
        }

        let needed = if current.is_empty() { word_len } else { current_len + 1 + word_len };
        if needed > max {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if !current.is_empty() {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
