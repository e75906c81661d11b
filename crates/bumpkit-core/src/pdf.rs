//! PDF text extraction.

use std::fs;
use std::panic::{self, AssertUnwindSafe};

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::error::FsError;

/// Errors from reading a PDF.
#[derive(Error, Debug)]
pub enum PdfError {
    /// The file could not be read.
    #[error(transparent)]
    Fs(#[from] FsError),

    /// The file is not a PDF we can extract text from.
    #[error("failed to extract text from {path}: {message}")]
    Parse {
        /// PDF path.
        path: Utf8PathBuf,
        /// Parser error.
        message: String,
    },
}

/// Extract the text of every page of `path`, in page order.
///
/// The result is normalized with [`normalize_text`]; a PDF with no text
/// layer yields an empty string.
#[instrument]
pub fn extract_text(path: &Utf8Path) -> Result<String, PdfError> {
    let bytes = fs::read(path).map_err(|e| FsError::from_io(path, "reading PDF", e))?;
    let parse_error = |message: String| PdfError::Parse {
        path: path.to_path_buf(),
        message,
    };

    // pdf-extract panics on some malformed inputs.
    let raw = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem(&bytes)
    }))
    .map_err(|_| parse_error("parser panicked".to_string()))?
    .map_err(|e| parse_error(e.to_string()))?;

    let text = normalize_text(&raw);
    debug!(bytes = bytes.len(), chars = text.len(), "extracted text");
    Ok(text)
}

/// Replace newlines with spaces and trim the ends.
pub fn normalize_text(raw: &str) -> String {
    raw.replace(['\r', '\n'], " ").trim().to_string()
}
