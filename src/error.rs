//! Crate-wide error type.
//!
//! Mirrors the failure taxonomy in the design: no single-source failure
//! halts the pipeline, so most of these variants are attached to
//! per-source metadata or a warnings list rather than aborting a run.
//! Only [`ExpedienteError::InvalidInput`] and [`ExpedienteError::Other`]
//! are expected to propagate out of the top-level pipeline call.

use crate::types::SourceKind;
use thiserror::Error;

/// All failure modes produced by this crate.
#[derive(Error, Debug)]
pub enum ExpedienteError {
    /// Empty bytes, null inputs, malformed root element, unknown file kind.
    /// Surfaced immediately, never retried.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A single-source extractor failed. The caller downgrades that
    /// source's candidates to null and continues with the rest.
    #[error("extraction failed for {source:?}: {message}")]
    Extraction { source: SourceKind, message: String },

    /// The OCR engine failed or timed out.
    #[error("OCR failed: {message}")]
    Ocr { message: String },

    /// An image enhancement filter raised. Non-fatal: callers downgrade to
    /// the baseline bytes.
    #[error("filter failed: {message}")]
    Filter { message: String },

    /// Decoding the supplied bytes as an image failed.
    #[error("invalid image: {0}")]
    InvalidImage(String),

    /// A parser-level syntax error (XML, DOCX XML parts).
    #[error("parse error: {0}")]
    Parsing(String),

    /// The operation observed a cancellation signal.
    #[error("operation cancelled")]
    Cancelled,

    /// Catch-all for invariant violations that should never normally occur.
    #[error("internal error: {0}")]
    Other(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ExpedienteError {
    pub fn extraction(source: SourceKind, message: impl Into<String>) -> Self {
        Self::Extraction {
            source,
            message: message.into(),
        }
    }

    pub fn ocr(message: impl Into<String>) -> Self {
        Self::Ocr { message: message.into() }
    }

    pub fn filter(message: impl Into<String>) -> Self {
        Self::Filter { message: message.into() }
    }

    /// True for failure kinds that are recoverable by downgrading to a
    /// baseline/null value rather than aborting the pipeline.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Extraction { .. } | Self::Ocr { .. } | Self::Filter { .. }
        )
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ExpedienteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_input_display() {
        let err = ExpedienteError::InvalidInput("empty bytes".to_string());
        assert_eq!(err.to_string(), "invalid input: empty bytes");
    }

    #[test]
    fn extraction_error_carries_source() {
        let err = ExpedienteError::extraction(SourceKind::Docx, "zip open failed");
        match err {
            ExpedienteError::Extraction { source, message } => {
                assert_eq!(source, SourceKind::Docx);
                assert_eq!(message, "zip open failed");
            }
            _ => panic!("expected Extraction variant"),
        }
    }

    #[test]
    fn recoverable_classification() {
        assert!(ExpedienteError::ocr("timeout").is_recoverable());
        assert!(ExpedienteError::filter("denoise panicked").is_recoverable());
        assert!(ExpedienteError::extraction(SourceKind::Xml, "bad root").is_recoverable());
        assert!(!ExpedienteError::InvalidInput("x".into()).is_recoverable());
        assert!(!ExpedienteError::Cancelled.is_recoverable());
    }

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: ExpedienteError = io_err.into();
        assert!(matches!(err, ExpedienteError::Io(_)));
    }
}
