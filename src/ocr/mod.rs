//! OCR Executor (spec.md §4.4) — interface only. The real engine
//! (Tesseract-equivalent) is an external collaborator (spec.md §1); this
//! crate ships the trait plus test doubles.

#[cfg(feature = "image-quality")]
pub mod enhancement_loop;

use async_trait::async_trait;

use crate::error::{ExpedienteError, Result};
use crate::types::{OcrConfig, OcrResult};

/// A pluggable OCR backend. Implementations must reject null/empty input
/// deterministically and never panic.
#[async_trait]
pub trait OcrExecutor: Send + Sync {
    async fn execute(&self, image_bytes: &[u8], config: &OcrConfig) -> Result<OcrResult>;
}

/// Always fails with `Ocr`. Useful for exercising the enhancement loop's
/// downgrade-to-baseline paths.
#[derive(Debug, Default)]
pub struct NullOcrExecutor;

#[async_trait]
impl OcrExecutor for NullOcrExecutor {
    async fn execute(&self, image_bytes: &[u8], _config: &OcrConfig) -> Result<OcrResult> {
        if image_bytes.is_empty() {
            return Err(ExpedienteError::ocr("empty input"));
        }
        Err(ExpedienteError::ocr("no OCR backend configured"))
    }
}

/// A deterministic test double: returns canned `(text, mean_confidence)`
/// pairs keyed by whether the bytes match a registered fixture, falling
/// back to a default result otherwise. Lets enhancement-loop tests exercise
/// the distance-comparison logic without a real OCR engine.
#[derive(Debug, Clone)]
pub struct StubDeterministicOcrExecutor {
    fixtures: Vec<(Vec<u8>, OcrResult)>,
    default_result: OcrResult,
}

impl StubDeterministicOcrExecutor {
    pub fn new(default_result: OcrResult) -> Self {
        Self {
            fixtures: Vec::new(),
            default_result,
        }
    }

    pub fn with_fixture(mut self, bytes: impl Into<Vec<u8>>, result: OcrResult) -> Self {
        self.fixtures.push((bytes.into(), result));
        self
    }
}

#[async_trait]
impl OcrExecutor for StubDeterministicOcrExecutor {
    async fn execute(&self, image_bytes: &[u8], _config: &OcrConfig) -> Result<OcrResult> {
        if image_bytes.is_empty() {
            return Err(ExpedienteError::ocr("empty input"));
        }
        for (fixture_bytes, result) in &self.fixtures {
            if fixture_bytes == image_bytes {
                return Ok(result.clone());
            }
        }
        Ok(self.default_result.clone())
    }
}
