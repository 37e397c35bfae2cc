//! OCR request/response value types (spec.md §4.4, §6).

use serde::{Deserialize, Serialize};

/// Input configuration handed to an [`crate::ocr::OcrExecutor`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrConfig {
    pub primary_language: String,
    pub fallback_language: String,
    /// Tesseract-style page segmentation mode.
    pub psm: u8,
    /// Tesseract-style OCR engine mode.
    pub oem: u8,
    pub confidence_threshold: f64,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            primary_language: "spa".to_string(),
            fallback_language: "eng".to_string(),
            psm: 6,
            oem: 1,
            confidence_threshold: 0.0,
        }
    }
}

/// Output of a single OCR pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrResult {
    pub text: String,
    pub mean_confidence: f64,
    pub median_confidence: f64,
    pub per_word_confidence: Vec<f64>,
    pub language_used: String,
}

impl OcrResult {
    pub fn low_confidence_word_count(&self, threshold: f64) -> usize {
        self.per_word_confidence
            .iter()
            .filter(|c| **c < threshold)
            .count()
    }

    pub fn total_words(&self) -> usize {
        self.per_word_confidence.len()
    }
}
