//! Source reliability formula (spec.md §4.9.1):
//!
//! `R = base[source] * (w_ocr * M_ocr + w_img * M_img + w_ext * M_ext)`
//!
//! with each `M_*` multiplier clamped to `[0, 1]` before weighting.

use crate::config::FusionCoefficients;
use crate::types::{ExtractionMetadata, SourceKind};

fn clamp01(x: f64) -> f64 {
    x.clamp(0.0, 1.0)
}

/// The OCR-confidence multiplier. `1.0` for XML (no OCR pass involved).
fn ocr_multiplier(metadata: &ExtractionMetadata, coefficients: &FusionCoefficients) -> f64 {
    let (Some(mean_confidence), Some(total_words)) =
        (metadata.mean_confidence, metadata.total_words)
    else {
        return 1.0;
    };
    let low_confidence_words = metadata.low_confidence_words.unwrap_or(0) as f64;
    let total = (total_words as f64).max(1.0);
    let base = mean_confidence.powf(coefficients.mean_confidence_exponent);
    let penalty = coefficients.low_confidence_penalty_weight * (low_confidence_words / total);
    clamp01(base + penalty)
}

/// The image-quality multiplier. `1.0` for XML (no image pass involved).
fn image_multiplier(metadata: &ExtractionMetadata) -> f64 {
    clamp01(metadata.quality_index.unwrap_or(1.0))
}

/// The structured-extraction multiplier: the share of extracted fields that
/// were pattern- or catalog-validated.
fn extraction_multiplier(metadata: &ExtractionMetadata) -> f64 {
    let numerator = (metadata.regex_matches + metadata.catalog_validations) as f64;
    let denominator =
        (metadata.total_fields_extracted + metadata.pattern_violations).max(1) as f64;
    clamp01(numerator / denominator)
}

/// Computes the reliability of one source's extraction given its metadata.
pub fn compute_reliability(
    source: SourceKind,
    metadata: &ExtractionMetadata,
    coefficients: &FusionCoefficients,
) -> f64 {
    let base = match source {
        SourceKind::Xml => coefficients.base_reliability_xml,
        SourceKind::Pdf => coefficients.base_reliability_pdf,
        SourceKind::Docx => coefficients.base_reliability_docx,
    };
    let weighted = coefficients.weight_ocr * ocr_multiplier(metadata, coefficients)
        + coefficients.weight_image * image_multiplier(metadata)
        + coefficients.weight_extraction * extraction_multiplier(metadata);
    base * weighted
}
