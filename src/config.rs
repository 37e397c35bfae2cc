//! Tunable configuration passed by value into the stages that need it.
//!
//! No global mutable configuration singleton (spec.md §9): every struct
//! here is a plain serde value constructed by the caller and threaded
//! through explicitly.

use serde::{Deserialize, Serialize};

/// Weights, thresholds, exponents and boosts driving the fusion engine
/// (spec.md §6). Defaults match the covered system exactly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FusionCoefficients {
    pub base_reliability_xml: f64,
    pub base_reliability_pdf: f64,
    pub base_reliability_docx: f64,

    pub weight_ocr: f64,
    pub weight_image: f64,
    pub weight_extraction: f64,

    pub mean_confidence_exponent: f64,
    pub low_confidence_penalty_weight: f64,

    pub pattern_match_boost: f64,
    pub catalog_validation_boost: f64,

    pub fuzzy_match_threshold: f64,
    pub fuzzy_match_confidence_penalty: f64,

    pub voting_margin: f64,

    pub required_fields_weight: f64,
    pub optional_fields_weight: f64,

    pub auto_process_threshold: f64,
    pub manual_review_threshold: f64,
}

impl Default for FusionCoefficients {
    fn default() -> Self {
        Self {
            base_reliability_xml: 0.60,
            base_reliability_pdf: 0.85,
            base_reliability_docx: 0.70,

            weight_ocr: 0.50,
            weight_image: 0.30,
            weight_extraction: 0.20,

            mean_confidence_exponent: 1.5,
            low_confidence_penalty_weight: -0.8,

            pattern_match_boost: 1.10,
            catalog_validation_boost: 1.15,

            fuzzy_match_threshold: 0.85,
            fuzzy_match_confidence_penalty: 0.90,

            voting_margin: 0.05,

            required_fields_weight: 0.70,
            optional_fields_weight: 0.30,

            auto_process_threshold: 0.85,
            manual_review_threshold: 0.70,
        }
    }
}

impl FusionCoefficients {
    /// Coefficient invariant from spec.md §8: the three metadata weights
    /// sum to 1.
    pub fn weights_are_normalized(&self) -> bool {
        (self.weight_ocr + self.weight_image + self.weight_extraction - 1.0).abs() < 1e-9
    }
}

/// Ambient pipeline knobs the distilled spec didn't enumerate but any real
/// deployment needs (SPEC_FULL.md §2.3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Size of the OCR worker pool. Spec.md §5: "limited-concurrency pool,
    /// default 1 per physical core".
    pub max_concurrent_ocr: usize,
    /// Gates the Q1_Poor adaptive-thresholding path, marked experimental
    /// in spec.md §4.2.
    pub enable_experimental_adaptive_threshold: bool,
    /// Test-only override to force enhancement on/off regardless of what
    /// the filter-selection strategy picked.
    pub image_enhancement_enabled_override: Option<bool>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_concurrent_ocr: num_cpus::get_physical().max(1),
            enable_experimental_adaptive_threshold: false,
            image_enhancement_enabled_override: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec_section_6() {
        let c = FusionCoefficients::default();
        assert_eq!(c.base_reliability_xml, 0.60);
        assert_eq!(c.base_reliability_pdf, 0.85);
        assert_eq!(c.base_reliability_docx, 0.70);
        assert_eq!(c.weight_ocr, 0.50);
        assert_eq!(c.weight_image, 0.30);
        assert_eq!(c.weight_extraction, 0.20);
        assert_eq!(c.mean_confidence_exponent, 1.5);
        assert_eq!(c.low_confidence_penalty_weight, -0.8);
        assert_eq!(c.pattern_match_boost, 1.10);
        assert_eq!(c.catalog_validation_boost, 1.15);
        assert_eq!(c.fuzzy_match_threshold, 0.85);
        assert_eq!(c.fuzzy_match_confidence_penalty, 0.90);
        assert_eq!(c.required_fields_weight, 0.70);
        assert_eq!(c.optional_fields_weight, 0.30);
        assert_eq!(c.auto_process_threshold, 0.85);
        assert_eq!(c.manual_review_threshold, 0.70);
    }

    #[test]
    fn default_weights_are_normalized() {
        assert!(FusionCoefficients::default().weights_are_normalized());
    }

    #[test]
    fn pipeline_config_defaults_to_at_least_one_worker() {
        assert!(PipelineConfig::default().max_concurrent_ocr >= 1);
    }
}
