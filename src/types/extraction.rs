//! Per-source, pre-fusion snapshots.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::source::SourceKind;

/// A currency amount as extracted, keeping the original text for audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Monto {
    pub currency: String,
    pub value: f64,
    pub original_text: String,
}

impl Monto {
    /// Uniqueness key used by the merge rules in spec.md §4.8: amounts are
    /// deduplicated by (currency, value), not by their original text.
    pub fn dedup_key(&self) -> (String, u64) {
        (self.currency.clone(), self.value.to_bits())
    }
}

/// Per-source extracted field set, emitted before any fusion happens.
///
/// Insertion order of `montos`/`fechas` carries no semantic weight except
/// for the "first non-null wins" merge contract (spec.md §3).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExtractedFields {
    pub case_id: Option<String>,
    pub cause: Option<String>,
    pub requested_action: Option<String>,
    pub fechas: Vec<String>,
    pub montos: Vec<Monto>,
    pub additional_fields: HashMap<String, String>,
}

impl ExtractedFields {
    pub fn is_empty(&self) -> bool {
        self.case_id.is_none()
            && self.cause.is_none()
            && self.requested_action.is_none()
            && self.fechas.is_empty()
            && self.montos.is_empty()
            && self.additional_fields.is_empty()
    }
}

/// Per-source quality vector feeding the reliability formula (spec.md
/// §4.9.1). Image-quality and OCR-confidence fields stay `None` for XML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionMetadata {
    pub source: SourceKind,
    pub mean_confidence: Option<f64>,
    pub min_confidence: Option<f64>,
    pub total_words: Option<usize>,
    pub low_confidence_words: Option<usize>,
    pub quality_index: Option<f64>,
    pub regex_matches: u32,
    pub catalog_validations: u32,
    pub pattern_violations: u32,
    pub total_fields_extracted: u32,
}

impl ExtractionMetadata {
    /// Builds the metadata shape an XML source always has: no OCR, no
    /// image-quality concern (spec.md §4.6 — "remain null for XML").
    pub fn for_xml() -> Self {
        Self {
            source: SourceKind::Xml,
            mean_confidence: None,
            min_confidence: None,
            total_words: None,
            low_confidence_words: None,
            quality_index: None,
            regex_matches: 0,
            catalog_validations: 0,
            pattern_violations: 0,
            total_fields_extracted: 0,
        }
    }

    /// Builds the metadata shape for an OCR-backed source (PDF or DOCX text
    /// layer), where the caller supplies the OCR/image-quality numbers once
    /// they're known.
    pub fn for_ocr_source(
        source: SourceKind,
        mean_confidence: f64,
        min_confidence: f64,
        total_words: usize,
        low_confidence_words: usize,
        quality_index: f64,
    ) -> Self {
        debug_assert_ne!(source, SourceKind::Xml);
        Self {
            source,
            mean_confidence: Some(mean_confidence),
            min_confidence: Some(min_confidence),
            total_words: Some(total_words),
            low_confidence_words: Some(low_confidence_words),
            quality_index: Some(quality_index),
            regex_matches: 0,
            catalog_validations: 0,
            pattern_violations: 0,
            total_fields_extracted: 0,
        }
    }

    pub fn record_field(&mut self, regex_match: bool, catalog_match: bool) {
        if regex_match {
            self.regex_matches += 1;
        }
        if catalog_match {
            self.catalog_validations += 1;
        } else if !regex_match {
            self.pattern_violations += 1;
        }
        self.total_fields_extracted += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monto_dedup_key_ignores_original_text() {
        let a = Monto {
            currency: "MXN".into(),
            value: 1000.0,
            original_text: "$1,000.00".into(),
        };
        let b = Monto {
            currency: "MXN".into(),
            value: 1000.0,
            original_text: "1000 pesos".into(),
        };
        assert_eq!(a.dedup_key(), b.dedup_key());
    }

    #[test]
    fn xml_metadata_has_no_ocr_or_image_fields() {
        let m = ExtractionMetadata::for_xml();
        assert!(m.mean_confidence.is_none());
        assert!(m.quality_index.is_none());
        assert_eq!(m.source, SourceKind::Xml);
    }

    #[test]
    fn ocr_source_metadata_carries_quality_fields() {
        let m = ExtractionMetadata::for_ocr_source(SourceKind::Pdf, 0.9, 0.4, 100, 5, 0.7);
        assert_eq!(m.mean_confidence, Some(0.9));
        assert_eq!(m.quality_index, Some(0.7));
    }

    #[test]
    fn record_field_counts_pattern_violation_when_neither_matches() {
        let mut m = ExtractionMetadata::for_xml();
        m.record_field(false, false);
        assert_eq!(m.pattern_violations, 1);
        assert_eq!(m.total_fields_extracted, 1);
        m.record_field(true, false);
        assert_eq!(m.regex_matches, 1);
        assert_eq!(m.pattern_violations, 1);
    }

    #[test]
    fn extracted_fields_empty_check() {
        let mut f = ExtractedFields::default();
        assert!(f.is_empty());
        f.case_id = Some("X".into());
        assert!(!f.is_empty());
    }
}
