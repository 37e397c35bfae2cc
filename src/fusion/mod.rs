//! Multi-source Fusion Engine (spec.md §4.9): combines up to three
//! per-source `ExtractedFields` into one fused view plus a full per-field
//! audit trail.

pub mod aggregate;
pub mod field_fusion;
pub mod reliability;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::FusionCoefficients;
use crate::types::{
    Expediente, ExtractedFields, ExtractionMetadata, FieldCandidate, FusionResult, SourceKind,
};

static CASE_ID_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z0-9/\-]{8,}$").unwrap());

/// The fields fusion reconciles across XML/PDF/DOCX. Kept small and
/// explicit rather than reflecting over every `ExtractedFields` member, so
/// adding a fused field is a deliberate code change (spec.md §9).
const FUSED_SCALAR_FIELDS: &[&str] = &["case_id", "cause", "requested_action"];

/// A field marked required for the aggregate score (spec.md §4.9.3); only
/// `case_id` is mandatory at the fusion layer itself — the richer Article
/// 4/17 requirement lists live in `crate::classification`.
const REQUIRED_FIELDS: &[&str] = &["case_id"];

/// One source's contribution to a fusion run. `fields`/`metadata` are
/// `None` when that source's extraction failed outright (spec.md §7) — the
/// fusion engine treats a failed source exactly like one with no present
/// fields, never as an error.
#[derive(Debug, Clone, Default)]
pub struct SourceInput {
    pub source: SourceKind,
    pub fields: Option<ExtractedFields>,
    pub metadata: Option<ExtractionMetadata>,
}

impl SourceInput {
    pub fn failed(source: SourceKind) -> Self {
        Self {
            source,
            fields: None,
            metadata: None,
        }
    }
}

fn scalar_value(fields: &ExtractedFields, field_name: &str) -> Option<String> {
    match field_name {
        "case_id" => fields.case_id.clone(),
        "cause" => fields.cause.clone(),
        "requested_action" => fields.requested_action.clone(),
        _ => None,
    }
}

fn build_candidates(
    inputs: &[SourceInput],
    field_name: &str,
    reliabilities: &std::collections::HashMap<SourceKind, f64>,
) -> Vec<FieldCandidate> {
    SourceKind::ORDERED
        .iter()
        .map(|&source| {
            let input = inputs.iter().find(|i| i.source == source);
            let value = input
                .and_then(|i| i.fields.as_ref())
                .and_then(|f| scalar_value(f, field_name));
            let matches_pattern = field_name == "case_id"
                && value.as_deref().is_some_and(|v| CASE_ID_PATTERN.is_match(v));
            let matches_catalog = input
                .and_then(|i| i.metadata.as_ref())
                .map(|m| m.catalog_validations > 0)
                .unwrap_or(false);
            FieldCandidate {
                source,
                value,
                reliability: *reliabilities.get(&source).unwrap_or(&0.0),
                matches_pattern,
                matches_catalog,
                ocr_confidence: input.and_then(|i| i.metadata.as_ref()).and_then(|m| m.mean_confidence),
            }
        })
        .collect()
}

/// Runs the fusion engine over up to one input per source. `xml_expediente`
/// is the fully-parsed `Expediente` the XML source produced (the only
/// source that can produce one); PDF/DOCX only ever contribute scalar
/// field candidates on top of it.
#[tracing::instrument(skip_all, fields(sources = inputs.len()))]
pub fn fuse(
    inputs: &[SourceInput],
    xml_expediente: Option<Expediente>,
    coefficients: &FusionCoefficients,
) -> FusionResult {
    let reliabilities: std::collections::HashMap<SourceKind, f64> = inputs
        .iter()
        .map(|i| {
            let r = i
                .metadata
                .as_ref()
                .map(|m| reliability::compute_reliability(i.source, m, coefficients))
                .unwrap_or(0.0);
            (i.source, r)
        })
        .collect();

    let field_results: Vec<_> = FUSED_SCALAR_FIELDS
        .iter()
        .map(|field_name| {
            let candidates = build_candidates(inputs, field_name, &reliabilities);
            let result = field_fusion::fuse_field(field_name, &candidates, coefficients);
            tracing::debug!(
                field = field_name,
                decision = ?result.decision,
                confidence = result.confidence,
                "per-field fusion decision"
            );
            result
        })
        .collect();

    let required_fields: Vec<String> = REQUIRED_FIELDS.iter().map(|s| s.to_string()).collect();
    let outcome = aggregate::aggregate(&field_results, &required_fields, coefficients);

    let expediente = xml_expediente.map(|mut e| {
        if let Some(case_id_result) = field_results.iter().find(|r| r.field == "case_id") {
            if let Some(value) = &case_id_result.selected_value {
                e.case_id = value.clone();
            }
        }
        e
    });

    FusionResult {
        expediente,
        overall_confidence: outcome.overall_confidence,
        required_score: outcome.required_score,
        optional_score: outcome.optional_score,
        conflicting_fields: outcome.conflicting_fields,
        missing_required_fields: outcome.missing_required_fields,
        next_action: outcome.next_action,
        field_results,
        source_reliabilities: reliabilities,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn xml_input(case_id: &str) -> SourceInput {
        SourceInput {
            source: SourceKind::Xml,
            fields: Some(ExtractedFields {
                case_id: Some(case_id.to_string()),
                ..Default::default()
            }),
            metadata: Some(ExtractionMetadata::for_xml()),
        }
    }

    fn pdf_input(case_id: &str, mean_confidence: f64) -> SourceInput {
        SourceInput {
            source: SourceKind::Pdf,
            fields: Some(ExtractedFields {
                case_id: Some(case_id.to_string()),
                ..Default::default()
            }),
            metadata: Some(ExtractionMetadata::for_ocr_source(
                SourceKind::Pdf,
                mean_confidence,
                0.1,
                50,
                2,
                0.9,
            )),
        }
    }

    #[test]
    fn all_agree_scenario_resolves_case_id() {
        let coefficients = FusionCoefficients::default();
        let inputs = vec![
            xml_input("A/AS1-2505-088637-PHM"),
            pdf_input("A/AS1-2505-088637-PHM", 0.95),
        ];
        let result = fuse(&inputs, Some(Expediente::default()), &coefficients);
        assert_eq!(
            result.expediente.as_ref().unwrap().case_id,
            "A/AS1-2505-088637-PHM"
        );
        assert!(result.missing_required_fields.is_empty());
    }

    #[test]
    fn failed_source_contributes_null_candidate_not_an_error() {
        let coefficients = FusionCoefficients::default();
        let inputs = vec![xml_input("A/AS1-2505-088637-PHM"), SourceInput::failed(SourceKind::Pdf)];
        let result = fuse(&inputs, Some(Expediente::default()), &coefficients);
        assert_eq!(result.source_reliabilities[&SourceKind::Pdf], 0.0);
        assert!(result.expediente.is_some());
    }

    #[test]
    fn missing_case_id_everywhere_is_reflected_in_missing_required_fields() {
        let coefficients = FusionCoefficients::default();
        let inputs = vec![SourceInput::failed(SourceKind::Xml), SourceInput::failed(SourceKind::Pdf)];
        let result = fuse(&inputs, None, &coefficients);
        assert_eq!(result.missing_required_fields, vec!["case_id".to_string()]);
        assert!(result.expediente.is_none());
    }
}
