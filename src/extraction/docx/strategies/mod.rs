//! The five DOCX extraction strategies (spec.md §4.7), dispatched by the
//! orchestrator through one shared trait rather than an inheritance
//! hierarchy (spec.md §9).

mod complement;
mod fuzzy;
mod key_value;
mod search;
mod table_based;

pub use complement::ComplementStrategy;
pub use fuzzy::FuzzyStrategy;
pub use key_value::KeyValueStrategy;
pub use search::SearchStrategy;
pub use table_based::TableBasedStrategy;

use crate::extraction::docx::structure::{DocxStructure, ParsedDocument};
use crate::types::ExtractedFields;

/// A single field-extraction approach over a parsed DOCX. `can_handle`/
/// `confidence` let the orchestrator pick or rank strategies without
/// knowing their internals.
pub trait DocxStrategy: Send + Sync {
    fn name(&self) -> &'static str;
    fn can_handle(&self, structure: &DocxStructure) -> bool;
    fn confidence(&self, structure: &DocxStructure) -> f64;
    fn extract(&self, doc: &ParsedDocument) -> ExtractedFields;
}

/// The non-complement strategies, in the order the orchestrator asks them
/// for a confidence score (spec.md §4.7 lists them in this order).
pub fn standard_strategies() -> Vec<Box<dyn DocxStrategy>> {
    vec![
        Box::new(TableBasedStrategy),
        Box::new(KeyValueStrategy),
        Box::new(SearchStrategy),
        Box::new(FuzzyStrategy),
    ]
}

/// Recognized label synonyms mapped to canonical field names, shared by the
/// table-based and key-value strategies.
pub(super) fn canonical_field_for_label(label: &str) -> Option<&'static str> {
    let normalized = label
        .trim()
        .trim_end_matches(':')
        .to_lowercase();
    match normalized.as_str() {
        "numero de expediente" | "número de expediente" | "expediente" | "no. de expediente" => {
            Some("case_id")
        }
        "causa" | "motivo" => Some("cause"),
        "accion solicitada" | "acción solicitada" | "accion" | "acción" => {
            Some("requested_action")
        }
        _ => None,
    }
}

pub(super) fn apply_canonical_field(fields: &mut ExtractedFields, canonical: &str, value: String) {
    if value.trim().is_empty() {
        return;
    }
    match canonical {
        "case_id" => fields.case_id.get_or_insert(value),
        "cause" => fields.cause.get_or_insert(value),
        "requested_action" => fields.requested_action.get_or_insert(value),
        _ => return,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_field_recognizes_known_synonyms() {
        assert_eq!(canonical_field_for_label("Número de Expediente:"), Some("case_id"));
        assert_eq!(canonical_field_for_label("Causa"), Some("cause"));
        assert_eq!(canonical_field_for_label("unknown label"), None);
    }

    #[test]
    fn standard_strategies_are_in_documented_order() {
        let strategies = standard_strategies();
        let names: Vec<&str> = strategies.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["table_based", "key_value", "search", "fuzzy"]);
    }
}
