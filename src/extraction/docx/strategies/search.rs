use once_cell::sync::Lazy;
use regex::Regex;

use crate::extraction::docx::structure::{DocxStructure, ParsedDocument};
use crate::extraction::docx::strategies::DocxStrategy;
use crate::types::ExtractedFields;

static CASE_ID_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Z0-9/\-]{10,}").unwrap());
static CAUSE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:causa|motivo)\s*[:\-]?\s*([^\n\.]{3,120})").unwrap());

const CROSS_REFERENCE_PHRASES: &[&str] = &[
    "arriba mencionada",
    "anteriormente indicado",
    "previamente",
];

/// Resolves backward cross-references: when a paragraph says "la arriba
/// mencionada ..." it means "whatever value appeared earlier in the
/// document", so this strategy walks paragraphs in order and, on hitting a
/// cross-reference phrase, fills any still-missing field from the nearest
/// matching value seen so far.
pub struct SearchStrategy;

impl DocxStrategy for SearchStrategy {
    fn name(&self) -> &'static str {
        "search"
    }

    fn can_handle(&self, structure: &DocxStructure) -> bool {
        structure.has_cross_references
    }

    fn confidence(&self, structure: &DocxStructure) -> f64 {
        if self.can_handle(structure) {
            0.6
        } else {
            0.0
        }
    }

    fn extract(&self, doc: &ParsedDocument) -> ExtractedFields {
        let mut fields = ExtractedFields::default();
        let mut last_case_id: Option<String> = None;
        let mut last_cause: Option<String> = None;

        for paragraph in &doc.paragraphs {
            let text = paragraph.text();
            let lower = text.to_lowercase();

            if let Some(m) = CASE_ID_PATTERN.find(&text) {
                last_case_id = Some(m.as_str().to_string());
            }
            if let Some(caps) = CAUSE_PATTERN.captures(&text) {
                last_cause = Some(caps[1].trim().to_string());
            }

            let references_earlier_value = CROSS_REFERENCE_PHRASES
                .iter()
                .any(|phrase| lower.contains(phrase));
            if references_earlier_value {
                if fields.case_id.is_none() {
                    fields.case_id = last_case_id.clone();
                }
                if fields.cause.is_none() {
                    fields.cause = last_cause.clone();
                }
            }
        }

        fields
    }
}
