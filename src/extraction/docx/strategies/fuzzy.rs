use once_cell::sync::Lazy;
use regex::Regex;

use crate::extraction::docx::structure::{DocxStructure, ParsedDocument};
use crate::extraction::docx::strategies::DocxStrategy;
use crate::types::ExtractedFields;

static CASE_ID_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Z0-9/\-]{10,}").unwrap());
static CAUSE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:causa|motivo)\s*[:\-]?\s*([^\n\.]{3,120})").unwrap());
static ACTION_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:acci[oó]n solicitada|se solicita)\s*[:\-]?\s*([^\n\.]{3,160})").unwrap()
});

/// The unconditional fallback: regex/keyword matching over the whole
/// plaintext, with no assumption about document structure. Always reports
/// `can_handle`, but at the lowest confidence of the four standard
/// strategies so structured strategies are preferred when available.
pub struct FuzzyStrategy;

impl DocxStrategy for FuzzyStrategy {
    fn name(&self) -> &'static str {
        "fuzzy"
    }

    fn can_handle(&self, _structure: &DocxStructure) -> bool {
        true
    }

    fn confidence(&self, _structure: &DocxStructure) -> f64 {
        0.3
    }

    fn extract(&self, doc: &ParsedDocument) -> ExtractedFields {
        let text = doc.full_text();
        let mut fields = ExtractedFields::default();

        if let Some(m) = CASE_ID_PATTERN.find(&text) {
            fields.case_id = Some(m.as_str().to_string());
        }
        if let Some(caps) = CAUSE_PATTERN.captures(&text) {
            fields.cause = Some(caps[1].trim().to_string());
        }
        if let Some(caps) = ACTION_PATTERN.captures(&text) {
            fields.requested_action = Some(caps[1].trim().to_string());
        }

        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::docx::structure::{ParsedParagraph, ParsedRun};

    fn text_doc(text: &str) -> ParsedDocument {
        ParsedDocument {
            paragraphs: vec![ParsedParagraph {
                runs: vec![ParsedRun {
                    text: text.to_string(),
                    bold: false,
                }],
            }],
            tables: vec![],
        }
    }

    #[test]
    fn extracts_case_id_and_cause_from_plain_text() {
        let doc = text_doc("Expediente A/AS1-2505-088637-PHM. Causa: Fraude fiscal. fin.");
        let fields = FuzzyStrategy.extract(&doc);
        assert_eq!(fields.case_id.as_deref(), Some("A/AS1-2505-088637-PHM"));
        assert_eq!(fields.cause.as_deref(), Some("Fraude fiscal"));
    }

    #[test]
    fn always_can_handle_and_low_confidence() {
        let structure = DocxStructure {
            has_tables: false,
            has_bold_labels: false,
            has_cross_references: false,
            has_structured_format: false,
            has_key_value_pairs: false,
            tables: vec![],
            recommended_strategy: crate::extraction::docx::structure::RecommendedStrategy::Fuzzy,
        };
        assert!(FuzzyStrategy.can_handle(&structure));
        assert_eq!(FuzzyStrategy.confidence(&structure), 0.3);
    }
}
