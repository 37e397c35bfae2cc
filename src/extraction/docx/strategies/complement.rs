use crate::extraction::docx::merge;
use crate::extraction::docx::strategies::{standard_strategies, DocxStrategy};
use crate::extraction::docx::structure::{DocxStructure, ParsedDocument};
use crate::types::ExtractedFields;

/// Fills gaps in an already-fused field set from the DOCX text, never
/// overwriting a field that is already present. Confidence is constant
/// because the strategy is purely additive — it can only help, never
/// introduce a conflict (spec.md §4.7).
pub struct ComplementStrategy {
    existing: ExtractedFields,
}

impl ComplementStrategy {
    pub fn new(existing: ExtractedFields) -> Self {
        Self { existing }
    }
}

impl DocxStrategy for ComplementStrategy {
    fn name(&self) -> &'static str {
        "complement"
    }

    fn can_handle(&self, _structure: &DocxStructure) -> bool {
        true
    }

    fn confidence(&self, _structure: &DocxStructure) -> f64 {
        0.95
    }

    fn extract(&self, doc: &ParsedDocument) -> ExtractedFields {
        let best = best_effort_extraction(doc);
        merge::complement(&self.existing, &best)
    }
}

/// Runs the highest-confidence of the standard strategies over `doc` to
/// produce the candidate field set that gets complemented in.
fn best_effort_extraction(doc: &ParsedDocument) -> ExtractedFields {
    let structure = crate::extraction::docx::structure::analyze_structure(doc);
    standard_strategies()
        .into_iter()
        .filter(|s| s.can_handle(&structure))
        .max_by(|a, b| {
            a.confidence(&structure)
                .partial_cmp(&b.confidence(&structure))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|s| s.extract(doc))
        .unwrap_or_default()
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
    fn fills_missing_field_without_overwriting_existing() {
        let existing = ExtractedFields {
            case_id: Some("A/EXISTING".into()),
            ..Default::default()
        };
        let doc = text_doc("RFC XAXX010101000 de la parte solicitante.");
        let strategy = ComplementStrategy::new(existing);
        let fields = strategy.extract(&doc);
        assert_eq!(fields.case_id.as_deref(), Some("A/EXISTING"));
    }

    #[test]
    fn confidence_is_constant_regardless_of_structure() {
        let strategy = ComplementStrategy::new(ExtractedFields::default());
        let structure = crate::extraction::docx::structure::analyze_structure(&ParsedDocument::default());
        assert_eq!(strategy.confidence(&structure), 0.95);
        assert!(strategy.can_handle(&structure));
    }
}
