use crate::extraction::docx::structure::{DocxStructure, ParsedDocument};
use crate::extraction::docx::strategies::{apply_canonical_field, canonical_field_for_label, DocxStrategy};
use crate::types::ExtractedFields;

/// Pairs a bold run (the label) with the non-bold runs that follow it in
/// the same paragraph (the value) — the common "**Causa:** Fraude fiscal"
/// layout. Falls back to scanning plain `Label: value` lines so paragraphs
/// without bold runs still contribute.
pub struct KeyValueStrategy;

impl DocxStrategy for KeyValueStrategy {
    fn name(&self) -> &'static str {
        "key_value"
    }

    fn can_handle(&self, structure: &DocxStructure) -> bool {
        structure.has_bold_labels || structure.has_key_value_pairs
    }

    fn confidence(&self, structure: &DocxStructure) -> f64 {
        if structure.has_bold_labels {
            0.8
        } else if structure.has_key_value_pairs {
            0.5
        } else {
            0.0
        }
    }

    fn extract(&self, doc: &ParsedDocument) -> ExtractedFields {
        let mut fields = ExtractedFields::default();

        for paragraph in &doc.paragraphs {
            let label: String = paragraph
                .runs
                .iter()
                .filter(|r| r.bold)
                .map(|r| r.text.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            let value: String = paragraph
                .runs
                .iter()
                .filter(|r| !r.bold)
                .map(|r| r.text.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            if !label.trim().is_empty() && !value.trim().is_empty() {
                if let Some(canonical) = canonical_field_for_label(&label) {
                    apply_canonical_field(&mut fields, canonical, value.trim().to_string());
                } else {
                    fields
                        .additional_fields
                        .entry(label.trim().trim_end_matches(':').to_string())
                        .or_insert_with(|| value.trim().to_string());
                }
            }
        }

        for line in doc.full_text().lines() {
            let Some((label, value)) = line.trim().split_once(':') else {
                continue;
            };
            if label.trim().is_empty() || value.trim().is_empty() || label.len() > 50 {
                continue;
            }
            if let Some(canonical) = canonical_field_for_label(label) {
                apply_canonical_field(&mut fields, canonical, value.trim().to_string());
            }
        }

        fields
    }
}
