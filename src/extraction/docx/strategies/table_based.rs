use crate::extraction::docx::structure::{DocxStructure, ParsedDocument, RecommendedStrategy};
use crate::extraction::docx::strategies::{apply_canonical_field, canonical_field_for_label, DocxStrategy};
use crate::types::ExtractedFields;

/// Reads a label/value table (or a two-row field/value table) by pairing
/// each header column with the corresponding cell in the first data row.
pub struct TableBasedStrategy;

impl DocxStrategy for TableBasedStrategy {
    fn name(&self) -> &'static str {
        "table_based"
    }

    fn can_handle(&self, structure: &DocxStructure) -> bool {
        structure.has_tables
    }

    fn confidence(&self, structure: &DocxStructure) -> f64 {
        if !self.can_handle(structure) {
            return 0.0;
        }
        if structure.recommended_strategy == RecommendedStrategy::TableBased {
            0.9
        } else {
            0.6
        }
    }

    fn extract(&self, doc: &ParsedDocument) -> ExtractedFields {
        let mut fields = ExtractedFields::default();
        for table in &doc.tables {
            let Some(header) = table.rows.first() else {
                continue;
            };
            for data_row in table.rows.iter().skip(1) {
                for (column_index, header_cell) in header.iter().enumerate() {
                    let Some(value_cell) = data_row.get(column_index) else {
                        continue;
                    };
                    if let Some(canonical) = canonical_field_for_label(header_cell) {
                        apply_canonical_field(&mut fields, canonical, value_cell.clone());
                    } else if !header_cell.trim().is_empty() && !value_cell.trim().is_empty() {
                        fields
                            .additional_fields
                            .entry(header_cell.trim().to_string())
                            .or_insert_with(|| value_cell.trim().to_string());
                    }
                }
            }
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::docx::structure::ParsedTable;

    #[test]
    fn maps_header_columns_to_canonical_fields() {
        let doc = ParsedDocument {
            paragraphs: vec![],
            tables: vec![ParsedTable {
                rows: vec![
                    vec!["Expediente".into(), "Causa".into(), "Notas".into()],
                    vec!["A/1".into(), "Fraude".into(), "sin observaciones".into()],
                ],
            }],
        };
        let fields = TableBasedStrategy.extract(&doc);
        assert_eq!(fields.case_id.as_deref(), Some("A/1"));
        assert_eq!(fields.cause.as_deref(), Some("Fraude"));
        assert_eq!(
            fields.additional_fields.get("Notas").map(String::as_str),
            Some("sin observaciones")
        );
    }

    #[test]
    fn confidence_is_zero_without_tables() {
        let structure = DocxStructure {
            has_tables: false,
            has_bold_labels: false,
            has_cross_references: false,
            has_structured_format: false,
            has_key_value_pairs: false,
            tables: vec![],
            recommended_strategy: RecommendedStrategy::Fuzzy,
        };
        assert_eq!(TableBasedStrategy.confidence(&structure), 0.0);
    }
}
