//! DOCX Adaptive Orchestrator (spec.md §4.7): opens the `.docx` zip
//! container, analyzes its structure, and dispatches to one or several of
//! the five extraction strategies depending on the requested mode. Owns
//! its strategies one-way (`Vec<Box<dyn DocxStrategy>>`) rather than
//! through an inheritance hierarchy (spec.md §9).

pub mod merge;
pub mod strategies;
pub mod structure;

use crate::error::{ExpedienteError, Result};
use crate::extraction::docx::strategies::{standard_strategies, ComplementStrategy, DocxStrategy};
use crate::extraction::docx::structure::{analyze_structure, parse_docx, ParsedDocument};
use crate::types::{ExtractedFields, SourceKind};
use crate::validation::{CancellationToken, Validated};

/// How the orchestrator combines strategy output (spec.md §4.7).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocxMode {
    /// Run only the single highest-confidence strategy.
    BestStrategy,
    /// Run every qualifying strategy concurrently and merge their results
    /// (spec.md §4.8).
    MergeAll,
    /// Fill gaps in an already-fused field set from the DOCX text. With no
    /// existing field set to complement, this degrades to `BestStrategy`.
    Complement(Option<ExtractedFields>),
}

/// Parses the DOCX, analyzes its structure, and extracts fields per the
/// requested mode. Checks `cancellation` at the two suspension points named
/// in spec.md §5: between structure analysis and strategy invocation, and
/// between per-strategy completions when merging.
#[tracing::instrument(skip_all, fields(docx_bytes = bytes.len()))]
pub async fn extract(
    bytes: &[u8],
    mode: DocxMode,
    cancellation: &CancellationToken,
) -> Result<Validated<ExtractedFields>> {
    if cancellation.is_cancelled() {
        return Err(ExpedienteError::Cancelled);
    }
    if bytes.is_empty() {
        return Err(ExpedienteError::InvalidInput("empty DOCX input".into()));
    }

    let doc = parse_docx(bytes)
        .map_err(|e| ExpedienteError::extraction(SourceKind::Docx, e.to_string()))?;
    let structure = analyze_structure(&doc);

    if cancellation.is_cancelled() {
        return Err(ExpedienteError::Cancelled);
    }

    match mode {
        DocxMode::BestStrategy => Ok(Validated::new(run_best_strategy(&doc, &structure))),
        DocxMode::Complement(Some(existing)) => {
            let strategy = ComplementStrategy::new(existing);
            Ok(Validated::new(strategy.extract(&doc)))
        }
        DocxMode::Complement(None) => Ok(Validated::new(run_best_strategy(&doc, &structure))),
        DocxMode::MergeAll => run_merge_all(doc, cancellation).await,
    }
}

fn run_best_strategy(
    doc: &ParsedDocument,
    structure: &structure::DocxStructure,
) -> ExtractedFields {
    standard_strategies()
        .into_iter()
        .filter(|s| s.can_handle(structure))
        .max_by(|a, b| {
            a.confidence(structure)
                .partial_cmp(&b.confidence(structure))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|s| s.extract(doc))
        .unwrap_or_default()
}

/// Runs every qualifying standard strategy concurrently and merges the
/// results (spec.md §4.8). The strategy set is small and fixed, so this
/// fans out with one `tokio::join!` rather than a dynamically sized task
/// set (spec.md §9).
async fn run_merge_all(
    doc: ParsedDocument,
    cancellation: &CancellationToken,
) -> Result<Validated<ExtractedFields>> {
    let structure = analyze_structure(&doc);
    let doc_table = doc.clone();
    let doc_key_value = doc.clone();
    let doc_search = doc.clone();
    let doc_fuzzy = doc.clone();
    let structure_table = structure.clone();
    let structure_key_value = structure.clone();
    let structure_search = structure.clone();
    let structure_fuzzy = structure.clone();

    let (table_result, key_value_result, search_result, fuzzy_result) = tokio::join!(
        run_one_strategy(strategies::TableBasedStrategy, doc_table, structure_table),
        run_one_strategy(strategies::KeyValueStrategy, doc_key_value, structure_key_value),
        run_one_strategy(strategies::SearchStrategy, doc_search, structure_search),
        run_one_strategy(strategies::FuzzyStrategy, doc_fuzzy, structure_fuzzy),
    );

    if cancellation.is_cancelled() {
        return Err(ExpedienteError::Cancelled);
    }

    let contributions: Vec<(String, ExtractedFields)> = [
        table_result,
        key_value_result,
        search_result,
        fuzzy_result,
    ]
    .into_iter()
    .flatten()
    .collect();

    let (merged, conflicts) = merge::merge_all(contributions);
    let mut result = Validated::new(merged);
    for conflict in conflicts {
        result = result.with_warning(format!(
            "DOCX strategy conflict on {}: resolved via {}",
            conflict.field, conflict.resolution_strategy
        ));
    }
    Ok(result)
}

async fn run_one_strategy(
    strategy: impl DocxStrategy + 'static,
    doc: ParsedDocument,
    structure: structure::DocxStructure,
) -> Option<(String, ExtractedFields)> {
    if !strategy.can_handle(&structure) {
        return None;
    }
    let name = strategy.name().to_string();
    Some((name, strategy.extract(&doc)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_docx_zip() -> Vec<u8> {
        use std::io::Write;
        let mut buf = std::io::Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut buf);
            let options = zip::write::SimpleFileOptions::default();
            writer.start_file("word/document.xml", options).unwrap();
            writer
                .write_all(
                    br#"<?xml version="1.0"?><w:document xmlns:w="ns"><w:body>
                        <w:p><w:r><w:t>Expediente A/AS1-2505-088637-PHM</w:t></w:r></w:p>
                    </w:body></w:document>"#,
                )
                .unwrap();
            writer.finish().unwrap();
        }
        buf.into_inner()
    }

    #[tokio::test]
    async fn best_strategy_extracts_case_id_via_fuzzy_fallback() {
        let bytes = empty_docx_zip();
        let result = extract(&bytes, DocxMode::BestStrategy, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(
            result.value.case_id.as_deref(),
            Some("A/AS1-2505-088637-PHM")
        );
    }

    #[tokio::test]
    async fn complement_mode_without_existing_degrades_to_best_strategy() {
        let bytes = empty_docx_zip();
        let result = extract(
            &bytes,
            DocxMode::Complement(None),
            &CancellationToken::new(),
        )
        .await
        .unwrap();
        assert!(result.value.case_id.is_some());
    }

    #[tokio::test]
    async fn complement_mode_never_overwrites_existing_case_id() {
        let bytes = empty_docx_zip();
        let existing = ExtractedFields {
            case_id: Some("A/EXISTING".into()),
            ..Default::default()
        };
        let result = extract(
            &bytes,
            DocxMode::Complement(Some(existing)),
            &CancellationToken::new(),
        )
        .await
        .unwrap();
        assert_eq!(result.value.case_id.as_deref(), Some("A/EXISTING"));
    }

    #[tokio::test]
    async fn merge_all_combines_multiple_strategies() {
        let bytes = empty_docx_zip();
        let result = extract(&bytes, DocxMode::MergeAll, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(
            result.value.case_id.as_deref(),
            Some("A/AS1-2505-088637-PHM")
        );
    }

    #[tokio::test]
    async fn empty_bytes_is_invalid_input() {
        let result = extract(&[], DocxMode::BestStrategy, &CancellationToken::new()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn cancellation_is_observed_before_parsing() {
        let bytes = empty_docx_zip();
        let token = CancellationToken::new();
        token.cancel();
        let result = extract(&bytes, DocxMode::BestStrategy, &token).await;
        assert!(result.is_err());
    }
}
