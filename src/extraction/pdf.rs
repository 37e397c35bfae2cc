//! PDF extractor (spec.md §4.7 context, §6): a thin wrapper that hands the
//! PDF's bytes straight to the OCR Enhancement Loop. Only the first page is
//! covered (spec.md §6 — "PDF: opaque bytes passed to OCR, first page only
//! in the covered path"); true multi-page PDF rasterization is an external
//! collaborator concern (spec.md §1).

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::PipelineConfig;
use crate::error::{ExpedienteError, Result};
use crate::filter_selection::FilterStrategy;
use crate::ocr::enhancement_loop::{self, ComparisonMode};
use crate::ocr::OcrExecutor;
use crate::types::{ExtractedFields, ExtractionMetadata, OcrConfig};
use crate::validation::{CancellationToken, Validated};

static CASE_ID_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Z0-9/\-]{10,}").unwrap());

/// Runs OCR (via the enhancement loop) over `pdf_bytes`' first page and
/// extracts whatever fields a light regex pass over the resulting text can
/// find. Field extraction here is intentionally shallow — OCR text quality
/// makes structured extraction unreliable, so this module leans on the
/// fusion engine's multi-source reconciliation instead of trying to be
/// exhaustive on its own.
#[tracing::instrument(skip_all, fields(pdf_bytes = pdf_bytes.len()))]
pub async fn extract(
    pdf_bytes: &[u8],
    first_page_image_bytes: &[u8],
    ocr: &dyn OcrExecutor,
    ocr_config: &OcrConfig,
    strategy: &FilterStrategy<'_>,
    pipeline_config: &PipelineConfig,
    cancellation: &CancellationToken,
) -> Result<Validated<(ExtractedFields, ExtractionMetadata)>> {
    if pdf_bytes.is_empty() {
        return Err(ExpedienteError::InvalidInput("empty PDF input".into()));
    }

    let outcome = enhancement_loop::run(
        first_page_image_bytes,
        ocr,
        ocr_config,
        strategy,
        pipeline_config,
        ComparisonMode::Production,
        cancellation,
    )
    .await
    .map_err(|e| match e {
        ExpedienteError::Cancelled => ExpedienteError::Cancelled,
        other => ExpedienteError::extraction(crate::types::SourceKind::Pdf, other.to_string()),
    })?;

    let text = &outcome.value.text;
    let mut fields = ExtractedFields::default();

    let mut metadata = ExtractionMetadata::for_ocr_source(
        crate::types::SourceKind::Pdf,
        0.0,
        0.0,
        text.split_whitespace().count(),
        0,
        0.0,
    );

    if let Some(m) = CASE_ID_PATTERN.find(text) {
        fields.case_id = Some(m.as_str().to_string());
        metadata.record_field(true, false);
    }

    Ok(Validated::new((fields, metadata)).with_warnings(outcome.warnings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::StubDeterministicOcrExecutor;
    use crate::types::OcrResult;

    fn sample_png() -> Vec<u8> {
        use image::{ImageBuffer, RgbImage};
        let img: RgbImage = ImageBuffer::from_fn(12, 12, |_, _| image::Rgb([200, 200, 200]));
        let mut buf = std::io::Cursor::new(Vec::new());
        img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[tokio::test]
    async fn extracts_case_id_looking_token_from_ocr_text() {
        let ocr_result = OcrResult {
            text: "Numero de Expediente: A/AS1-2505-088637-PHM fin.".into(),
            mean_confidence: 0.9,
            median_confidence: 0.9,
            per_word_confidence: vec![0.9; 6],
            language_used: "spa".into(),
        };
        let executor = StubDeterministicOcrExecutor::new(ocr_result);
        let result = extract(
            b"%PDF-1.4 fake",
            &sample_png(),
            &executor,
            &OcrConfig::default(),
            &FilterStrategy::Analytical,
            &PipelineConfig::default(),
            &CancellationToken::new(),
        )
        .await
        .unwrap();
        assert_eq!(
            result.value.0.case_id.as_deref(),
            Some("A/AS1-2505-088637-PHM")
        );
    }

    #[tokio::test]
    async fn empty_pdf_bytes_is_invalid_input() {
        let ocr_result = OcrResult {
            text: String::new(),
            mean_confidence: 0.0,
            median_confidence: 0.0,
            per_word_confidence: vec![],
            language_used: "spa".into(),
        };
        let executor = StubDeterministicOcrExecutor::new(ocr_result);
        let result = extract(
            &[],
            &sample_png(),
            &executor,
            &OcrConfig::default(),
            &FilterStrategy::Analytical,
            &PipelineConfig::default(),
            &CancellationToken::new(),
        )
        .await;
        assert!(result.is_err());
    }
}
