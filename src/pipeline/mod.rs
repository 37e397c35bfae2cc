//! Top-level pipeline orchestrator (spec.md §5, §7): fans the three
//! sources out concurrently in fixed `Xml < Pdf < Docx` slot order
//! regardless of completion order, downgrades any single-source failure to
//! a null candidate instead of aborting, then runs fusion and
//! classification over whatever came back.

use crate::classification;
use crate::config::{FusionCoefficients, PipelineConfig};
use crate::error::{ExpedienteError, Result};
use crate::extraction::docx::{self, DocxMode};
use crate::extraction::{pdf, xml};
use crate::filter_selection::FilterStrategy;
use crate::fusion::{self, SourceInput};
use crate::ocr::OcrExecutor;
use crate::types::{Expediente, ExtractedFields, OcrConfig, SourceKind};
use crate::validation::{CancellationToken, PipelineOutcome};

/// Raw bytes for whichever sources are available for this run. A source
/// with no bytes supplied is treated identically to one whose extraction
/// failed: a null candidate, not an error (spec.md §7).
#[derive(Debug, Clone, Default)]
pub struct PipelineInputs {
    pub xml_bytes: Option<Vec<u8>>,
    pub pdf_bytes: Option<Vec<u8>>,
    pub pdf_first_page_image: Option<Vec<u8>>,
    pub docx_bytes: Option<Vec<u8>>,
}

impl PipelineInputs {
    pub fn is_empty(&self) -> bool {
        self.xml_bytes.is_none() && self.pdf_bytes.is_none() && self.docx_bytes.is_none()
    }
}

/// Collaborators a pipeline run needs but that aren't part of the
/// document-specific input (spec.md §1: OCR engine is an external
/// collaborator).
pub struct PipelineDependencies<'a> {
    pub ocr: &'a dyn OcrExecutor,
    pub ocr_config: &'a OcrConfig,
    pub filter_strategy: FilterStrategy<'a>,
    pub pipeline_config: &'a PipelineConfig,
    pub fusion_coefficients: &'a FusionCoefficients,
}

/// Runs the full pipeline once: concurrent extraction, fusion,
/// classification. Returns `PipelineOutcome::Cancelled` the instant any
/// suspension point observes the token set, and
/// `PipelineOutcome::FatalInvalidInput` when no source bytes were supplied
/// at all.
#[tracing::instrument(skip_all, fields(
    has_xml = inputs.xml_bytes.is_some(),
    has_pdf = inputs.pdf_bytes.is_some(),
    has_docx = inputs.docx_bytes.is_some(),
))]
pub async fn run(
    inputs: PipelineInputs,
    deps: PipelineDependencies<'_>,
    cancellation: &CancellationToken,
) -> PipelineOutcome {
    if cancellation.is_cancelled() {
        return PipelineOutcome::Cancelled;
    }
    if inputs.is_empty() {
        return PipelineOutcome::FatalInvalidInput("no source documents supplied".to_string());
    }

    let xml_future = run_xml_source(inputs.xml_bytes.as_deref());
    let pdf_future = run_pdf_source(
        inputs.pdf_bytes.as_deref(),
        inputs.pdf_first_page_image.as_deref(),
        &deps,
        cancellation,
    );
    let docx_future = run_docx_source(inputs.docx_bytes.as_deref(), cancellation);

    let (xml_result, pdf_result, docx_result) = tokio::join!(xml_future, pdf_future, docx_future);

    if cancellation.is_cancelled() {
        return PipelineOutcome::Cancelled;
    }

    if matches!(xml_result, Err(ExpedienteError::Cancelled))
        || matches!(pdf_result, Err(ExpedienteError::Cancelled))
        || matches!(docx_result, Err(ExpedienteError::Cancelled))
    {
        return PipelineOutcome::Cancelled;
    }

    let mut warnings = Vec::new();
    let (xml_source, xml_expediente) = match xml_result {
        Ok(pair) => pair,
        Err(e) => {
            tracing::warn!(source = "xml", error = %e, "source extraction downgraded to null");
            warnings.push(format!("xml extraction downgraded to null: {e}"));
            (SourceInput::failed(SourceKind::Xml), None)
        }
    };
    let pdf_source = match pdf_result {
        Ok(source) => source,
        Err(e) => {
            tracing::warn!(source = "pdf", error = %e, "source extraction downgraded to null");
            warnings.push(format!("pdf extraction downgraded to null: {e}"));
            SourceInput::failed(SourceKind::Pdf)
        }
    };
    let docx_source = match docx_result {
        Ok(source) => source,
        Err(e) => {
            tracing::warn!(source = "docx", error = %e, "source extraction downgraded to null");
            warnings.push(format!("docx extraction downgraded to null: {e}"));
            SourceInput::failed(SourceKind::Docx)
        }
    };

    let source_inputs = vec![xml_source, pdf_source, docx_source];
    let mut fusion_result = fusion::fuse(&source_inputs, xml_expediente, deps.fusion_coefficients);

    if let Some(mut expediente) = fusion_result.expediente.take() {
        let classification = classification::classify(&expediente);
        expediente.semantic_analysis = Some(classification.semantic_analysis);
        fusion_result.expediente = Some(expediente);
    }

    PipelineOutcome::Completed(fusion_result, warnings)
}

async fn run_xml_source(
    bytes: Option<&[u8]>,
) -> Result<(SourceInput, Option<Expediente>)> {
    let Some(bytes) = bytes else {
        return Ok((SourceInput::failed(SourceKind::Xml), None));
    };
    match xml::parse(bytes) {
        Ok(validated) => {
            let (expediente, metadata) = validated.value;
            let fields = ExtractedFields {
                case_id: Some(expediente.case_id.clone()).filter(|s| !s.is_empty()),
                ..Default::default()
            };
            Ok((
                SourceInput {
                    source: SourceKind::Xml,
                    fields: Some(fields),
                    metadata: Some(metadata),
                },
                Some(expediente),
            ))
        }
        Err(ExpedienteError::InvalidInput(message)) => {
            Err(ExpedienteError::extraction(SourceKind::Xml, message))
        }
        Err(other) => Err(other),
    }
}

async fn run_pdf_source(
    bytes: Option<&[u8]>,
    image_bytes: Option<&[u8]>,
    deps: &PipelineDependencies<'_>,
    cancellation: &CancellationToken,
) -> Result<SourceInput> {
    let (Some(bytes), Some(image_bytes)) = (bytes, image_bytes) else {
        return Ok(SourceInput::failed(SourceKind::Pdf));
    };
    let result = pdf::extract(
        bytes,
        image_bytes,
        deps.ocr,
        deps.ocr_config,
        &deps.filter_strategy,
        deps.pipeline_config,
        cancellation,
    )
    .await;
    match result {
        Ok(validated) => {
            let (fields, metadata) = validated.value;
            Ok(SourceInput {
                source: SourceKind::Pdf,
                fields: Some(fields),
                metadata: Some(metadata),
            })
        }
        Err(other) => Err(other),
    }
}

async fn run_docx_source(
    bytes: Option<&[u8]>,
    cancellation: &CancellationToken,
) -> Result<SourceInput> {
    let Some(bytes) = bytes else {
        return Ok(SourceInput::failed(SourceKind::Docx));
    };
    let result = docx::extract(bytes, DocxMode::MergeAll, cancellation).await;
    match result {
        Ok(validated) => Ok(SourceInput {
            source: SourceKind::Docx,
            fields: Some(validated.value),
            metadata: Some(crate::types::ExtractionMetadata::for_ocr_source(
                SourceKind::Docx,
                1.0,
                1.0,
                0,
                0,
                1.0,
            )),
        }),
        Err(other) => Err(other),
    }
}
