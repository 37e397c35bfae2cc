//! End-to-end scenarios straight off the six worked examples: one test per
//! scenario, each driving the real public API rather than re-deriving the
//! arithmetic a unit test already covers.

#![cfg(all(
    feature = "tokio-runtime",
    feature = "xml",
    feature = "image-quality",
    feature = "office"
))]

use expediente_core::classification;
use expediente_core::extraction::docx::{self, DocxMode};
use expediente_core::fusion::{self, SourceInput};
use expediente_core::types::{Expediente, ExtractedFields, ExtractionMetadata, SourceKind};
use expediente_core::{CancellationToken, FusionCoefficients};

fn xml_input(fields: ExtractedFields) -> SourceInput {
    SourceInput {
        source: SourceKind::Xml,
        fields: Some(fields),
        metadata: Some(ExtractionMetadata::for_xml()),
    }
}

fn xml_input_catalog_validated(fields: ExtractedFields) -> SourceInput {
    let mut metadata = ExtractionMetadata::for_xml();
    metadata.record_field(true, true);
    SourceInput {
        source: SourceKind::Xml,
        fields: Some(fields),
        metadata: Some(metadata),
    }
}

fn pdf_input(fields: ExtractedFields, mean_confidence: f64, catalog_validated: bool) -> SourceInput {
    let mut metadata = ExtractionMetadata::for_ocr_source(SourceKind::Pdf, mean_confidence, 0.1, 80, 2, 0.9);
    metadata.record_field(true, catalog_validated);
    SourceInput {
        source: SourceKind::Pdf,
        fields: Some(fields),
        metadata: Some(metadata),
    }
}

fn scalar(case_id: &str) -> ExtractedFields {
    ExtractedFields {
        case_id: Some(case_id.to_string()),
        ..Default::default()
    }
}

/// Scenario 1: XML and PDF agree on the case id letter-for-letter — the
/// fused `Expediente` should carry it straight through with no manual
/// review flagged.
#[test]
fn scenario_all_agree_auto_processes_the_case_id() {
    let coefficients = FusionCoefficients::default();
    let inputs = vec![
        xml_input(scalar("A/AS1-2505-088637-PHM")),
        pdf_input(scalar("A/AS1-2505-088637-PHM"), 0.95, true),
    ];
    let result = fusion::fuse(&inputs, Some(Expediente::default()), &coefficients);
    assert_eq!(
        result.expediente.unwrap().case_id,
        "A/AS1-2505-088637-PHM"
    );
    assert!(result.missing_required_fields.is_empty());
}

/// Scenario 2: the PDF's OCR pass mistakes a zero for the letter O. The
/// fusion engine should still rescue the XML's value via fuzzy agreement
/// rather than treating it as a hard conflict.
#[test]
fn scenario_ocr_typo_is_rescued_by_fuzzy_agreement() {
    let coefficients = FusionCoefficients::default();
    // The XML source is catalog-validated and kept at a merely mediocre OCR
    // confidence for the PDF side, so XML ends up the higher-reliability
    // anchor and its clean value is the one fuzzy agreement selects.
    let inputs = vec![
        xml_input_catalog_validated(scalar("AGAFADAFSON2/2025/000084")),
        pdf_input(scalar("AGAFADAFSON2/2025/O00084"), 0.55, false),
    ];
    let result = fusion::fuse(&inputs, Some(Expediente::default()), &coefficients);
    let case_id_result = result
        .field_results
        .iter()
        .find(|r| r.field == "case_id")
        .unwrap();
    assert_eq!(
        case_id_result.decision,
        expediente_core::types::FusionDecision::FuzzyAgreement
    );
    assert_eq!(
        result.expediente.unwrap().case_id,
        "AGAFADAFSON2/2025/000084"
    );
}

/// Scenario 3: two sources disagree on a field, both pattern- and
/// catalog-validated, with next to nothing separating their vote weight.
/// This must resolve as a hard conflict forcing manual review, not a
/// silent majority pick.
#[test]
fn scenario_hard_conflict_forces_manual_review() {
    let coefficients = FusionCoefficients::default();
    let xml_fields = ExtractedFields {
        cause: Some("Aseguramiento".to_string()),
        ..Default::default()
    };
    let pdf_fields = ExtractedFields {
        cause: Some("Judicial".to_string()),
        ..Default::default()
    };
    // mean_confidence is tuned so the PDF source's computed reliability
    // lands within a hair of the XML source's (~0.60 each) — the two
    // candidates' vote weights must be within `voting_margin` of each
    // other for this to resolve as a `Conflict` rather than a clean vote.
    let mut pdf_metadata = ExtractionMetadata::for_ocr_source(SourceKind::Pdf, 0.606, 0.1, 80, 0, 0.9);
    pdf_metadata.record_field(true, true);
    let inputs = vec![
        xml_input_catalog_validated(ExtractedFields {
            case_id: Some("A/1".to_string()),
            ..xml_fields
        }),
        SourceInput {
            source: SourceKind::Pdf,
            fields: Some(ExtractedFields {
                case_id: Some("A/1".to_string()),
                ..pdf_fields
            }),
            metadata: Some(pdf_metadata),
        },
    ];
    let result = fusion::fuse(&inputs, Some(Expediente::default()), &coefficients);
    assert!(result.conflicting_fields.contains(&"cause".to_string()));
    assert_eq!(
        result.next_action,
        expediente_core::types::NextAction::ManualReviewRequired
    );
}

/// Scenario 6: the DOCX has an existing, already-fused case id plus a
/// table-free "RFC: value" bold label the earlier sources never saw.
/// Complement mode must gap-fill the RFC into `additional_fields` without
/// touching (let alone duplicating) the case id that already came from
/// upstream fusion.
#[tokio::test]
async fn scenario_docx_complement_adds_rfc_without_duplicating_case_id() {
    use std::io::Write;

    let mut buf = std::io::Cursor::new(Vec::new());
    {
        let mut writer = zip::ZipWriter::new(&mut buf);
        let options = zip::write::SimpleFileOptions::default();
        writer.start_file("word/document.xml", options).unwrap();
        writer
            .write_all(
                br#"<?xml version="1.0"?><w:document xmlns:w="ns"><w:body>
                    <w:p>
                        <w:r><w:b/><w:t>RFC:</w:t></w:r>
                        <w:r><w:t>XAXX010101000</w:t></w:r>
                    </w:p>
                </w:body></w:document>"#,
            )
            .unwrap();
        writer.finish().unwrap();
    }
    let docx_bytes = buf.into_inner();

    let existing = ExtractedFields {
        case_id: Some("A/AS1-2505-088637-PHM".to_string()),
        ..Default::default()
    };

    let result = docx::extract(
        &docx_bytes,
        DocxMode::Complement(Some(existing)),
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(
        result.value.case_id.as_deref(),
        Some("A/AS1-2505-088637-PHM")
    );
    assert_eq!(
        result.value.additional_fields.get("RFC").map(String::as_str),
        Some("XAXX010101000")
    );
}

/// Classification rides on top of fusion: once sources agree on an
/// asset-freeze amount, the requirement type should come out as
/// Aseguramiento with the semantic breakdown flag set.
#[test]
fn scenario_classification_follows_fused_expediente() {
    let mut expediente = Expediente {
        case_id: "A/AS1-2505-088637-PHM".to_string(),
        deadline_days: 5,
        has_asset_freeze: true,
        requesting_authority: Some("Autoridad Judicial Federal".to_string()),
        ..Default::default()
    };
    expediente.law_mandated_fields = Some(expediente_core::types::LawMandatedFields {
        monto_congelado: Some("$10,000.00".to_string()),
        ..Default::default()
    });

    let classification = classification::classify(&expediente);
    assert_eq!(
        classification.requirement_type,
        expediente_core::types::RequirementType::Aseguramiento
    );
    assert!(classification.semantic_analysis.situacion_aseguramiento);
}
