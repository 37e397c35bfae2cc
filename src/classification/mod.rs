//! Requirement-Type Classifier and Article 4/17 validation (spec.md
//! §4.10): assigns a fused `Expediente` one of the five requirement types,
//! checks the legally-mandated fields for that type, and populates the
//! "five situations" semantic breakdown.

use crate::types::{
    ArticleValidationResult, AuthorityKind, Expediente, ExpedienteClassificationResult,
    RequirementType, SemanticAnalysis,
};

struct RubricSignals {
    freeze_with_amount: bool,
    transfer_with_amount: bool,
    references_prior_case: bool,
    has_document_list: bool,
    has_requesting_authority: bool,
}

fn evaluate_signals(e: &Expediente) -> RubricSignals {
    let monto_congelado_present = e
        .law_mandated_fields
        .as_ref()
        .is_some_and(|l| l.monto_congelado.is_some());
    let cuenta_bancaria_present = e
        .law_mandated_fields
        .as_ref()
        .is_some_and(|l| l.cuenta_bancaria.is_some());

    RubricSignals {
        freeze_with_amount: e.has_asset_freeze && monto_congelado_present,
        transfer_with_amount: cuenta_bancaria_present && monto_congelado_present,
        references_prior_case: e.references.iter().any(|r| r.is_some()),
        has_document_list: !e.solicitudes_especificas.is_empty(),
        has_requesting_authority: e.requesting_authority.is_some(),
    }
}

/// Cascading rubric (spec.md §4.10), checked in priority order: an
/// asset-freeze requirement always wins over a plain transfer, which wins
/// over a desbloqueo cross-reference, which wins over a bare document
/// request.
fn requirement_type_for(signals: &RubricSignals) -> RequirementType {
    if signals.freeze_with_amount {
        RequirementType::Aseguramiento
    } else if signals.transfer_with_amount {
        RequirementType::Transferencia
    } else if signals.references_prior_case {
        RequirementType::Desbloqueo
    } else if signals.has_document_list {
        RequirementType::Documentacion
    } else {
        RequirementType::Informacion
    }
}

/// Confidence is the share of the five rubric signals present, regardless
/// of which requirement type they ultimately selected — a case with strong
/// corroborating signal is trusted more even along the chosen branch.
fn classification_confidence(signals: &RubricSignals) -> f64 {
    let matched = [
        signals.freeze_with_amount,
        signals.transfer_with_amount,
        signals.references_prior_case,
        signals.has_document_list,
        signals.has_requesting_authority,
    ]
    .iter()
    .filter(|b| **b)
    .count();
    matched as f64 / 5.0
}

fn classify_authority_kind(e: &Expediente) -> AuthorityKind {
    let Some(authority) = e.requesting_authority.as_deref() else {
        return AuthorityKind::Unknown;
    };
    let lower = authority.to_lowercase();
    if lower.contains("judicial") || lower.contains("juez") || lower.contains("juzgado") {
        AuthorityKind::Judicial
    } else if lower.contains("hacendari") || lower.contains("shcp") || lower.contains("sat") {
        AuthorityKind::Hacendaria
    } else if lower.contains("administrativ") {
        AuthorityKind::Administrativa
    } else {
        AuthorityKind::Unknown
    }
}

fn field_present(e: &Expediente, field_name: &str) -> bool {
    match field_name {
        "case_id" => e.is_well_formed(),
        "requesting_authority" => e.requesting_authority.is_some(),
        "has_asset_freeze" => e.has_asset_freeze,
        "references" => e.references.iter().any(|r| r.is_some()),
        "cuenta_bancaria" => e
            .law_mandated_fields
            .as_ref()
            .is_some_and(|l| l.cuenta_bancaria.is_some()),
        "monto_congelado" => e
            .law_mandated_fields
            .as_ref()
            .is_some_and(|l| l.monto_congelado.is_some()),
        "solicitudes_especificas" => !e.solicitudes_especificas.is_empty(),
        _ => true,
    }
}

/// Article 4 (required fields for the assigned type) and Article 17
/// (hard rejection grounds) validation.
fn validate_articles(e: &Expediente, requirement_type: RequirementType) -> ArticleValidationResult {
    let missing_fields: Vec<String> = requirement_type
        .required_fields()
        .into_iter()
        .filter(|f| !field_present(e, f))
        .map(str::to_string)
        .collect();

    let mut rejection_reasons = Vec::new();
    if !e.is_well_formed() {
        rejection_reasons.push("missing case identifier (Article 17)".to_string());
    }
    if e.deadline_days == 0 && requirement_type != RequirementType::Informacion {
        rejection_reasons.push("no compliance deadline set for an actionable request (Article 17)".to_string());
    }

    ArticleValidationResult {
        missing_fields,
        rejection_reasons,
    }
}

fn semantic_analysis_for(signals: &RubricSignals, requirement_type: RequirementType) -> SemanticAnalysis {
    SemanticAnalysis {
        situacion_aseguramiento: signals.freeze_with_amount,
        situacion_desbloqueo: signals.references_prior_case,
        situacion_transferencia: signals.transfer_with_amount,
        situacion_documentacion: signals.has_document_list,
        situacion_informacion: requirement_type == RequirementType::Informacion,
    }
}

/// Classifies a fused `Expediente` end to end: requirement type, authority
/// kind, Article 4/17 validation, and the five-situations breakdown.
#[tracing::instrument(skip_all, fields(case_id = %e.case_id))]
pub fn classify(e: &Expediente) -> ExpedienteClassificationResult {
    let signals = evaluate_signals(e);
    let requirement_type = requirement_type_for(&signals);
    let article_validation = validate_articles(e, requirement_type);
    let semantic_analysis = semantic_analysis_for(&signals, requirement_type);
    tracing::debug!(requirement_type = ?requirement_type, "classification complete");

    ExpedienteClassificationResult {
        requirement_type,
        authority_kind: classify_authority_kind(e),
        required_fields: requirement_type
            .required_fields()
            .into_iter()
            .map(str::to_string)
            .collect(),
        article_validation,
        semantic_analysis,
        classification_confidence: classification_confidence(&signals),
    }
}
