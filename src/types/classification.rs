//! Classification & Article-validation value types (spec.md §4.10).

use serde::{Deserialize, Serialize};

use super::expediente::SemanticAnalysis;

/// The rubric outcome for a fused Expediente. Numeric codes mirror the
/// regulatory catalog referenced by spec.md §4.10.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u16)]
pub enum RequirementType {
    Aseguramiento = 100,
    Desbloqueo = 101,
    Transferencia = 102,
    Documentacion = 103,
    Informacion = 104,
}

impl RequirementType {
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// Article 4 required fields for this requirement type. Case id and
    /// requesting authority are required across every type; each type adds
    /// its own.
    pub fn required_fields(&self) -> Vec<&'static str> {
        let mut fields = vec!["case_id", "requesting_authority"];
        match self {
            RequirementType::Aseguramiento => fields.push("has_asset_freeze"),
            RequirementType::Desbloqueo => fields.push("references"),
            RequirementType::Transferencia => {
                fields.push("cuenta_bancaria");
                fields.push("monto_congelado");
            }
            RequirementType::Documentacion => fields.push("solicitudes_especificas"),
            RequirementType::Informacion => {}
        }
        fields
    }
}

/// Who issued the request the case is built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthorityKind {
    Judicial,
    Hacendaria,
    Administrativa,
    Unknown,
}

/// Article 17 rejection grounds plus the missing Article 4 fields.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ArticleValidationResult {
    pub missing_fields: Vec<String>,
    pub rejection_reasons: Vec<String>,
}

impl ArticleValidationResult {
    pub fn is_compliant(&self) -> bool {
        self.missing_fields.is_empty() && self.rejection_reasons.is_empty()
    }
}

/// Final classification output, joining the rubric decision with its
/// supporting legal validation and semantic breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpedienteClassificationResult {
    pub requirement_type: RequirementType,
    pub authority_kind: AuthorityKind,
    pub required_fields: Vec<String>,
    pub article_validation: ArticleValidationResult,
    pub semantic_analysis: SemanticAnalysis,
    pub classification_confidence: f64,
}
