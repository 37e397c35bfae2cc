//! Fusion-stage value types (spec.md §3, §4.9).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::expediente::Expediente;
use super::source::SourceKind;

/// One source's candidate value for a single field, already carrying its
/// computed reliability and pattern/catalog flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldCandidate {
    pub source: SourceKind,
    pub value: Option<String>,
    pub reliability: f64,
    pub matches_pattern: bool,
    pub matches_catalog: bool,
    pub ocr_confidence: Option<f64>,
}

impl FieldCandidate {
    pub fn is_present(&self) -> bool {
        self.value.as_deref().is_some_and(|v| !v.is_empty())
    }
}

/// The outcome of fusing one field across sources (spec.md §3, §4.9.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FusionDecision {
    AllSourcesNull,
    AllAgree,
    FuzzyAgreement,
    WeightedVoting,
    BestEffort,
    Conflict,
}

/// Per-field fusion result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldFusionResult {
    pub field: String,
    pub selected_value: Option<String>,
    pub confidence: f64,
    pub decision: FusionDecision,
    pub contributing_sources: Vec<SourceKind>,
    pub winning_source: Option<SourceKind>,
    pub fuzzy_similarity: Option<f64>,
    pub requires_manual_review: bool,
    pub suggest_review: bool,
    pub conflicting_values: Vec<(SourceKind, String)>,
}

impl FieldFusionResult {
    /// Invariant from spec.md §8: for `AllAgree`/`FuzzyAgreement`,
    /// `winning_source` is null since every contributing source agrees.
    pub fn winning_source_is_well_formed(&self) -> bool {
        match self.decision {
            FusionDecision::AllAgree | FusionDecision::FuzzyAgreement => {
                self.winning_source.is_none()
            }
            _ => true,
        }
    }
}

/// A recorded disagreement surfaced alongside a fusion result, regardless
/// of whether the field resolved to `Conflict` (spec.md §4.8 also records
/// conflicts for merge-level "first non-null" disagreements).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldConflict {
    pub field: String,
    pub conflicting_values: Vec<(SourceKind, String)>,
    pub resolved_value: Option<String>,
    pub resolution_strategy: String,
}

/// Terminal decision of the whole pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NextAction {
    AutoProcess,
    ReviewRecommended,
    ManualReviewRequired,
}

/// Fusion engine output: owns the fused `Expediente` plus the full
/// per-field audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusionResult {
    pub expediente: Option<Expediente>,
    pub overall_confidence: f64,
    pub required_score: f64,
    pub optional_score: f64,
    pub conflicting_fields: Vec<String>,
    pub missing_required_fields: Vec<String>,
    pub next_action: NextAction,
    pub field_results: Vec<FieldFusionResult>,
    pub source_reliabilities: HashMap<SourceKind, f64>,
}
