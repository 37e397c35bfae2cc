//! Overall confidence and next-action decision (spec.md §4.9.3).
//!
//! `overall_confidence = required_fields_weight * required_score
//!                      + optional_fields_weight * optional_score`
//!
//! where each score is the mean fusion confidence over that field group
//! (missing required fields count as zero confidence, not as excluded).

use crate::config::FusionCoefficients;
use crate::types::{FieldFusionResult, FusionDecision, NextAction};

pub struct AggregateOutcome {
    pub overall_confidence: f64,
    pub required_score: f64,
    pub optional_score: f64,
    pub next_action: NextAction,
    pub missing_required_fields: Vec<String>,
    pub conflicting_fields: Vec<String>,
}

/// Aggregates per-field results into the pipeline's terminal decision.
/// `required_fields` names which of `field_results` count toward
/// `required_score`; every other present field counts toward
/// `optional_score`.
pub fn aggregate(
    field_results: &[FieldFusionResult],
    required_fields: &[String],
    coefficients: &FusionCoefficients,
) -> AggregateOutcome {
    let mut required_confidences = Vec::new();
    let mut optional_confidences = Vec::new();
    let mut missing_required_fields = Vec::new();
    let mut conflicting_fields = Vec::new();
    let mut any_requires_manual_review = false;

    for field in required_fields {
        match field_results.iter().find(|r| &r.field == field) {
            Some(result) if result.decision != FusionDecision::AllSourcesNull => {
                required_confidences.push(result.confidence);
            }
            _ => {
                required_confidences.push(0.0);
                missing_required_fields.push(field.clone());
            }
        }
    }

    for result in field_results {
        if !required_fields.contains(&result.field) {
            if result.decision == FusionDecision::AllSourcesNull {
                continue;
            }
            optional_confidences.push(result.confidence);
        }
        if result.decision == FusionDecision::Conflict {
            conflicting_fields.push(result.field.clone());
        }
        if result.requires_manual_review {
            any_requires_manual_review = true;
        }
    }

    let required_score = mean(&required_confidences);
    // No optional fields present is neutral, not a penalty: fall back to
    // 1.0 rather than 0.0 so the overall score isn't dragged down by the
    // mere absence of optional data.
    let optional_score = if optional_confidences.is_empty() {
        1.0
    } else {
        mean(&optional_confidences)
    };
    let overall_confidence =
        coefficients.required_fields_weight * required_score + coefficients.optional_fields_weight * optional_score;

    let next_action = if any_requires_manual_review || overall_confidence < coefficients.manual_review_threshold {
        NextAction::ManualReviewRequired
    } else if overall_confidence >= coefficients.auto_process_threshold {
        NextAction::AutoProcess
    } else {
        NextAction::ReviewRecommended
    };

    AggregateOutcome {
        overall_confidence,
        required_score,
        optional_score,
        next_action,
        missing_required_fields,
        conflicting_fields,
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SourceKind;

    fn field(name: &str, confidence: f64, decision: FusionDecision, requires_manual_review: bool) -> FieldFusionResult {
        FieldFusionResult {
            field: name.to_string(),
            selected_value: Some("x".into()),
            confidence,
            decision,
            contributing_sources: vec![SourceKind::Xml],
            winning_source: None,
            fuzzy_similarity: None,
            requires_manual_review,
            suggest_review: false,
            conflicting_values: vec![],
        }
    }

    #[test]
    fn high_confidence_required_fields_auto_process() {
        let coefficients = FusionCoefficients::default();
        let results = vec![
            field("case_id", 0.95, FusionDecision::AllAgree, false),
            field("cause", 0.90, FusionDecision::AllAgree, false),
        ];
        let outcome = aggregate(&results, &["case_id".to_string(), "cause".to_string()], &coefficients);
        assert_eq!(outcome.next_action, NextAction::AutoProcess);
        assert!(outcome.missing_required_fields.is_empty());
    }

    #[test]
    fn missing_required_field_counts_as_zero_confidence() {
        let coefficients = FusionCoefficients::default();
        let results = vec![field("cause", 0.9, FusionDecision::AllAgree, false)];
        let outcome = aggregate(&results, &["case_id".to_string()], &coefficients);
        assert_eq!(outcome.missing_required_fields, vec!["case_id".to_string()]);
        assert_eq!(outcome.required_score, 0.0);
    }

    #[test]
    fn any_manual_review_field_forces_manual_review_required() {
        let coefficients = FusionCoefficients::default();
        let results = vec![field("case_id", 0.95, FusionDecision::Conflict, true)];
        let outcome = aggregate(&results, &["case_id".to_string()], &coefficients);
        assert_eq!(outcome.next_action, NextAction::ManualReviewRequired);
        assert_eq!(outcome.conflicting_fields, vec!["case_id".to_string()]);
    }

    #[test]
    fn moderate_confidence_is_review_recommended() {
        let coefficients = FusionCoefficients::default();
        let results = vec![field("case_id", 0.78, FusionDecision::WeightedVoting, false)];
        let outcome = aggregate(&results, &["case_id".to_string()], &coefficients);
        assert_eq!(outcome.next_action, NextAction::ReviewRecommended);
    }
}
