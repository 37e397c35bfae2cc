//! Per-field fusion decision (spec.md §4.9.2): six ordered checks, the
//! first that applies wins.
//!
//! 1. `AllSourcesNull` — nothing to fuse.
//! 2. `AllAgree` — every present candidate normalizes to the same value.
//! 3. `FuzzyAgreement` — candidates disagree literally but are within
//!    `fuzzy_match_threshold` edit similarity of each other.
//! 4. `WeightedVoting` — reliability-weighted vote among distinct values.
//! 5. `Conflict` — the top two vote groups are within `voting_margin` of
//!    each other and both are pattern/catalog-validated.
//! 6. `BestEffort` — the voting winner's confidence falls below
//!    `manual_review_threshold`.

use crate::config::FusionCoefficients;
use crate::types::{FieldCandidate, FieldFusionResult, FusionDecision, SourceKind};

fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

fn similarity(a: &str, b: &str) -> f64 {
    let distance = strsim::damerau_levenshtein(a, b) as f64;
    let longest = a.chars().count().max(b.chars().count()).max(1) as f64;
    1.0 - (distance / longest)
}

fn candidate_weight(candidate: &FieldCandidate, coefficients: &FusionCoefficients) -> f64 {
    let mut weight = candidate.reliability;
    if candidate.matches_pattern {
        weight *= coefficients.pattern_match_boost;
    }
    if candidate.matches_catalog {
        weight *= coefficients.catalog_validation_boost;
    }
    weight
}

/// Fuses one field's per-source candidates into a single decision.
/// `candidates` should be supplied in `SourceKind::ORDERED` order so ties
/// resolve deterministically.
pub fn fuse_field(field_name: &str, candidates: &[FieldCandidate], coefficients: &FusionCoefficients) -> FieldFusionResult {
    let present: Vec<&FieldCandidate> = candidates.iter().filter(|c| c.is_present()).collect();
    let contributing_sources: Vec<SourceKind> = candidates.iter().map(|c| c.source).collect();

    if present.is_empty() {
        return FieldFusionResult {
            field: field_name.to_string(),
            selected_value: None,
            confidence: 0.0,
            decision: FusionDecision::AllSourcesNull,
            contributing_sources,
            winning_source: None,
            fuzzy_similarity: None,
            requires_manual_review: false,
            suggest_review: false,
            conflicting_values: vec![],
        };
    }

    let normalized_values: Vec<String> = present.iter().map(|c| normalize(c.value.as_deref().unwrap_or(""))).collect();
    let all_agree = normalized_values.windows(2).all(|w| w[0] == w[1]);
    if all_agree {
        let best = present
            .iter()
            .max_by(|a, b| a.reliability.partial_cmp(&b.reliability).unwrap())
            .unwrap();
        return FieldFusionResult {
            field: field_name.to_string(),
            selected_value: best.value.clone(),
            confidence: present.iter().map(|c| c.reliability).sum::<f64>() / present.len() as f64,
            decision: FusionDecision::AllAgree,
            contributing_sources,
            winning_source: None,
            fuzzy_similarity: None,
            requires_manual_review: false,
            suggest_review: false,
            conflicting_values: vec![],
        };
    }

    // Fuzzy agreement: every present candidate is within threshold
    // similarity of the value from the most reliable source.
    let anchor_index = present
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.reliability.partial_cmp(&b.reliability).unwrap())
        .map(|(i, _)| i)
        .unwrap();
    let anchor_value = present[anchor_index].value.as_deref().unwrap_or("");
    let similarities: Vec<f64> = present
        .iter()
        .map(|c| similarity(anchor_value, c.value.as_deref().unwrap_or("")))
        .collect();
    let min_similarity = similarities.iter().cloned().fold(f64::INFINITY, f64::min);
    if present.len() > 1 && min_similarity >= coefficients.fuzzy_match_threshold {
        return FieldFusionResult {
            field: field_name.to_string(),
            selected_value: present[anchor_index].value.clone(),
            confidence: min_similarity * coefficients.fuzzy_match_confidence_penalty,
            decision: FusionDecision::FuzzyAgreement,
            contributing_sources,
            winning_source: None,
            fuzzy_similarity: Some(min_similarity),
            requires_manual_review: false,
            suggest_review: false,
            conflicting_values: vec![],
        };
    }

    // Weighted voting: group by normalized value, sum candidate weights.
    let mut groups: Vec<(String, Vec<&FieldCandidate>)> = Vec::new();
    for (candidate, normalized) in present.iter().zip(normalized_values.iter()) {
        match groups.iter_mut().find(|(value, _)| value == normalized) {
            Some((_, members)) => members.push(candidate),
            None => groups.push((normalized.clone(), vec![candidate])),
        }
    }
    let mut group_weights: Vec<(usize, f64)> = groups
        .iter()
        .enumerate()
        .map(|(i, (_, members))| {
            (i, members.iter().map(|c| candidate_weight(c, coefficients)).sum::<f64>())
        })
        .collect();
    group_weights.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap());

    let total_weight: f64 = group_weights.iter().map(|(_, w)| w).sum();
    let (winning_group_index, winning_weight) = group_weights[0];
    let confidence = if total_weight > 0.0 {
        winning_weight / total_weight
    } else {
        0.0
    };
    let winner = groups[winning_group_index]
        .1
        .iter()
        .max_by(|a, b| candidate_weight(a, coefficients).partial_cmp(&candidate_weight(b, coefficients)).unwrap())
        .unwrap();

    let conflicting_values: Vec<(SourceKind, String)> = present
        .iter()
        .map(|c| (c.source, c.value.clone().unwrap_or_default()))
        .collect();

    let margin = if group_weights.len() > 1 {
        (group_weights[0].1 - group_weights[1].1) / total_weight.max(1e-9)
    } else {
        1.0
    };
    let both_top_groups_validated = group_weights.len() > 1
        && [group_weights[0].0, group_weights[1].0].iter().all(|&i| {
            groups[i]
                .1
                .iter()
                .any(|c| c.matches_pattern || c.matches_catalog)
        });

    if margin < coefficients.voting_margin && both_top_groups_validated {
        return FieldFusionResult {
            field: field_name.to_string(),
            selected_value: None,
            confidence,
            decision: FusionDecision::Conflict,
            contributing_sources,
            winning_source: Some(winner.source),
            fuzzy_similarity: None,
            requires_manual_review: true,
            suggest_review: true,
            conflicting_values,
        };
    }

    if confidence < coefficients.manual_review_threshold {
        return FieldFusionResult {
            field: field_name.to_string(),
            selected_value: winner.value.clone(),
            confidence,
            decision: FusionDecision::BestEffort,
            contributing_sources,
            winning_source: Some(winner.source),
            fuzzy_similarity: None,
            requires_manual_review: false,
            suggest_review: true,
            conflicting_values,
        };
    }

    FieldFusionResult {
        field: field_name.to_string(),
        selected_value: winner.value.clone(),
        confidence,
        decision: FusionDecision::WeightedVoting,
        contributing_sources,
        winning_source: Some(winner.source),
        fuzzy_similarity: None,
        requires_manual_review: false,
        suggest_review: false,
        conflicting_values,
    }
}
