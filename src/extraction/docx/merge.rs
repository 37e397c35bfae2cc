//! Field Merge Strategy (spec.md §4.8), specialized to the DOCX
//! orchestrator: combines `ExtractedFields` from several DOCX strategies
//! (or, in `Complement` mode, a DOCX pass plus an already-fused field set)
//! into one. The top-level XML/PDF/DOCX merge is a separate concern
//! (spec.md §4.9, `crate::fusion`) keyed by [`crate::types::SourceKind`]
//! rather than by strategy name, so this module keeps its own lightweight
//! conflict record instead of reusing `types::FieldConflict`.

use crate::types::ExtractedFields;

/// A disagreement recorded while merging two or more strategies' field
/// sets, keyed by the strategy name rather than a `SourceKind`.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyConflict {
    pub field: String,
    pub conflicting_values: Vec<(String, String)>,
    pub resolved_value: String,
    pub resolution_strategy: String,
}

/// Multi-source merge for `MergeAll`: scalar fields take the first non-null
/// value in input order, recording a [`StrategyConflict`] whenever two
/// inputs disagree on a non-null value. List fields are unioned and
/// deduplicated (`montos` by `(currency, value)`, `fechas` by exact
/// string). `additional_fields` keys use first-writer-wins.
pub fn merge_all(
    inputs: Vec<(String, ExtractedFields)>,
) -> (ExtractedFields, Vec<StrategyConflict>) {
    let mut merged = ExtractedFields::default();
    let mut conflicts = Vec::new();

    merge_scalar(
        &inputs,
        "case_id",
        |f| f.case_id.clone(),
        &mut merged.case_id,
        &mut conflicts,
    );
    merge_scalar(
        &inputs,
        "cause",
        |f| f.cause.clone(),
        &mut merged.cause,
        &mut conflicts,
    );
    merge_scalar(
        &inputs,
        "requested_action",
        |f| f.requested_action.clone(),
        &mut merged.requested_action,
        &mut conflicts,
    );

    let mut seen_montos = std::collections::HashSet::new();
    let mut seen_fechas = std::collections::HashSet::new();
    for (_, fields) in &inputs {
        for monto in &fields.montos {
            if seen_montos.insert(monto.dedup_key()) {
                merged.montos.push(monto.clone());
            }
        }
        for fecha in &fields.fechas {
            if seen_fechas.insert(fecha.clone()) {
                merged.fechas.push(fecha.clone());
            }
        }
        for (key, value) in &fields.additional_fields {
            merged
                .additional_fields
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }
    }

    (merged, conflicts)
}

fn merge_scalar(
    inputs: &[(String, ExtractedFields)],
    field_name: &str,
    getter: impl Fn(&ExtractedFields) -> Option<String>,
    out: &mut Option<String>,
    conflicts: &mut Vec<StrategyConflict>,
) {
    let distinct_values: Vec<(String, String)> = inputs
        .iter()
        .filter_map(|(source_label, fields)| {
            getter(fields)
                .filter(|v| !v.trim().is_empty())
                .map(|v| (source_label.clone(), v))
        })
        .collect();
    if distinct_values.is_empty() {
        return;
    }
    *out = Some(distinct_values[0].1.clone());

    let mut unique: Vec<&str> = Vec::new();
    for (_, value) in &distinct_values {
        if !unique.contains(&value.as_str()) {
            unique.push(value);
        }
    }
    if unique.len() > 1 {
        conflicts.push(StrategyConflict {
            field: field_name.to_string(),
            conflicting_values: distinct_values,
            resolved_value: out.clone().unwrap_or_default(),
            resolution_strategy: "first non-null value wins".to_string(),
        });
    }
}

/// Primary/secondary merge: `primary` always wins any scalar conflict, and
/// every disagreement is recorded regardless of whether it changed the
/// resolved value (spec.md §4.8).
pub fn merge_primary_secondary(
    primary: &ExtractedFields,
    secondary: &ExtractedFields,
) -> (ExtractedFields, Vec<StrategyConflict>) {
    let mut merged = primary.clone();
    let mut conflicts = Vec::new();

    for (name, primary_value, secondary_value) in [
        ("case_id", &primary.case_id, &secondary.case_id),
        ("cause", &primary.cause, &secondary.cause),
        (
            "requested_action",
            &primary.requested_action,
            &secondary.requested_action,
        ),
    ] {
        match (primary_value, secondary_value) {
            (Some(p), Some(s)) if p != s => {
                conflicts.push(StrategyConflict {
                    field: name.to_string(),
                    conflicting_values: vec![
                        ("primary".to_string(), p.clone()),
                        ("secondary".to_string(), s.clone()),
                    ],
                    resolved_value: p.clone(),
                    resolution_strategy: "primary source preference".to_string(),
                });
            }
            (None, Some(s)) => {
                *merged_field_mut(&mut merged, name) = Some(s.clone());
            }
            _ => {}
        }
    }

    for monto in &secondary.montos {
        if !merged.montos.iter().any(|m| m.dedup_key() == monto.dedup_key()) {
            merged.montos.push(monto.clone());
        }
    }
    for fecha in &secondary.fechas {
        if !merged.fechas.contains(fecha) {
            merged.fechas.push(fecha.clone());
        }
    }
    for (key, value) in &secondary.additional_fields {
        merged
            .additional_fields
            .entry(key.clone())
            .or_insert_with(|| value.clone());
    }

    (merged, conflicts)
}

fn merged_field_mut<'a>(fields: &'a mut ExtractedFields, name: &str) -> &'a mut Option<String> {
    match name {
        "case_id" => &mut fields.case_id,
        "cause" => &mut fields.cause,
        "requested_action" => &mut fields.requested_action,
        _ => unreachable!("unknown scalar field {name}"),
    }
}

/// Fills only the gaps in `existing` from `docx_fields`, never overwriting a
/// field `existing` already has a value for (spec.md §4.7 Complement
/// strategy).
pub fn complement(existing: &ExtractedFields, docx_fields: &ExtractedFields) -> ExtractedFields {
    let mut result = existing.clone();
    if result.case_id.is_none() {
        result.case_id = docx_fields.case_id.clone();
    }
    if result.cause.is_none() {
        result.cause = docx_fields.cause.clone();
    }
    if result.requested_action.is_none() {
        result.requested_action = docx_fields.requested_action.clone();
    }

    let mut seen_fechas: std::collections::HashSet<String> =
        result.fechas.iter().cloned().collect();
    for fecha in &docx_fields.fechas {
        if seen_fechas.insert(fecha.clone()) {
            result.fechas.push(fecha.clone());
        }
    }

    let mut seen_montos: std::collections::HashSet<(String, u64)> =
        result.montos.iter().map(|m| m.dedup_key()).collect();
    for monto in &docx_fields.montos {
        if seen_montos.insert(monto.dedup_key()) {
            result.montos.push(monto.clone());
        }
    }

    for (key, value) in &docx_fields.additional_fields {
        result
            .additional_fields
            .entry(key.clone())
            .or_insert_with(|| value.clone());
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Monto;

    fn fields(case_id: Option<&str>) -> ExtractedFields {
        ExtractedFields {
            case_id: case_id.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn merge_all_picks_first_non_null_and_records_conflict() {
        let inputs = vec![
            ("table_based".to_string(), fields(Some("A/1"))),
            ("fuzzy".to_string(), fields(Some("A/2"))),
        ];
        let (merged, conflicts) = merge_all(inputs);
        assert_eq!(merged.case_id.as_deref(), Some("A/1"));
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].field, "case_id");
    }

    #[test]
    fn merge_all_dedups_montos_by_currency_and_value() {
        let monto = Monto {
            currency: "MXN".into(),
            value: 500.0,
            original_text: "$500".into(),
        };
        let mut a = ExtractedFields::default();
        a.montos.push(monto.clone());
        let mut b = ExtractedFields::default();
        b.montos.push(Monto {
            original_text: "500 pesos".into(),
            ..monto
        });
        let (merged, _) = merge_all(vec![("a".into(), a), ("b".into(), b)]);
        assert_eq!(merged.montos.len(), 1);
    }

    #[test]
    fn primary_secondary_merge_prefers_primary_on_conflict() {
        let primary = fields(Some("A/1"));
        let secondary = fields(Some("A/2"));
        let (merged, conflicts) = merge_primary_secondary(&primary, &secondary);
        assert_eq!(merged.case_id.as_deref(), Some("A/1"));
        assert_eq!(conflicts[0].resolution_strategy, "primary source preference");
    }

    #[test]
    fn complement_never_overwrites_present_field() {
        let existing = fields(Some("A/1"));
        let docx = fields(Some("A/2"));
        let result = complement(&existing, &docx);
        assert_eq!(result.case_id.as_deref(), Some("A/1"));
    }

    #[test]
    fn complement_fills_missing_field() {
        let existing = fields(None);
        let docx = fields(Some("A/2"));
        let result = complement(&existing, &docx);
        assert_eq!(result.case_id.as_deref(), Some("A/2"));
    }
}
