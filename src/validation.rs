//! Validation-state threading and cooperative cancellation (spec.md §9,
//! SPEC_FULL.md §2.4).
//!
//! Stages return a [`Validated<T>`] bundle instead of mutating a shared
//! accumulator, and check a [`CancellationToken`] at each suspension point
//! named in spec.md §5.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::types::FusionResult;

/// A value plus the missing-field names and warnings accumulated while
/// producing it. Threaded through each stage instead of a mutable
/// accumulator (spec.md §9).
#[derive(Debug, Clone, PartialEq)]
pub struct Validated<T> {
    pub value: T,
    pub missing: HashSet<String>,
    pub warnings: Vec<String>,
}

impl<T> Validated<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            missing: HashSet::new(),
            warnings: Vec::new(),
        }
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings.extend(warnings);
        self
    }

    pub fn with_missing(mut self, field: impl Into<String>) -> Self {
        self.missing.insert(field.into());
        self
    }

    /// Maps the inner value while carrying the missing/warnings sets
    /// forward unchanged.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Validated<U> {
        Validated {
            value: f(self.value),
            missing: self.missing,
            warnings: self.warnings,
        }
    }

    /// Merges another bundle's missing-field set and warnings into this
    /// one, keeping this bundle's value.
    pub fn merge_state(mut self, other: &Validated<impl Sized>) -> Self {
        self.missing.extend(other.missing.iter().cloned());
        self.warnings.extend(other.warnings.iter().cloned());
        self
    }
}

/// A cheap, cloneable cancellation signal. Every stage checks
/// [`CancellationToken::is_cancelled`] at the suspension points named in
/// spec.md §5: before I/O, before awaiting OCR, before joining per-source
/// results, and between per-strategy completions in DOCX `MergeAll`.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// The top-level result of a whole pipeline run (spec.md §7: "Each
/// pipeline run returns either a `FusionResult` ... a warnings list, or
/// `Cancelled`, or `FatalInvalidInput`").
#[derive(Debug, Clone)]
pub enum PipelineOutcome {
    Completed(FusionResult, Vec<String>),
    Cancelled,
    FatalInvalidInput(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancellation_token_is_observed_after_clone() {
        let token = CancellationToken::new();
        let cloned = token.clone();
        assert!(!cloned.is_cancelled());
        token.cancel();
        assert!(cloned.is_cancelled());
    }

    #[test]
    fn validated_map_preserves_missing_and_warnings() {
        let v = Validated::new(1)
            .with_missing("case_id")
            .with_warning("unexpected element");
        let mapped = v.map(|x| x + 1);
        assert_eq!(mapped.value, 2);
        assert!(mapped.missing.contains("case_id"));
        assert_eq!(mapped.warnings, vec!["unexpected element".to_string()]);
    }

    #[test]
    fn merge_state_unions_both_sets() {
        let a = Validated::new(()).with_missing("a");
        let b = Validated::new(()).with_missing("b").with_warning("w");
        let merged = a.merge_state(&b);
        assert!(merged.missing.contains("a"));
        assert!(merged.missing.contains("b"));
        assert_eq!(merged.warnings, vec!["w".to_string()]);
    }
}
