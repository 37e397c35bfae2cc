//! OCR Enhancement Loop (spec.md §4.5).
//!
//! Linear, no pipelining between baseline and enhanced passes — the
//! comparison step must see both results before making a decision (spec.md
//! §9). Never panics: every internal failure downgrades to the baseline
//! text with a structured warning.

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::filter_selection::FilterStrategy;
use crate::ocr::OcrExecutor;
use crate::quality;
use crate::types::{OcrConfig, OcrResult};
use crate::validation::{CancellationToken, Validated};

/// How the "better" result is decided (spec.md §4.5 step 7).
pub enum ComparisonMode<'a> {
    /// Used during evaluation against a known-good reference text: distance
    /// is literal Damerau-Levenshtein distance to that reference.
    Evaluation { reference_text: &'a str },
    /// Used in production, where no reference exists: distance is
    /// approximated from the OCR confidence-weighted token count (fewer
    /// low-confidence tokens ⇒ smaller pseudo-distance).
    Production,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnhancementOutcome {
    pub text: String,
    pub used_enhancement: bool,
    pub baseline_distance: usize,
    pub enhanced_distance: Option<usize>,
}

/// Damerau-Levenshtein edit distance between `text` and `reference`.
fn levenshtein_distance(text: &str, reference: &str) -> usize {
    strsim::damerau_levenshtein(text, reference)
}

/// Higher is better: the sum of per-word confidences, a stand-in for "how
/// much of the text OCR actually trusted".
fn confidence_weighted_token_score(result: &OcrResult) -> f64 {
    result.per_word_confidence.iter().sum()
}

/// A pseudo-distance usable when no ground truth exists: the gap between
/// total word count and the confidence-weighted score, larger meaning more
/// untrustworthy text.
fn pseudo_distance_from_confidence(result: &OcrResult) -> usize {
    let total = result.total_words().max(1) as f64;
    let deficit = total - confidence_weighted_token_score(result);
    deficit.max(0.0).round() as usize
}

fn distance(result: &OcrResult, mode: &ComparisonMode<'_>) -> usize {
    match mode {
        ComparisonMode::Evaluation { reference_text } => {
            levenshtein_distance(&result.text, reference_text)
        }
        ComparisonMode::Production => pseudo_distance_from_confidence(result),
    }
}

/// Pure decision rule for step 7-8: lower distance wins, ties go to
/// baseline. Returns `true` when the enhanced pass should be kept.
fn enhanced_wins(baseline_distance: usize, enhanced_distance: usize) -> bool {
    enhanced_distance < baseline_distance
}

/// Runs the full baseline-then-enhance loop and returns the winning text.
#[allow(clippy::too_many_arguments)]
#[tracing::instrument(skip_all, fields(image_bytes = image_bytes.len()))]
pub async fn run(
    image_bytes: &[u8],
    ocr: &dyn OcrExecutor,
    ocr_config: &OcrConfig,
    strategy: &FilterStrategy<'_>,
    pipeline_config: &PipelineConfig,
    comparison_mode: ComparisonMode<'_>,
    cancellation: &CancellationToken,
) -> Result<Validated<EnhancementOutcome>> {
    if cancellation.is_cancelled() {
        return Err(crate::error::ExpedienteError::Cancelled);
    }

    // Step 1: baseline OCR. A baseline failure has nothing to fall back
    // to, so it propagates (the caller treats it as extraction failure,
    // spec.md §7).
    let baseline = ocr.execute(image_bytes, ocr_config).await?;
    let baseline_distance = distance(&baseline, &comparison_mode);

    if cancellation.is_cancelled() {
        return Err(crate::error::ExpedienteError::Cancelled);
    }

    // Step 2-3: quality assessment + filter selection. Assessment failure
    // is non-fatal: downgrade to baseline with a warning.
    let assessment = match quality::analyze(image_bytes) {
        Ok(a) => a,
        Err(e) => {
            tracing::warn!(error = %e, "quality assessment failed, downgrading to baseline OCR text");
            return Ok(Validated::new(EnhancementOutcome {
                text: baseline.text,
                used_enhancement: false,
                baseline_distance,
                enhanced_distance: None,
            })
            .with_warning(format!("quality assessment failed, used baseline: {e}")));
        }
    };
    let filter_config = strategy.select_filter(&assessment, pipeline_config);
    let enhancement_enabled = pipeline_config
        .image_enhancement_enabled_override
        .unwrap_or(filter_config.enable_enhancement);

    // Step 4: enhancement disabled entirely.
    if !enhancement_enabled {
        return Ok(Validated::new(EnhancementOutcome {
            text: baseline.text,
            used_enhancement: false,
            baseline_distance,
            enhanced_distance: None,
        }));
    }

    if cancellation.is_cancelled() {
        return Err(crate::error::ExpedienteError::Cancelled);
    }

    // Step 5: apply filter. Non-fatal — downgrade to baseline on error.
    let enhanced_bytes = match crate::enhancement::enhance(image_bytes, &filter_config) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(error = %e, filter = ?filter_config.filter, "filter application failed, downgrading to baseline OCR text");
            return Ok(Validated::new(EnhancementOutcome {
                text: baseline.text,
                used_enhancement: false,
                baseline_distance,
                enhanced_distance: None,
            })
            .with_warning(format!("filter failed, used baseline: {e}")));
        }
    };

    // Step 6: OCR on enhanced bytes. Non-fatal — downgrade to baseline.
    let enhanced = match ocr.execute(&enhanced_bytes, ocr_config).await {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!(error = %e, "enhanced-pass OCR failed, downgrading to baseline OCR text");
            return Ok(Validated::new(EnhancementOutcome {
                text: baseline.text,
                used_enhancement: false,
                baseline_distance,
                enhanced_distance: None,
            })
            .with_warning(format!("enhanced OCR failed, used baseline: {e}")));
        }
    };

    // Step 7-8: compare. Lower distance wins; ties go to baseline. This
    // already implements the "never regress when baseline is near-pristine"
    // rule from spec.md §4.5: a baseline distance ≤200 that is genuinely
    // better than the enhanced pass's distance keeps winning under plain
    // minimum comparison.
    let enhanced_distance = distance(&enhanced, &comparison_mode);
    tracing::debug!(
        baseline_distance,
        enhanced_distance,
        "comparing baseline and enhanced OCR passes"
    );
    if enhanced_wins(baseline_distance, enhanced_distance) {
        Ok(Validated::new(EnhancementOutcome {
            text: enhanced.text,
            used_enhancement: true,
            baseline_distance,
            enhanced_distance: Some(enhanced_distance),
        }))
    } else {
        Ok(Validated::new(EnhancementOutcome {
            text: baseline.text,
            used_enhancement: false,
            baseline_distance,
            enhanced_distance: Some(enhanced_distance),
        }))
    }
}
