//! Filter Selection Strategy (spec.md §4.2).
//!
//! A tagged variant instead of a trait object: the strategy set is closed
//! and known at compile time (spec.md §9 — "no inheritance, variants
//! dispatched by match").

pub mod analytical;
pub mod polynomial;

pub use polynomial::{PolynomialModel, Target, TargetModel, Term};

use crate::config::PipelineConfig;
use crate::types::{FilterConfig, ImageQualityAssessment};

/// Which filter-selection strategy to run.
pub enum FilterStrategy<'a> {
    Analytical,
    Polynomial(&'a PolynomialModel),
}

impl<'a> FilterStrategy<'a> {
    pub fn select_filter(
        &self,
        assessment: &ImageQualityAssessment,
        config: &PipelineConfig,
    ) -> FilterConfig {
        match self {
            FilterStrategy::Analytical => analytical::select_filter(assessment, config),
            FilterStrategy::Polynomial(model) => polynomial::select_filter(assessment, model),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::QualityBand;

    #[test]
    fn analytical_strategy_dispatches_to_analytical_module() {
        let assessment = ImageQualityAssessment::new(0.0, 0.0, 0.0, 0.0, 0.0, 0.9);
        assert_eq!(assessment.quality_band, QualityBand::Pristine);
        let cfg = FilterStrategy::Analytical.select_filter(&assessment, &PipelineConfig::default());
        assert!(!cfg.enable_enhancement);
    }
}
