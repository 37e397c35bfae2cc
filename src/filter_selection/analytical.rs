//! Analytical filter-selection strategy: a piecewise lookup table keyed by
//! `QualityBand` and a couple of secondary thresholds (spec.md §4.2).

use crate::config::PipelineConfig;
use crate::types::{FilterConfig, FilterKind, ImageQualityAssessment, QualityBand};

/// Noise level above which Q2_MediumPoor falls through to the stronger
/// OpenCV-based filter instead of the simple PIL one.
const Q2_NOISE_FALLTHROUGH: f64 = 0.6;

pub fn select_filter(assessment: &ImageQualityAssessment, config: &PipelineConfig) -> FilterConfig {
    match assessment.quality_band {
        QualityBand::Pristine => FilterConfig {
            filter: FilterKind::None,
            enable_enhancement: false,
        },
        QualityBand::Q3Low => FilterConfig {
            filter: FilterKind::PilSimple {
                contrast_factor: 1.157,
                median_size: 3,
            },
            enable_enhancement: true,
        },
        QualityBand::Q2MediumPoor => {
            if assessment.noise_level > Q2_NOISE_FALLTHROUGH {
                FilterConfig {
                    filter: FilterKind::OpenCvAdvanced {
                        denoise_h: 20.0,
                        clahe_clip: 1.5,
                        tile: (8, 8),
                        adaptive_threshold: false,
                    },
                    enable_enhancement: true,
                }
            } else {
                FilterConfig {
                    filter: FilterKind::PilSimple {
                        contrast_factor: 1.35,
                        median_size: 3,
                    },
                    enable_enhancement: true,
                }
            }
        }
        QualityBand::Q1Poor => FilterConfig {
            filter: FilterKind::OpenCvAdvanced {
                denoise_h: 30.0,
                clahe_clip: 2.0,
                tile: (8, 8),
                adaptive_threshold: config.enable_experimental_adaptive_threshold,
            },
            enable_enhancement: true,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assessment(band_index: f64, noise_level: f64) -> ImageQualityAssessment {
        ImageQualityAssessment::new(0.0, noise_level, 0.0, 0.0, 0.0, band_index)
    }

    #[test]
    fn pristine_disables_enhancement() {
        let cfg = select_filter(&assessment(0.9, 0.1), &PipelineConfig::default());
        assert!(!cfg.enable_enhancement);
        assert!(matches!(cfg.filter, FilterKind::None));
    }

    #[test]
    fn q3_low_uses_tuned_pil_simple_defaults() {
        let cfg = select_filter(&assessment(0.6, 0.1), &PipelineConfig::default());
        match cfg.filter {
            FilterKind::PilSimple {
                contrast_factor,
                median_size,
            } => {
                assert_eq!(contrast_factor, 1.157);
                assert_eq!(median_size, 3);
            }
            _ => panic!("expected PilSimple"),
        }
    }

    #[test]
    fn q2_falls_through_to_opencv_when_noisy() {
        let cfg = select_filter(&assessment(0.45, 0.7), &PipelineConfig::default());
        assert!(matches!(cfg.filter, FilterKind::OpenCvAdvanced { .. }));
    }

    #[test]
    fn q2_stays_pil_simple_when_not_noisy() {
        let cfg = select_filter(&assessment(0.45, 0.2), &PipelineConfig::default());
        assert!(matches!(cfg.filter, FilterKind::PilSimple { .. }));
    }

    #[test]
    fn q1_poor_respects_experimental_adaptive_threshold_flag() {
        let mut config = PipelineConfig::default();
        config.enable_experimental_adaptive_threshold = true;
        let cfg = select_filter(&assessment(0.1, 0.3), &config);
        match cfg.filter {
            FilterKind::OpenCvAdvanced {
                adaptive_threshold, ..
            } => assert!(adaptive_threshold),
            _ => panic!("expected OpenCvAdvanced"),
        }
    }
}
