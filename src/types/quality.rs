//! Image quality assessment value types.

use serde::{Deserialize, Serialize};

/// Discrete bucket assigned to the aggregate quality index. Lower bounds
/// are inclusive (spec.md §4.1, §8): Pristine ≥ 0.80, Q3_Low ∈ [0.55, 0.80),
/// Q2_MediumPoor ∈ [0.35, 0.55), Q1_Poor < 0.35.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QualityBand {
    Pristine,
    Q3Low,
    Q2MediumPoor,
    Q1Poor,
}

impl QualityBand {
    pub fn from_index(index: f64) -> Self {
        if index >= 0.80 {
            QualityBand::Pristine
        } else if index >= 0.55 {
            QualityBand::Q3Low
        } else if index >= 0.35 {
            QualityBand::Q2MediumPoor
        } else {
            QualityBand::Q1Poor
        }
    }
}

/// Output of the Quality Analyzer (spec.md §4.1). All component scores are
/// raw, pre-normalization measurements; `quality_index` is the normalized
/// [0,1] aggregate that `QualityBand` is derived from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImageQualityAssessment {
    /// Variance-of-Laplacian score. Higher means sharper.
    pub blur_score: f64,
    pub noise_level: f64,
    pub contrast_level: f64,
    pub sharpness_level: f64,
    pub edge_density: f64,
    pub quality_index: f64,
    pub quality_band: QualityBand,
}

impl ImageQualityAssessment {
    pub fn new(
        blur_score: f64,
        noise_level: f64,
        contrast_level: f64,
        sharpness_level: f64,
        edge_density: f64,
        quality_index: f64,
    ) -> Self {
        let quality_index = quality_index.clamp(0.0, 1.0);
        Self {
            blur_score,
            noise_level,
            contrast_level,
            sharpness_level,
            edge_density,
            quality_index,
            quality_band: QualityBand::from_index(quality_index),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_boundaries_are_inclusive_on_lower_bound() {
        assert_eq!(QualityBand::from_index(0.80), QualityBand::Pristine);
        assert_eq!(QualityBand::from_index(0.55), QualityBand::Q3Low);
        assert_eq!(QualityBand::from_index(0.35), QualityBand::Q2MediumPoor);
        assert_eq!(QualityBand::from_index(0.349), QualityBand::Q1Poor);
    }

    #[test]
    fn assessment_clamps_quality_index() {
        let a = ImageQualityAssessment::new(1.0, 0.1, 0.5, 0.5, 0.2, 1.5);
        assert_eq!(a.quality_index, 1.0);
        assert_eq!(a.quality_band, QualityBand::Pristine);
    }
}
