//! Polynomial filter-selection strategy: frozen, pre-trained coefficient
//! tables evaluated over the four quality features (spec.md §4.2, §6).
//!
//! Training happens offline; this crate only loads and evaluates the
//! coefficients (Non-goals: no training).

use std::collections::HashMap;
use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::error::{ExpedienteError, Result};
use crate::types::{FilterConfig, FilterKind, ImageQualityAssessment};

/// The five predicted targets (spec.md §4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Target {
    Contrast,
    Brightness,
    Sharpness,
    UnsharpRadius,
    UnsharpPercent,
}

/// One term of a multivariate polynomial: `coefficient * BlurScore^p0 *
/// Contrast^p1 * NoiseEstimate^p2 * EdgeDensity^p3`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Term {
    pub powers: [u8; 4],
    pub coefficient: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetModel {
    pub terms: Vec<Term>,
    pub clamp_min: f64,
    pub clamp_max: f64,
}

impl TargetModel {
    fn evaluate(&self, features: [f64; 4]) -> f64 {
        let raw: f64 = self
            .terms
            .iter()
            .map(|term| {
                term.coefficient
                    * term
                        .powers
                        .iter()
                        .zip(features.iter())
                        .map(|(p, f)| f.powi(*p as i32))
                        .product::<f64>()
            })
            .sum();
        raw.clamp(self.clamp_min, self.clamp_max)
    }
}

/// The full frozen coefficient table, read-only process-wide state once
/// loaded (spec.md §5).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolynomialModel {
    targets: HashMap<Target, TargetModel>,
}

impl PolynomialModel {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(ExpedienteError::from)
    }

    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut buf = String::new();
        reader.read_to_string(&mut buf)?;
        Self::from_json_str(&buf)
    }

    fn eval(&self, target: Target, features: [f64; 4], fallback: f64) -> f64 {
        self.targets
            .get(&target)
            .map(|model| model.evaluate(features))
            .unwrap_or(fallback)
    }
}

pub fn select_filter(assessment: &ImageQualityAssessment, model: &PolynomialModel) -> FilterConfig {
    let features = [
        assessment.blur_score,
        assessment.contrast_level,
        assessment.noise_level,
        assessment.edge_density,
    ];

    let contrast = model.eval(Target::Contrast, features, 1.0);
    let brightness = model.eval(Target::Brightness, features, 0.0);
    let sharpness = model.eval(Target::Sharpness, features, 1.0);
    let unsharp_radius = model.eval(Target::UnsharpRadius, features, 2.0);
    let unsharp_percent = model.eval(Target::UnsharpPercent, features, 150.0);

    FilterConfig {
        filter: FilterKind::Polynomial {
            contrast,
            brightness,
            sharpness,
            unsharp_radius,
            unsharp_percent,
        },
        enable_enhancement: true,
    }
}
