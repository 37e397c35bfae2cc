//! Filter configuration: the tagged output of a filter-selection strategy.

use serde::{Deserialize, Serialize};

/// Selected image filter and its tuned parameters (spec.md §3). `None` and
/// `enable_enhancement=false` are distinct knobs: a strategy can select a
/// real filter kind and still suppress it for a Pristine image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FilterKind {
    None,
    PilSimple {
        contrast_factor: f64,
        median_size: u32,
    },
    OpenCvAdvanced {
        denoise_h: f64,
        clahe_clip: f64,
        tile: (u32, u32),
        adaptive_threshold: bool,
    },
    Polynomial {
        contrast: f64,
        brightness: f64,
        sharpness: f64,
        unsharp_radius: f64,
        unsharp_percent: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    pub filter: FilterKind,
    pub enable_enhancement: bool,
}

impl FilterConfig {
    pub fn disabled() -> Self {
        Self {
            filter: FilterKind::None,
            enable_enhancement: false,
        }
    }

    pub fn is_noop(&self) -> bool {
        !self.enable_enhancement || matches!(self.filter, FilterKind::None)
    }
}
