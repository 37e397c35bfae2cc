//! The three document sources this crate fuses.

use serde::{Deserialize, Serialize};

/// A document source kind. Fusion always processes these in this fixed
/// order — `Xml < Pdf < Docx` — regardless of completion order, so that
/// voting ties and "first non-null" merges are reproducible (spec.md §4.9.4,
/// §5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SourceKind {
    Xml,
    Pdf,
    Docx,
}

impl SourceKind {
    /// All sources in fixed fusion order.
    pub const ORDERED: [SourceKind; 3] = [SourceKind::Xml, SourceKind::Pdf, SourceKind::Docx];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Xml => "xml",
            SourceKind::Pdf => "pdf",
            SourceKind::Docx => "docx",
        }
    }

    /// Default base reliability before the quality multiplier is applied
    /// (spec.md §4.9.1).
    pub fn default_base_reliability(&self) -> f64 {
        match self {
            SourceKind::Xml => 0.60,
            SourceKind::Pdf => 0.85,
            SourceKind::Docx => 0.70,
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
