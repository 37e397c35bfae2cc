//! Value types shared across every stage of the pipeline.
//!
//! Each submodule owns one cohesive group of the data model (spec.md §3);
//! this module just re-exports them flat so callers write `types::Expediente`
//! rather than reaching into submodules.

mod classification;
mod expediente;
mod extraction;
mod filter;
mod fusion;
mod ocr;
mod quality;
mod source;

pub use classification::{
    ArticleValidationResult, AuthorityKind, ExpedienteClassificationResult, RequirementType,
};
pub use expediente::{
    missing_date, Expediente, LawMandatedFields, PersonaSolicitud, SemanticAnalysis,
    SolicitudEspecifica, SolicitudParte,
};
pub use extraction::{ExtractedFields, ExtractionMetadata, Monto};
pub use filter::{FilterConfig, FilterKind};
pub use fusion::{
    FieldCandidate, FieldConflict, FieldFusionResult, FusionDecision, FusionResult, NextAction,
};
pub use ocr::{OcrConfig, OcrResult};
pub use quality::{ImageQualityAssessment, QualityBand};
pub use source::SourceKind;
