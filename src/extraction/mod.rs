//! Per-source extractors (spec.md §4.6-4.7): one module per document
//! source, each producing an `ExtractedFields`/`ExtractionMetadata` pair
//! that the fusion engine later reconciles.

#[cfg(feature = "xml")]
pub mod xml;

#[cfg(feature = "image-quality")]
pub mod pdf;

#[cfg(feature = "office")]
pub mod docx;
