//! expediente-core: adaptive extraction, OCR enhancement, and multi-source
//! fusion for regulatory Expediente case records.
//!
//! Three document sources feed one pipeline:
//! - `extraction::xml` parses the CNBV registry XML directly (cheap, no OCR).
//! - `extraction::pdf` rasterizes a page, scores it with `quality`, picks a
//!   filter with `filter_selection`, and runs it through `ocr`'s
//!   enhancement loop.
//! - `extraction::docx` dispatches across table/key-value/fuzzy/search
//!   strategies depending on the document's structure.
//!
//! `fusion` reconciles whatever sources produced a result into one
//! `Expediente`, and `classification` assigns it a requirement type and
//! checks the legally-mandated fields for that type. `pipeline` wires all
//! of it together behind a single `run` entry point.

pub mod config;
pub mod error;
pub mod mime;
pub mod types;
pub mod validation;

pub mod filter_selection;

#[cfg(feature = "image-quality")]
pub mod quality;

#[cfg(feature = "image-quality")]
pub mod enhancement;

pub mod ocr;

pub mod extraction;

pub mod fusion;

pub mod classification;

#[cfg(all(
    feature = "tokio-runtime",
    feature = "xml",
    feature = "image-quality",
    feature = "office"
))]
pub mod pipeline;

pub use config::{FusionCoefficients, PipelineConfig};
pub use error::{ExpedienteError, Result};
pub use validation::{CancellationToken, PipelineOutcome, Validated};

#[cfg(all(
    feature = "tokio-runtime",
    feature = "xml",
    feature = "image-quality",
    feature = "office"
))]
pub use pipeline::{run as run_pipeline, PipelineDependencies, PipelineInputs};
