//! Core types and traits for the scanlens library.
//!
//! - [`types`] - `ScanJob`, `ScanStatus`, `ScanStatistics`, `ScanOutcome`
//! - [`traits`] - The `AnalysisProvider` and `Explainer` seams
//! - [`error`] - Structured error types
//! - [`input`] - File input and upload limits
//! - [`normalize`] - Provider payload to statistics conversion
//! - [`result`] - Scan report structures

pub mod error;
pub mod input;
pub mod normalize;
pub mod result;
pub mod traits;
pub mod types;

pub use error::ScanError;
pub use input::{FileInput, UploadLimits};
pub use normalize::{normalize, normalize_stats, RawAnalysis};
pub use result::{JobSummary, ScanReport};
pub use traits::{AnalysisProvider, ArcExplainer, ArcProvider, Explainer};
pub use types::{FailureKind, ScanJob, ScanOutcome, ScanStatistics, ScanStatus};
