//! Core traits for the scanlens library.
//!
//! [`AnalysisProvider`] is the seam between the orchestration logic and
//! the scanning service's transport. [`Explainer`] is the seam to the
//! explanation service.

use crate::core::error::ScanError;
use crate::core::normalize::RawAnalysis;
use crate::core::types::ScanStatistics;

use async_trait::async_trait;
use std::fmt::Debug;

/// Transport to an asynchronous malware-analysis service.
///
/// Implementations make exactly one outbound request per call and never
/// retry; retry and polling policy live in the
/// [`manager`](crate::manager) layer.
///
/// # Example Implementation
///
/// ```rust,ignore
/// use scanlens::core::{AnalysisProvider, RawAnalysis, ScanError};
/// use async_trait::async_trait;
///
/// #[derive(Debug)]
/// struct InHouseSandbox;
///
/// #[async_trait]
/// impl AnalysisProvider for InHouseSandbox {
///     fn name(&self) -> &str {
///         "sandbox"
///     }
///
///     async fn upload(&self, data: &[u8], filename: &str) -> Result<String, ScanError> {
///         todo!()
///     }
///
///     async fn fetch_analysis(&self, job_id: &str) -> Result<RawAnalysis, ScanError> {
///         todo!()
///     }
/// }
/// ```
#[async_trait]
pub trait AnalysisProvider: Send + Sync + Debug {
    /// Returns the provider name, e.g. "virustotal".
    fn name(&self) -> &str;

    /// Uploads the file and returns the provider's job identifier.
    ///
    /// # Errors
    ///
    /// Returns `ScanError::UploadFailed` on connection errors, non-success
    /// statuses, unreadable bodies or a missing identifier.
    async fn upload(&self, data: &[u8], filename: &str) -> Result<String, ScanError>;

    /// Fetches the current state of an analysis.
    ///
    /// # Errors
    ///
    /// Returns `ScanError::Transient` when this attempt could not read the
    /// analysis state.
    async fn fetch_analysis(&self, job_id: &str) -> Result<RawAnalysis, ScanError>;
}

/// Produces a natural-language explanation of scan statistics.
#[async_trait]
pub trait Explainer: Send + Sync + Debug {
    /// Explains the statistics in plain language.
    async fn explain(&self, stats: &ScanStatistics) -> Result<String, ScanError>;
}

/// An arc-wrapped provider for shared ownership.
pub type ArcProvider = std::sync::Arc<dyn AnalysisProvider>;

/// An arc-wrapped explainer for shared ownership.
pub type ArcExplainer = std::sync::Arc<dyn Explainer>;
