//! Analysis provider implementations.
//!
//! This module contains implementations of the `AnalysisProvider` trait.
//!
//! ## Available Backends
//!
//! - [`mock`] - A scripted provider for testing
//! - [`virustotal`] - VirusTotal v3 REST API (requires `virustotal` feature)
//!
//! ## Implementing a Custom Backend
//!
//! ```rust,ignore
//! use scanlens::core::{AnalysisProvider, RawAnalysis, ScanError};
//! use async_trait::async_trait;
//!
//! #[derive(Debug)]
//! pub struct MyProvider;
//!
//! #[async_trait]
//! impl AnalysisProvider for MyProvider {
//!     fn name(&self) -> &str {
//!         "my-provider"
//!     }
//!
//!     async fn upload(&self, data: &[u8], filename: &str) -> Result<String, ScanError> {
//!         todo!()
//!     }
//!
//!     async fn fetch_analysis(&self, job_id: &str) -> Result<RawAnalysis, ScanError> {
//!         todo!()
//!     }
//! }
//! ```

pub mod mock;

#[cfg(feature = "virustotal")]
pub mod virustotal;

pub use mock::{MockProvider, MockResponse};

#[cfg(feature = "virustotal")]
pub use virustotal::{VirusTotalConfig, VirusTotalProvider};
