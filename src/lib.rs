//! # Scanlens
//!
//! Submit a file to an asynchronous malware-scanning service, wait for
//! the analysis under a bounded poll budget, and get back detection
//! statistics together with a plain-language explanation.
//!
//! ## Overview
//!
//! - Upload a file to the provider and receive a job id
//! - Poll the job until it completes, absorbing transient failures
//! - Normalize the provider payload into a four-count statistics record
//! - Explain the statistics, with a deterministic fallback
//! - Cancel in-flight scans when the requester goes away
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use scanlens::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ScanConfig::from_env()?;
//!     let service = ScanService::from_config(&config)?;
//!
//!     let input = FileInput::from_path("suspicious.exe");
//!     match service.analyze(input).await {
//!         Ok(report) => println!("{}: {}", report.stats, report.explanation),
//!         Err(failure) => eprintln!("{}", failure.user_message()),
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `virustotal` (default) - VirusTotal v3 provider
//! - `gemini` (default) - Gemini explanations
//!
//! ## Architecture
//!
//! - **Core**: Types, the provider/explainer traits, errors, normalization
//! - **Backends**: Provider implementations
//! - **Manager**: Submission, polling and orchestration
//! - **Explain**: Natural-language explanations
//! - **Audit**: Structured audit events

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod audit;
pub mod backends;
pub mod config;
pub mod core;
pub mod explain;
pub mod manager;

pub use crate::config::ScanConfig;
pub use crate::core::{
    AnalysisProvider, Explainer, FailureKind, FileInput, ScanError, ScanJob, ScanOutcome,
    ScanReport, ScanStatistics, ScanStatus, UploadLimits,
};
pub use crate::manager::{
    AnalysisPoller, PollPolicy, ScanFailure, ScanOrchestrator, ScanService, ScanSubmitter,
};

/// Re-export so callers can build cancellation tokens without a direct dependency.
pub use tokio_util::sync::CancellationToken;

/// Prelude module for convenient imports.
///
/// ```rust
/// use scanlens::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::ScanConfig;
    pub use crate::core::{
        AnalysisProvider, Explainer, FailureKind, FileInput, ScanError, ScanJob, ScanOutcome,
        ScanReport, ScanStatistics, ScanStatus, UploadLimits,
    };
    pub use crate::explain::fallback_explanation;
    pub use crate::manager::{
        AnalysisPoller, PollPolicy, ScanFailure, ScanOrchestrator, ScanService, ScanSubmitter,
    };
    pub use tokio_util::sync::CancellationToken;
}
