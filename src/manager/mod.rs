//! Scan orchestration.
//!
//! [`ScanSubmitter`] uploads, [`AnalysisPoller`] waits under a
//! [`PollPolicy`], and [`ScanOrchestrator`] ties them together.
//! [`ScanService`] adds upload limits and explanations on top.

mod orchestrator;
mod poll_policy;
mod poller;
mod service;
mod submitter;

pub use orchestrator::ScanOrchestrator;
pub use poll_policy::PollPolicy;
pub use poller::AnalysisPoller;
pub use service::{ScanFailure, ScanService};
pub use submitter::ScanSubmitter;
