//! Core types used throughout the scanlens library.
//!
//! This module defines the submitted job handle, the per-attempt poll
//! status, the four-count statistics record and the outcome returned to
//! callers.

use crate::core::error::ScanError;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A file submission accepted by the scanning provider.
///
/// Owned by the orchestration call that created it and dropped once the
/// poll loop reaches a terminal state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanJob {
    /// Opaque analysis identifier issued by the provider.
    pub job_id: String,

    /// When the provider accepted the upload.
    pub submitted_at: DateTime<Utc>,
}

impl ScanJob {
    /// Creates a job submitted now.
    pub fn new(job_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            submitted_at: Utc::now(),
        }
    }

    /// Returns the provider's job identifier.
    pub fn id(&self) -> &str {
        &self.job_id
    }
}

/// Detection counts reported by the scanning provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScanStatistics {
    /// Engines that flagged the file as malicious.
    pub malicious: u64,
    /// Engines that found the file suspicious.
    pub suspicious: u64,
    /// Engines that found the file harmless.
    pub harmless: u64,
    /// Engines that could not reach a verdict.
    pub undetected: u64,
}

impl ScanStatistics {
    /// Creates a statistics record from the four counts.
    pub fn new(malicious: u64, suspicious: u64, harmless: u64, undetected: u64) -> Self {
        Self {
            malicious,
            suspicious,
            harmless,
            undetected,
        }
    }

    /// Total number of engines that reported.
    pub fn total(&self) -> u64 {
        self.malicious
            .saturating_add(self.suspicious)
            .saturating_add(self.harmless)
            .saturating_add(self.undetected)
    }

    /// Returns `true` if no engine reported at all.
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Returns `true` if at least one engine flagged the file as malicious.
    pub fn is_malicious(&self) -> bool {
        self.malicious > 0
    }

    /// Fraction of reporting engines that flagged the file as malicious.
    ///
    /// Returns `None` when no engine reported.
    pub fn malicious_ratio(&self) -> Option<f64> {
        match self.total() {
            0 => None,
            total => Some(self.malicious as f64 / total as f64),
        }
    }
}

impl fmt::Display for ScanStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "malicious={} suspicious={} harmless={} undetected={}",
            self.malicious, self.suspicious, self.harmless, self.undetected
        )
    }
}

/// The state of an analysis as observed by a single poll attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanStatus {
    /// The analysis is still running (or reported a status we don't treat as terminal).
    Pending {
        /// The raw status string, if the provider sent one.
        status: Option<String>,
    },

    /// The analysis finished with these statistics.
    Completed(ScanStatistics),

    /// This attempt could not read the analysis state.
    Failed {
        /// Why the attempt failed.
        reason: String,
    },
}

impl ScanStatus {
    /// Returns `true` if polling can stop.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed(_))
    }
}

/// The kind of failure carried by a non-successful [`ScanOutcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The input was refused before submission (size, extension, unreadable).
    Rejected,
    /// The file could not be submitted.
    Upload,
    /// The analysis did not complete within the poll budget.
    Timeout,
    /// The provider could not be reached.
    Transient,
    /// The caller cancelled the scan.
    Cancelled,
}

impl FailureKind {
    /// Message safe to show to an end user.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Rejected => "File was rejected",
            Self::Upload => "Failed to upload file",
            Self::Timeout => "Scan timed out",
            Self::Transient => "Scanning service is temporarily unavailable",
            Self::Cancelled => "Scan was cancelled",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rejected => write!(f, "rejected"),
            Self::Upload => write!(f, "upload_error"),
            Self::Timeout => write!(f, "timeout_error"),
            Self::Transient => write!(f, "transient_error"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// The externally visible result of one scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "stats", rename_all = "snake_case")]
pub enum ScanOutcome {
    /// The analysis completed.
    Success(ScanStatistics),

    /// The file could not be submitted.
    UploadError,

    /// The analysis did not complete within the poll budget.
    TimeoutError,

    /// The provider failed transiently.
    ///
    /// The orchestrator absorbs transient poll failures, so it never
    /// returns this itself.
    TransientError,

    /// The caller cancelled the scan.
    Cancelled,
}

impl ScanOutcome {
    /// Returns `true` if the analysis completed.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Returns the statistics of a successful scan.
    pub fn statistics(&self) -> Option<&ScanStatistics> {
        match self {
            Self::Success(stats) => Some(stats),
            _ => None,
        }
    }

    /// Returns the failure kind, or `None` on success.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Self::Success(_) => None,
            Self::UploadError => Some(FailureKind::Upload),
            Self::TimeoutError => Some(FailureKind::Timeout),
            Self::TransientError => Some(FailureKind::Transient),
            Self::Cancelled => Some(FailureKind::Cancelled),
        }
    }

    /// Short label used in logs and audit events.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Success(_) => "success",
            Self::UploadError => "upload_error",
            Self::TimeoutError => "timeout_error",
            Self::TransientError => "transient_error",
            Self::Cancelled => "cancelled",
        }
    }
}

impl From<&ScanError> for ScanOutcome {
    fn from(err: &ScanError) -> Self {
        match err {
            ScanError::Timeout { .. } => Self::TimeoutError,
            ScanError::Transient { .. } => Self::TransientError,
            ScanError::Cancelled => Self::Cancelled,
            _ => Self::UploadError,
        }
    }
}
