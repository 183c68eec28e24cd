//! Error types for the scanlens library.
//!
//! Every failure a scan can run into is a `ScanError` value. Errors are
//! converted into a [`ScanOutcome`](crate::core::ScanOutcome) at the
//! orchestrator boundary, so nothing in the scan path panics or unwinds
//! into the caller.

use std::time::Duration;
use thiserror::Error;

/// The main error type for scan operations.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The file could not be submitted to the scanning provider.
    #[error("upload to '{provider}' failed: {reason}")]
    UploadFailed {
        /// Name of the provider that rejected or failed the upload.
        provider: String,
        /// Human-readable reason, never the raw provider body.
        reason: String,
    },

    /// The analysis never reached a terminal state within the poll budget.
    #[error("analysis did not complete after {attempts} attempts ({elapsed:?})")]
    Timeout {
        /// Number of poll attempts consumed.
        attempts: u32,
        /// Wall time spent polling.
        elapsed: Duration,
    },

    /// A single poll attempt failed (transport error or unreadable payload).
    #[error("poll attempt against '{provider}' failed: {message}")]
    Transient {
        /// Name of the provider.
        provider: String,
        /// Error message describing the failure.
        message: String,
    },

    /// The explanation provider did not produce a usable explanation.
    #[error("explanation failed: {reason}")]
    ExplanationFailed {
        /// Reason for the failure.
        reason: String,
    },

    /// No filename was supplied with the upload.
    #[error("no file selected")]
    MissingFilename,

    /// The file exceeds the maximum allowed upload size.
    #[error("file size {size} bytes exceeds maximum {max} bytes")]
    FileTooLarge {
        /// Actual file size in bytes.
        size: u64,
        /// Maximum allowed size in bytes.
        max: u64,
    },

    /// The filename's extension is not on the configured allow-list.
    #[error("file extension '{extension}' is not allowed")]
    DisallowedExtension {
        /// The rejected extension (empty when the filename has none).
        extension: String,
    },

    /// An I/O error occurred while reading the input.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The scan was cancelled by the caller.
    #[error("scan was cancelled")]
    Cancelled,

    /// Configuration error.
    #[error("configuration error: {message}")]
    Configuration {
        /// Description of the configuration error.
        message: String,
    },
}

impl ScanError {
    /// Returns `true` if retrying the same operation later might succeed.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::UploadFailed { .. }
                | Self::Timeout { .. }
                | Self::Transient { .. }
                | Self::ExplanationFailed { .. }
        )
    }

    /// Returns `true` if the input itself was rejected before any provider call.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::MissingFilename
                | Self::FileTooLarge { .. }
                | Self::DisallowedExtension { .. }
                | Self::Io(_)
        )
    }

    /// Creates an `UploadFailed` error.
    pub fn upload_failed(provider: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UploadFailed {
            provider: provider.into(),
            reason: reason.into(),
        }
    }

    /// Creates a `Timeout` error.
    pub fn timeout(attempts: u32, elapsed: Duration) -> Self {
        Self::Timeout { attempts, elapsed }
    }

    /// Creates a `Transient` error.
    pub fn transient(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transient {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Creates an `ExplanationFailed` error.
    pub fn explanation_failed(reason: impl Into<String>) -> Self {
        Self::ExplanationFailed {
            reason: reason.into(),
        }
    }

    /// Creates a `Configuration` error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}
