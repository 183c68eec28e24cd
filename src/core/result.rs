//! Scan report structures.
//!
//! A `ScanReport` is what the serving layer renders: the statistics of a
//! completed analysis, their explanation, and timing metadata.

use crate::core::types::{ScanJob, ScanStatistics};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// The complete result of a successful scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanReport {
    /// Unique identifier for this report.
    pub id: Uuid,

    /// Original filename, as submitted.
    pub filename: String,

    /// Size of the submitted file in bytes.
    pub size: u64,

    /// Detection counts.
    pub stats: ScanStatistics,

    /// Plain-language explanation of the counts.
    pub explanation: String,

    /// Whether the explanation is the static fallback text.
    pub fallback_explanation: bool,

    /// Provider job that produced the counts.
    pub job_id: String,

    /// Poll attempts consumed before the analysis completed.
    pub attempts: u32,

    /// When the scan was requested.
    pub started_at: DateTime<Utc>,

    /// When the provider accepted the upload.
    pub submitted_at: DateTime<Utc>,

    /// When the report was assembled.
    pub completed_at: DateTime<Utc>,

    /// Total wall time of the scan.
    #[serde(with = "duration_serde")]
    pub duration: Duration,
}

impl ScanReport {
    /// Creates a report for a scan whose job completed as `summary` describes.
    pub fn new(
        summary: &JobSummary,
        filename: impl Into<String>,
        size: u64,
        stats: ScanStatistics,
        explanation: impl Into<String>,
        duration: Duration,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            filename: filename.into(),
            size,
            stats,
            explanation: explanation.into(),
            fallback_explanation: false,
            job_id: summary.job.job_id.clone(),
            attempts: summary.attempts,
            started_at: now - chrono::Duration::from_std(duration).unwrap_or_default(),
            submitted_at: summary.job.submitted_at,
            completed_at: now,
            duration,
        }
    }

    /// Marks the explanation as the fallback text.
    pub fn with_fallback_explanation(mut self, fallback: bool) -> Self {
        self.fallback_explanation = fallback;
        self
    }

    /// Returns `true` if any engine flagged the file as malicious.
    pub fn is_malicious(&self) -> bool {
        self.stats.is_malicious()
    }

    /// Response body for the serving layer: `{"stats": {...}, "explanation": "..."}`.
    pub fn to_response_json(&self) -> serde_json::Value {
        serde_json::json!({
            "stats": self.stats,
            "explanation": self.explanation,
        })
    }
}

/// Timing details of a finished job, kept alongside the report in logs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSummary {
    /// The provider job.
    pub job: ScanJob,

    /// Poll attempts consumed.
    pub attempts: u32,

    /// Time from submission to completion.
    #[serde(with = "duration_serde")]
    pub elapsed: Duration,
}

/// Serde helper for Duration serialization.
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_millis().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
