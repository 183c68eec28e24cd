//! Conversion of provider analysis payloads into [`ScanStatistics`].
//!
//! This is the only module that knows the shape of the provider's
//! statistics object. If the provider changes its schema, this is the
//! one place to update.

use crate::core::types::{ScanStatistics, ScanStatus};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Status value the provider uses for a finished analysis.
pub const COMPLETED_STATUS: &str = "completed";

/// The `data.attributes` object of an analysis payload.
///
/// Decoded with named defaults so that a missing `status` or `stats`
/// never fails the decode. `stats` is kept as raw JSON and read field by
/// field in [`normalize_stats`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawAnalysis {
    /// Provider status string ("queued", "in-progress", "completed", ...).
    #[serde(default)]
    pub status: Option<String>,

    /// Raw statistics object.
    #[serde(default)]
    pub stats: Value,
}

impl RawAnalysis {
    /// Creates a payload with the given status and statistics object.
    pub fn new(status: impl Into<String>, stats: Value) -> Self {
        Self {
            status: Some(status.into()),
            stats,
        }
    }

    /// Returns `true` if the provider reports the analysis as finished.
    pub fn is_completed(&self) -> bool {
        self.status.as_deref() == Some(COMPLETED_STATUS)
    }

    /// Classifies this payload as a poll status.
    ///
    /// Only [`COMPLETED_STATUS`] is terminal; everything else, including
    /// an absent or unrecognized status, is pending.
    pub fn status(&self) -> ScanStatus {
        if self.is_completed() {
            ScanStatus::Completed(normalize(self))
        } else {
            ScanStatus::Pending {
                status: self.status.clone(),
            }
        }
    }
}

/// Normalizes an analysis payload into the four-count statistics record.
pub fn normalize(raw: &RawAnalysis) -> ScanStatistics {
    normalize_stats(&raw.stats)
}

/// Normalizes a raw statistics object.
///
/// Missing, null, negative, fractional or non-numeric fields count as 0.
/// A non-object value yields all zeros.
pub fn normalize_stats(stats: &Value) -> ScanStatistics {
    ScanStatistics {
        malicious: count(stats, "malicious"),
        suspicious: count(stats, "suspicious"),
        harmless: count(stats, "harmless"),
        undetected: count(stats, "undetected"),
    }
}

fn count(stats: &Value, field: &str) -> u64 {
    stats.get(field).and_then(Value::as_u64).unwrap_or(0)
}
