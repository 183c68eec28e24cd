//! Audit event types and emission functions.

use crate::core::{JobSummary, ScanJob, ScanOutcome, ScanReport, ScanStatistics};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const TARGET: &str = "scanlens::audit";

/// Base trait for audit events.
pub trait AuditEvent: Serialize {
    /// Returns the event type name.
    fn event_type(&self) -> &'static str;

    /// Returns the timestamp of the event.
    fn timestamp(&self) -> DateTime<Utc>;
}

/// Audit event for a finished orchestration call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanAuditEvent {
    /// Timestamp of the event.
    pub timestamp: DateTime<Utc>,

    /// Provider that handled the scan.
    pub provider: String,

    /// Provider job id, if the upload succeeded.
    pub job_id: Option<String>,

    /// Submitted filename.
    pub filename: String,

    /// Outcome label.
    pub outcome: String,

    /// Detection counts on success.
    pub stats: Option<ScanStatistics>,

    /// Poll attempts consumed, if polling ran to completion.
    pub attempts: Option<u32>,

    /// Wall time of the call in milliseconds.
    pub duration_ms: u64,
}

impl ScanAuditEvent {
    /// Builds an event from an outcome.
    pub fn new(
        provider: impl Into<String>,
        filename: impl Into<String>,
        job: Option<&ScanJob>,
        outcome: &ScanOutcome,
        duration_ms: u64,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            provider: provider.into(),
            job_id: job.map(|j| j.job_id.clone()),
            filename: filename.into(),
            outcome: outcome.label().to_string(),
            stats: outcome.statistics().copied(),
            attempts: None,
            duration_ms,
        }
    }

    /// Records the poll summary.
    pub fn with_summary(mut self, summary: &JobSummary) -> Self {
        self.attempts = Some(summary.attempts);
        self
    }
}

impl AuditEvent for ScanAuditEvent {
    fn event_type(&self) -> &'static str {
        "scan_finished"
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Emits an audit event for an accepted upload.
pub fn emit_scan_submitted(provider: &str, job: &ScanJob, filename: &str, size: usize) {
    tracing::info!(
        target: TARGET,
        event_type = "scan_submitted",
        provider = %provider,
        job_id = %job.job_id,
        submitted_at = %job.submitted_at.to_rfc3339(),
        filename = %filename,
        size,
        "Scan submitted"
    );
}

/// Emits an audit event for a finished orchestration call.
pub fn emit_scan_finished(event: &ScanAuditEvent) {
    tracing::info!(
        target: TARGET,
        event_type = event.event_type(),
        provider = %event.provider,
        job_id = ?event.job_id,
        filename = %event.filename,
        outcome = %event.outcome,
        malicious = event.stats.map(|s| s.malicious),
        suspicious = event.stats.map(|s| s.suspicious),
        harmless = event.stats.map(|s| s.harmless),
        undetected = event.stats.map(|s| s.undetected),
        attempts = event.attempts,
        duration_ms = event.duration_ms,
        "Scan finished"
    );
}

/// Emits an audit event for a report handed to the serving layer.
pub fn emit_scan_report(report: &ScanReport) {
    tracing::info!(
        target: TARGET,
        event_type = "scan_report",
        report_id = %report.id,
        job_id = %report.job_id,
        filename = %report.filename,
        size = report.size,
        malicious = report.stats.malicious,
        total = report.stats.total(),
        attempts = report.attempts,
        fallback_explanation = report.fallback_explanation,
        duration_ms = report.duration.as_millis() as u64,
        "Scan report generated"
    );
}
