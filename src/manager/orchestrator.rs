//! The scan orchestrator: submit, poll, normalize.

use crate::audit::{self, ScanAuditEvent};
use crate::core::{ArcProvider, JobSummary, ScanError, ScanJob, ScanOutcome, ScanStatistics};
use crate::manager::poll_policy::PollPolicy;
use crate::manager::poller::AnalysisPoller;
use crate::manager::submitter::ScanSubmitter;

use std::time::Instant;
use tokio_util::sync::CancellationToken;

/// Composes [`ScanSubmitter`] and [`AnalysisPoller`] into a single
/// `scan` operation.
///
/// Holds no per-scan state: every call owns its own [`ScanJob`], so one
/// orchestrator can serve concurrent scans of different files. Clone it
/// or share it behind an `Arc`.
///
/// # Example
///
/// ```rust
/// use scanlens::backends::MockProvider;
/// use scanlens::core::{ScanOutcome, ScanStatistics};
/// use scanlens::manager::{PollPolicy, ScanOrchestrator};
/// use std::sync::Arc;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let provider = Arc::new(MockProvider::completing(ScanStatistics::new(0, 0, 70, 5)));
/// let orchestrator = ScanOrchestrator::new(provider, PollPolicy::default());
///
/// let outcome = orchestrator.scan(b"hello", "hello.txt").await;
/// assert_eq!(outcome, ScanOutcome::Success(ScanStatistics::new(0, 0, 70, 5)));
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ScanOrchestrator {
    provider_name: String,
    submitter: ScanSubmitter,
    poller: AnalysisPoller,
}

impl ScanOrchestrator {
    /// Creates an orchestrator for the given provider and poll budget.
    pub fn new(provider: ArcProvider, policy: PollPolicy) -> Self {
        Self {
            provider_name: provider.name().to_string(),
            submitter: ScanSubmitter::new(provider.clone()),
            poller: AnalysisPoller::new(provider, policy),
        }
    }

    /// Returns the provider name.
    pub fn provider_name(&self) -> &str {
        &self.provider_name
    }

    /// Returns the poll budget.
    pub fn policy(&self) -> &PollPolicy {
        self.poller.policy()
    }

    /// Scans a file.
    ///
    /// Returns `Success`, `UploadError` or `TimeoutError`. An upload
    /// failure returns immediately without polling.
    pub async fn scan(&self, data: &[u8], filename: &str) -> ScanOutcome {
        self.scan_with_cancel(data, filename, &CancellationToken::new())
            .await
    }

    /// Scans a file, aborting with `Cancelled` when `cancel` fires.
    ///
    /// Useful when the client that requested the scan has gone away or
    /// the process is shutting down.
    pub async fn scan_with_cancel(
        &self,
        data: &[u8],
        filename: &str,
        cancel: &CancellationToken,
    ) -> ScanOutcome {
        self.run(data, filename, cancel).await.0
    }

    /// Like [`scan_with_cancel`](Self::scan_with_cancel), also returning the
    /// job summary when the analysis completed.
    pub(crate) async fn run(
        &self,
        data: &[u8],
        filename: &str,
        cancel: &CancellationToken,
    ) -> (ScanOutcome, Option<JobSummary>) {
        let started = Instant::now();

        let submitted = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ScanError::Cancelled),
            submitted = self.submitter.submit(data, filename) => submitted,
        };

        let job = match submitted {
            Ok(job) => job,
            Err(err) => return self.finish(filename, None, Err(err), started),
        };

        audit::emit_scan_submitted(&self.provider_name, &job, filename, data.len());

        let polled = self.poller.run(&job, cancel).await;
        self.finish(filename, Some(&job), polled, started)
    }

    fn finish(
        &self,
        filename: &str,
        job: Option<&ScanJob>,
        result: Result<(ScanStatistics, JobSummary), ScanError>,
        started: Instant,
    ) -> (ScanOutcome, Option<JobSummary>) {
        let duration_ms = started.elapsed().as_millis() as u64;

        let (outcome, summary) = match result {
            Ok((stats, summary)) => (ScanOutcome::Success(stats), Some(summary)),
            Err(err) => {
                tracing::warn!(
                    provider = %self.provider_name,
                    job_id = ?job.map(ScanJob::id),
                    filename = %filename,
                    error = %err,
                    "Scan failed"
                );
                (ScanOutcome::from(&err), None)
            }
        };

        let mut event =
            ScanAuditEvent::new(&self.provider_name, filename, job, &outcome, duration_ms);
        if let Some(summary) = &summary {
            event = event.with_summary(summary);
        }
        audit::emit_scan_finished(&event);

        (outcome, summary)
    }
}
