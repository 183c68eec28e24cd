//! Analysis polling.
//!
//! Each attempt asks the provider for the job's status. Only "completed"
//! ends the loop early. Pending and unknown statuses, as well as failed
//! attempts, consume one attempt and the loop sleeps before trying
//! again. When the budget runs out the poller reports a timeout.

use crate::core::{ArcProvider, JobSummary, ScanError, ScanJob, ScanStatistics, ScanStatus};
use crate::manager::poll_policy::PollPolicy;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Polls the provider until a job completes or the budget is spent.
///
/// The wait between attempts is a `tokio::time::sleep` inside the
/// calling task. Nothing is locked while waiting, so many pollers can
/// run side by side on the same runtime.
#[derive(Debug, Clone)]
pub struct AnalysisPoller {
    provider: ArcProvider,
    policy: PollPolicy,
}

impl AnalysisPoller {
    /// Creates a poller for the given provider and budget.
    pub fn new(provider: ArcProvider, policy: PollPolicy) -> Self {
        Self { provider, policy }
    }

    /// Returns the poll budget.
    pub fn policy(&self) -> &PollPolicy {
        &self.policy
    }

    /// Makes a single status request.
    ///
    /// Provider errors are turned into [`ScanStatus::Failed`].
    pub async fn poll_once(&self, job: &ScanJob) -> ScanStatus {
        match self.provider.fetch_analysis(job.id()).await {
            Ok(raw) => raw.status(),
            Err(err) => ScanStatus::Failed {
                reason: err.to_string(),
            },
        }
    }

    /// Waits for the job to complete.
    ///
    /// # Errors
    ///
    /// `ScanError::Timeout` once the attempt budget or deadline is spent.
    /// Failed attempts are logged and absorbed, never returned.
    pub async fn wait_for_completion(&self, job: ScanJob) -> Result<ScanStatistics, ScanError> {
        self.wait_for_completion_with_cancel(job, &CancellationToken::new())
            .await
    }

    /// Waits for the job to complete, giving up early when `cancel` fires.
    ///
    /// # Errors
    ///
    /// `ScanError::Timeout` as for [`wait_for_completion`](Self::wait_for_completion),
    /// or `ScanError::Cancelled` if the token is cancelled while a request
    /// is in flight or between attempts.
    pub async fn wait_for_completion_with_cancel(
        &self,
        job: ScanJob,
        cancel: &CancellationToken,
    ) -> Result<ScanStatistics, ScanError> {
        self.run(&job, cancel).await.map(|(stats, _)| stats)
    }

    pub(crate) async fn run(
        &self,
        job: &ScanJob,
        cancel: &CancellationToken,
    ) -> Result<(ScanStatistics, JobSummary), ScanError> {
        let started = Instant::now();
        let max_attempts = self.policy.max_attempts();
        let mut attempt: u32 = 0;

        loop {
            if cancel.is_cancelled() {
                return Err(ScanError::Cancelled);
            }
            attempt += 1;

            let status = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(ScanError::Cancelled),
                status = self.poll_once(job) => status,
            };

            match status {
                ScanStatus::Completed(stats) => {
                    let summary = JobSummary {
                        job: job.clone(),
                        attempts: attempt,
                        elapsed: started.elapsed(),
                    };
                    tracing::info!(
                        job_id = %job.job_id,
                        attempt,
                        stats = %stats,
                        "Analysis completed"
                    );
                    return Ok((stats, summary));
                }
                ScanStatus::Pending { status } => {
                    tracing::debug!(
                        job_id = %job.job_id,
                        attempt,
                        max_attempts,
                        status = status.as_deref().unwrap_or("<none>"),
                        "Analysis pending"
                    );
                }
                ScanStatus::Failed { reason } => {
                    tracing::warn!(
                        job_id = %job.job_id,
                        attempt,
                        max_attempts,
                        error = %reason,
                        "Poll attempt failed, will retry"
                    );
                }
            }

            if !self.policy.has_attempts_left(attempt) {
                break;
            }

            let delay = self.policy.delay_after_attempt(attempt);
            if let Some(deadline) = self.policy.deadline() {
                if started.elapsed().saturating_add(delay) > deadline {
                    tracing::debug!(
                        job_id = %job.job_id,
                        attempt,
                        deadline_ms = deadline.as_millis() as u64,
                        "Poll deadline reached"
                    );
                    break;
                }
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(ScanError::Cancelled),
                _ = tokio::time::sleep(delay) => {}
            }
        }

        let elapsed = started.elapsed();
        tracing::warn!(
            job_id = %job.job_id,
            attempts = attempt,
            elapsed_ms = elapsed.as_millis() as u64,
            "Analysis did not complete in time"
        );
        Err(ScanError::timeout(attempt, elapsed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::{MockProvider, MockResponse};
    use std::sync::Arc;
    use std::time::Duration;

    fn poller(provider: &Arc<MockProvider>, policy: PollPolicy) -> AnalysisPoller {
        AnalysisPoller::new(provider.clone(), policy)
    }

    #[tokio::test(start_paused = true)]
    async fn test_completes_after_pending() {
        let provider = Arc::new(
            MockProvider::new()
                .with_repeated(MockResponse::queued(), 3)
                .with_response(MockResponse::Completed(ScanStatistics::new(2, 1, 70, 5))),
        );
        let poller = poller(&provider, PollPolicy::default());

        let stats = poller.wait_for_completion(ScanJob::new("job")).await.unwrap();
        assert_eq!(stats, ScanStatistics::new(2, 1, 70, 5));
        assert_eq!(provider.poll_count(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out_after_max_attempts() {
        let provider = Arc::new(MockProvider::new());
        let poller = poller(&provider, PollPolicy::fixed(5, Duration::from_secs(20)));

        let started = Instant::now();
        let err = poller.wait_for_completion(ScanJob::new("job")).await.unwrap_err();

        assert!(matches!(err, ScanError::Timeout { attempts: 5, .. }));
        assert_eq!(provider.poll_count(), 5);
        // four sleeps, none after the last attempt
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(80) && elapsed < Duration::from_secs(81));
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_error_is_absorbed() {
        let provider = Arc::new(
            MockProvider::new()
                .with_response(MockResponse::TransportError("connection reset".into()))
                .with_response(MockResponse::Completed(ScanStatistics::new(0, 0, 60, 12))),
        );
        let poller = poller(&provider, PollPolicy::default());

        let stats = poller.wait_for_completion(ScanJob::new("job")).await.unwrap();
        assert_eq!(stats.harmless, 60);
        assert_eq!(provider.poll_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_status_is_pending() {
        let provider = Arc::new(
            MockProvider::new()
                .with_response(MockResponse::Status("failed".into()))
                .with_response(MockResponse::Status("in-progress".into()))
                .with_response(MockResponse::Completed(ScanStatistics::default())),
        );
        let poller = poller(&provider, PollPolicy::fixed(5, Duration::from_secs(1)));

        let stats = poller.wait_for_completion(ScanJob::new("job")).await.unwrap();
        assert!(stats.is_empty());
        assert_eq!(provider.poll_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_completed_with_missing_stats_defaults_to_zero() {
        let provider = Arc::new(MockProvider::new().with_response(MockResponse::CompletedRaw(
            serde_json::json!({ "malicious": 4 }),
        )));
        let poller = poller(&provider, PollPolicy::default());

        let stats = poller.wait_for_completion(ScanJob::new("job")).await.unwrap();
        assert_eq!(stats, ScanStatistics::new(4, 0, 0, 0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_stops_early() {
        let provider = Arc::new(MockProvider::new());
        let policy =
            PollPolicy::fixed(15, Duration::from_secs(20)).with_deadline(Duration::from_secs(50));
        let poller = poller(&provider, policy);

        let err = poller.wait_for_completion(ScanJob::new("job")).await.unwrap_err();
        // attempts at t=0, 20, 40; the next sleep would cross 50s
        assert!(matches!(err, ScanError::Timeout { attempts: 3, .. }));
        assert_eq!(provider.poll_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_sleep() {
        let provider = Arc::new(MockProvider::new());
        let poller = poller(&provider, PollPolicy::default());
        let cancel = CancellationToken::new();

        let canceller = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(30)).await;
            canceller.cancel();
        });

        let started = Instant::now();
        let err = poller
            .wait_for_completion_with_cancel(ScanJob::new("job"), &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, ScanError::Cancelled));
        assert_eq!(provider.poll_count(), 2);
        assert!(started.elapsed() < Duration::from_secs(40));
    }

    #[tokio::test]
    async fn test_already_cancelled_makes_no_requests() {
        let provider = Arc::new(MockProvider::new());
        let poller = poller(&provider, PollPolicy::default());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = poller
            .wait_for_completion_with_cancel(ScanJob::new("job"), &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, ScanError::Cancelled));
        assert_eq!(provider.poll_count(), 0);
    }

    #[tokio::test]
    async fn test_poll_once_maps_failure() {
        let provider = Arc::new(
            MockProvider::new().with_response(MockResponse::TransportError("timeout".into())),
        );
        let poller = poller(&provider, PollPolicy::default());

        let status = poller.poll_once(&ScanJob::new("job")).await;
        assert!(matches!(status, ScanStatus::Failed { .. }));
        assert!(!status.is_terminal());
    }

    #[tokio::test(start_paused = true)]
    async fn test_huge_interval_with_deadline_times_out() {
        let provider = Arc::new(MockProvider::new());
        let policy = PollPolicy::fixed(3, Duration::from_secs(u64::MAX))
            .with_deadline(Duration::from_secs(60));
        let poller = poller(&provider, policy);

        let err = poller.wait_for_completion(ScanJob::new("job")).await.unwrap_err();
        assert!(matches!(err, ScanError::Timeout { attempts: 1, .. }));
        assert_eq!(provider.poll_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_uncapped_backoff_sleeps_until_cancelled() {
        let provider = Arc::new(MockProvider::new());
        let policy = PollPolicy::fixed(200, Duration::from_secs(1))
            .with_backoff_multiplier(2.0)
            .with_max_interval(Duration::MAX);
        let poller = poller(&provider, policy);
        let cancel = CancellationToken::new();

        let canceller = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            canceller.cancel();
        });

        let err = poller
            .wait_for_completion_with_cancel(ScanJob::new("job"), &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, ScanError::Cancelled));
        // sleeps of 1, 2, 4, ... 1024s; the 2048s sleep is cut short
        assert_eq!(provider.poll_count(), 12);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_attempt_budget_makes_one_request() {
        let provider = Arc::new(MockProvider::new());
        let poller = poller(&provider, PollPolicy::fixed(0, Duration::from_secs(5)));

        let err = poller.wait_for_completion(ScanJob::new("job")).await.unwrap_err();
        assert!(matches!(err, ScanError::Timeout { attempts: 1, .. }));
        assert_eq!(provider.poll_count(), 1);
    }
}
