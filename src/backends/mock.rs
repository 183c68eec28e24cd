//! Mock provider for testing.
//!
//! `MockProvider` plays back a scripted sequence of poll responses and
//! counts every call, so tests can assert exactly how many requests the
//! orchestration made without a network.

use crate::core::{AnalysisProvider, RawAnalysis, ScanError, ScanStatistics};

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// One scripted poll response.
#[derive(Debug, Clone, PartialEq)]
pub enum MockResponse {
    /// The analysis reports a non-terminal status.
    Status(String),
    /// The analysis completed with these statistics.
    Completed(ScanStatistics),
    /// The analysis completed with a raw statistics object.
    CompletedRaw(serde_json::Value),
    /// The poll attempt fails at the transport level.
    TransportError(String),
}

impl MockResponse {
    /// A "queued" status response.
    pub fn queued() -> Self {
        Self::Status("queued".to_string())
    }

    fn into_result(self, provider: &str) -> Result<RawAnalysis, ScanError> {
        match self {
            Self::Status(status) => Ok(RawAnalysis::new(status, serde_json::Value::Null)),
            Self::Completed(stats) => Ok(RawAnalysis::new(
                "completed",
                serde_json::to_value(stats).unwrap_or_default(),
            )),
            Self::CompletedRaw(stats) => Ok(RawAnalysis::new("completed", stats)),
            Self::TransportError(message) => Err(ScanError::transient(provider, message)),
        }
    }
}

/// A scripted provider for testing purposes.
///
/// Poll responses are consumed in order; once the script runs out the
/// last response repeats. An empty script answers "queued".
///
/// # Examples
///
/// ```rust
/// use scanlens::backends::{MockProvider, MockResponse};
/// use scanlens::core::ScanStatistics;
///
/// let provider = MockProvider::new()
///     .with_job_id("analysis-1")
///     .with_response(MockResponse::queued())
///     .with_response(MockResponse::Completed(ScanStatistics::new(0, 0, 70, 5)));
/// assert_eq!(provider.poll_count(), 0);
/// ```
#[derive(Debug)]
pub struct MockProvider {
    /// Name of this provider instance.
    name: String,
    /// Job id returned on upload, or the upload failure reason.
    upload: Result<String, String>,
    /// Remaining poll responses.
    script: Mutex<VecDeque<MockResponse>>,
    /// Response repeated after the script runs out.
    last: Mutex<MockResponse>,
    /// Simulated latency per request.
    latency: Option<Duration>,
    upload_count: AtomicU32,
    poll_count: AtomicU32,
    /// Filenames received by `upload`.
    filenames: Mutex<Vec<String>>,
}

impl MockProvider {
    /// Creates a provider that accepts uploads and reports "queued" forever.
    pub fn new() -> Self {
        Self {
            name: "mock".to_string(),
            upload: Ok("mock-analysis".to_string()),
            script: Mutex::new(VecDeque::new()),
            last: Mutex::new(MockResponse::queued()),
            latency: None,
            upload_count: AtomicU32::new(0),
            poll_count: AtomicU32::new(0),
            filenames: Mutex::new(Vec::new()),
        }
    }

    /// Creates a provider that completes on the first poll.
    pub fn completing(stats: ScanStatistics) -> Self {
        Self::new().with_response(MockResponse::Completed(stats))
    }

    /// Sets the name of this provider.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the job id returned by uploads.
    pub fn with_job_id(mut self, job_id: impl Into<String>) -> Self {
        self.upload = Ok(job_id.into());
        self
    }

    /// Makes every upload fail with the given reason.
    pub fn with_upload_failure(mut self, reason: impl Into<String>) -> Self {
        self.upload = Err(reason.into());
        self
    }

    /// Appends a poll response to the script.
    pub fn with_response(self, response: MockResponse) -> Self {
        self.push_response(response);
        self
    }

    /// Appends `count` copies of a poll response.
    pub fn with_repeated(self, response: MockResponse, count: usize) -> Self {
        for _ in 0..count {
            self.push_response(response.clone());
        }
        self
    }

    /// Sets the simulated latency per request.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Appends a poll response (shared-reference version).
    pub fn push_response(&self, response: MockResponse) {
        self.script
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push_back(response);
    }

    /// Returns the number of upload calls made.
    pub fn upload_count(&self) -> u32 {
        self.upload_count.load(Ordering::SeqCst)
    }

    /// Returns the number of poll calls made.
    pub fn poll_count(&self) -> u32 {
        self.poll_count.load(Ordering::SeqCst)
    }

    /// Returns the filenames received by `upload`, in order.
    pub fn uploaded_filenames(&self) -> Vec<String> {
        self.filenames
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn next_response(&self) -> MockResponse {
        let mut script = self
            .script
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut last = self
            .last
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(response) = script.pop_front() {
            *last = response;
        }
        last.clone()
    }

    async fn simulate_latency(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AnalysisProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn upload(&self, _data: &[u8], filename: &str) -> Result<String, ScanError> {
        self.upload_count.fetch_add(1, Ordering::SeqCst);
        self.filenames
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(filename.to_string());
        self.simulate_latency().await;

        self.upload
            .clone()
            .map_err(|reason| ScanError::upload_failed(&self.name, reason))
    }

    async fn fetch_analysis(&self, _job_id: &str) -> Result<RawAnalysis, ScanError> {
        self.poll_count.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;
        self.next_response().into_result(&self.name)
    }
}
