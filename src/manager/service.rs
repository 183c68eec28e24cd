//! The entry point for the serving layer.

use crate::audit;
use crate::core::{
    ArcExplainer, FailureKind, FileInput, ScanError, ScanOutcome, ScanReport, UploadLimits,
};
use crate::explain::{explain_or_fallback, StaticExplainer};
use crate::manager::orchestrator::ScanOrchestrator;

use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

/// A scan that did not produce a report.
///
/// Carries only the failure kind and an internal detail for logs; the
/// user-facing message never includes provider bodies or credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanFailure {
    /// What went wrong.
    pub kind: FailureKind,
    message: &'static str,
    detail: Option<String>,
}

impl ScanFailure {
    /// Creates a failure of the given kind.
    pub fn new(kind: FailureKind) -> Self {
        Self {
            kind,
            message: kind.user_message(),
            detail: None,
        }
    }

    /// Maps an error raised before or around the scan to a failure.
    pub fn from_error(err: &ScanError) -> Self {
        let kind = match err {
            err if err.is_rejection() => FailureKind::Rejected,
            ScanError::UploadFailed { .. } => FailureKind::Upload,
            ScanError::Timeout { .. } => FailureKind::Timeout,
            ScanError::Cancelled => FailureKind::Cancelled,
            _ => FailureKind::Transient,
        };
        let message = match err {
            ScanError::MissingFilename => "No file selected",
            _ => kind.user_message(),
        };
        Self {
            kind,
            message,
            detail: Some(err.to_string()),
        }
    }

    /// Message safe to show to an end user.
    pub fn user_message(&self) -> &'static str {
        self.message
    }

    /// Internal detail for logs, if any.
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    /// Response body for the serving layer: `{"error": "..."}`.
    pub fn to_response_json(&self) -> serde_json::Value {
        serde_json::json!({ "error": self.user_message() })
    }
}

impl fmt::Display for ScanFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.user_message())
    }
}

impl std::error::Error for ScanFailure {}

/// Validates uploads, runs the orchestrator and explains the result.
#[derive(Debug, Clone)]
pub struct ScanService {
    orchestrator: ScanOrchestrator,
    explainer: ArcExplainer,
    limits: UploadLimits,
}

impl ScanService {
    /// Creates a service.
    pub fn new(
        orchestrator: ScanOrchestrator,
        explainer: ArcExplainer,
        limits: UploadLimits,
    ) -> Self {
        Self {
            orchestrator,
            explainer,
            limits,
        }
    }

    /// Creates a service that only uses the static explanation.
    pub fn without_explainer(orchestrator: ScanOrchestrator, limits: UploadLimits) -> Self {
        Self::new(orchestrator, Arc::new(StaticExplainer), limits)
    }

    /// Wires the VirusTotal provider and, if a key is configured, the
    /// Gemini explainer from a [`ScanConfig`](crate::config::ScanConfig).
    #[cfg(all(feature = "virustotal", feature = "gemini"))]
    pub fn from_config(config: &crate::config::ScanConfig) -> Result<Self, ScanError> {
        use crate::backends::{VirusTotalConfig, VirusTotalProvider};
        use crate::explain::{GeminiConfig, GeminiExplainer};

        let provider = VirusTotalProvider::new(
            VirusTotalConfig::from_secret(config.virustotal_api_key.clone())
                .with_base_url(config.virustotal_base_url.clone())
                .with_timeout(config.request_timeout),
        )?;
        let orchestrator = ScanOrchestrator::new(Arc::new(provider), config.poll.clone());

        let explainer: ArcExplainer = match &config.gemini_api_key {
            Some(key) => Arc::new(GeminiExplainer::new(
                GeminiConfig::from_secret(key.clone())
                    .with_base_url(config.gemini_base_url.clone())
                    .with_model(config.gemini_model.clone())
                    .with_timeout(config.request_timeout),
            )?),
            None => {
                tracing::info!("GEMINI_API_KEY not set, using static explanations");
                Arc::new(StaticExplainer)
            }
        };

        Ok(Self::new(orchestrator, explainer, config.limits.clone()))
    }

    /// Returns the orchestrator.
    pub fn orchestrator(&self) -> &ScanOrchestrator {
        &self.orchestrator
    }

    /// Returns the upload limits.
    pub fn limits(&self) -> &UploadLimits {
        &self.limits
    }

    /// Scans the input and explains the result.
    pub async fn analyze(&self, input: FileInput) -> Result<ScanReport, ScanFailure> {
        self.analyze_with_cancel(input, &CancellationToken::new())
            .await
    }

    /// Scans the input and explains the result, honouring `cancel`.
    ///
    /// Inputs without a filename, oversized inputs and disallowed
    /// extensions are rejected before the provider is contacted.
    pub async fn analyze_with_cancel(
        &self,
        input: FileInput,
        cancel: &CancellationToken,
    ) -> Result<ScanReport, ScanFailure> {
        let started = Instant::now();
        let filename = input.filename().unwrap_or_default().trim().to_string();

        let checked = if filename.is_empty() {
            Err(ScanError::MissingFilename)
        } else {
            self.limits.check_filename(&filename)
        };
        if let Err(err) = checked {
            tracing::info!(filename = %filename, error = %err, "Upload rejected");
            return Err(ScanFailure::from_error(&err));
        }

        let data = match input.read_to_vec(self.limits.max_size).await {
            Ok(data) => data,
            Err(err) => {
                tracing::info!(filename = %filename, error = %err, "Upload rejected");
                return Err(ScanFailure::from_error(&err));
            }
        };

        let (stats, summary) = match self.orchestrator.run(&data, &filename, cancel).await {
            (ScanOutcome::Success(stats), Some(summary)) => (stats, summary),
            (outcome, _) => {
                let kind = outcome.failure_kind().unwrap_or(FailureKind::Transient);
                return Err(ScanFailure::new(kind));
            }
        };

        let explanation = explain_or_fallback(self.explainer.as_ref(), &stats).await;

        let report = ScanReport::new(
            &summary,
            filename,
            data.len() as u64,
            stats,
            explanation.text,
            started.elapsed(),
        )
        .with_fallback_explanation(explanation.fallback);

        audit::emit_scan_report(&report);
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::{MockProvider, MockResponse};
    use crate::core::{Explainer, ScanStatistics};
    use crate::manager::PollPolicy;
    use async_trait::async_trait;
    use std::time::Duration;

    #[derive(Debug)]
    struct Canned(&'static str);

    #[async_trait]
    impl Explainer for Canned {
        async fn explain(&self, _stats: &ScanStatistics) -> Result<String, ScanError> {
            Ok(self.0.to_string())
        }
    }

    #[derive(Debug)]
    struct Broken;

    #[async_trait]
    impl Explainer for Broken {
        async fn explain(&self, _stats: &ScanStatistics) -> Result<String, ScanError> {
            Err(ScanError::explanation_failed("HTTP 503"))
        }
    }

    fn service(provider: &Arc<MockProvider>, explainer: ArcExplainer) -> ScanService {
        let orchestrator = ScanOrchestrator::new(provider.clone(), PollPolicy::default());
        ScanService::new(orchestrator, explainer, UploadLimits::default())
    }

    #[tokio::test(start_paused = true)]
    async fn test_analyze_success() {
        let provider = Arc::new(MockProvider::completing(ScanStatistics::new(0, 0, 70, 2)));
        let service = service(&provider, Arc::new(Canned("Looks fine.")));

        let input = FileInput::from_bytes(b"hello".to_vec()).with_filename("hello.txt");
        let report = service.analyze(input).await.unwrap();

        assert_eq!(report.filename, "hello.txt");
        assert_eq!(report.size, 5);
        assert_eq!(report.stats.total(), 72);
        assert_eq!(report.explanation, "Looks fine.");
        assert!(!report.fallback_explanation);
        assert_eq!(report.job_id, "mock-analysis");
        assert_eq!(report.attempts, 1);
        assert!(report.submitted_at <= report.completed_at);
    }

    #[tokio::test(start_paused = true)]
    async fn test_analyze_uses_fallback_explanation() {
        let provider = Arc::new(MockProvider::completing(ScanStatistics::new(4, 0, 60, 6)));
        let service = service(&provider, Arc::new(Broken));

        let input = FileInput::from_bytes(b"MZ".to_vec()).with_filename("dropper.exe");
        let report = service.analyze(input).await.unwrap();

        assert!(report.fallback_explanation);
        assert_eq!(
            report.explanation,
            "Warning: 4 out of 70 security scanners flagged this file as potentially dangerous. Do not open this file."
        );
    }

    #[tokio::test]
    async fn test_oversized_upload_never_reaches_provider() {
        let provider = Arc::new(MockProvider::new());
        let orchestrator = ScanOrchestrator::new(provider.clone(), PollPolicy::default());
        let service =
            ScanService::without_explainer(orchestrator, UploadLimits::any_extension(8));

        let input = FileInput::from_bytes(vec![0u8; 9]).with_filename("big.bin");
        let failure = service.analyze(input).await.unwrap_err();

        assert_eq!(failure.kind, FailureKind::Rejected);
        assert!(failure.detail().unwrap().contains("exceeds maximum"));
        assert_eq!(provider.upload_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_filename_rejected_without_allow_list() {
        let provider = Arc::new(MockProvider::new());
        let orchestrator = ScanOrchestrator::new(provider.clone(), PollPolicy::default());
        let service =
            ScanService::without_explainer(orchestrator, UploadLimits::any_extension(1024));

        for input in [
            FileInput::from_bytes(b"data".to_vec()),
            FileInput::from_bytes(b"data".to_vec()).with_filename(""),
            FileInput::from_bytes(b"data".to_vec()).with_filename("   "),
        ] {
            let failure = service.analyze(input).await.unwrap_err();
            assert_eq!(failure.kind, FailureKind::Rejected);
            assert_eq!(failure.user_message(), "No file selected");
            assert_eq!(
                failure.to_response_json(),
                serde_json::json!({ "error": "No file selected" })
            );
        }

        assert_eq!(provider.upload_count(), 0);
    }

    #[test]
    fn test_failure_from_error() {
        let failure = ScanFailure::from_error(&ScanError::DisallowedExtension {
            extension: "iso".into(),
        });
        assert_eq!(failure.kind, FailureKind::Rejected);
        assert_eq!(failure.user_message(), "File was rejected");

        let failure = ScanFailure::from_error(&ScanError::timeout(15, Duration::from_secs(300)));
        assert_eq!(failure.kind, FailureKind::Timeout);
        assert_eq!(failure.user_message(), "Scan timed out");

        let failure = ScanFailure::from_error(&ScanError::transient("virustotal", "reset"));
        assert_eq!(failure.kind, FailureKind::Transient);
    }

    #[tokio::test]
    async fn test_disallowed_extension_rejected() {
        let provider = Arc::new(MockProvider::new());
        let service = service(&provider, Arc::new(StaticExplainer));

        let input = FileInput::from_bytes(b"\x89PNG".to_vec()).with_filename("cat.png");
        let failure = service.analyze(input).await.unwrap_err();

        assert_eq!(failure.kind, FailureKind::Rejected);
        assert_eq!(provider.upload_count(), 0);
    }

    #[tokio::test]
    async fn test_upload_failure_message() {
        let body = r#"API error: 401 Unauthorized {"code":"WrongCredentialsError"}"#;
        let provider = Arc::new(MockProvider::new().with_upload_failure(body));
        let service = service(&provider, Arc::new(StaticExplainer));

        let input = FileInput::from_bytes(b"x".to_vec()).with_filename("a.txt");
        let failure = service.analyze(input).await.unwrap_err();

        assert_eq!(failure.kind, FailureKind::Upload);
        assert_eq!(failure.user_message(), "Failed to upload file");
        assert_eq!(
            failure.to_response_json(),
            serde_json::json!({ "error": "Failed to upload file" })
        );
        assert!(!failure.to_string().contains("WrongCredentials"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_message() {
        let provider = Arc::new(MockProvider::new().with_response(MockResponse::queued()));
        let orchestrator =
            ScanOrchestrator::new(provider.clone(), PollPolicy::fixed(2, Duration::from_secs(5)));
        let service = ScanService::without_explainer(orchestrator, UploadLimits::default());

        let input = FileInput::from_bytes(b"x".to_vec()).with_filename("a.txt");
        let failure = service.analyze(input).await.unwrap_err();

        assert_eq!(failure.kind, FailureKind::Timeout);
        assert_eq!(failure.to_string(), "Scan timed out");
    }
}
