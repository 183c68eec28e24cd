//! VirusTotal analysis provider.
//!
//! Uses the VirusTotal v3 API:
//! 1. `POST /files` uploads the file (multipart `file` field) and returns
//!    an analysis id.
//! 2. `GET /analyses/{id}` returns the analysis status and statistics.
//!
//! The API key travels in the `x-apikey` header and is never logged.

use crate::core::{AnalysisProvider, RawAnalysis, ScanError};

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;

const PROVIDER: &str = "virustotal";

/// Default VirusTotal API base URL.
pub const DEFAULT_BASE_URL: &str = "https://www.virustotal.com/api/v3";

/// VirusTotal provider configuration.
#[derive(Debug, Clone)]
pub struct VirusTotalConfig {
    /// API key (kept secret).
    pub api_key: SecretString,

    /// Base URL for the API.
    pub base_url: String,

    /// Per-request timeout.
    pub timeout: Duration,
}

impl VirusTotalConfig {
    /// Creates a new configuration with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::from_secret(SecretString::new(api_key.into().into()))
    }

    /// Creates a new configuration from an already-wrapped key.
    pub fn from_secret(api_key: SecretString) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(60),
        }
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Sets the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Deserialize)]
struct UploadEnvelope {
    data: UploadData,
}

#[derive(Debug, Deserialize)]
struct UploadData {
    id: String,
}

#[derive(Debug, Deserialize)]
struct AnalysisEnvelope {
    data: AnalysisData,
}

#[derive(Debug, Deserialize)]
struct AnalysisData {
    attributes: RawAnalysis,
}

/// VirusTotal provider implementation.
///
/// Holds one `reqwest::Client`, so connections to the API are pooled
/// across scans. Cheap to share behind an `Arc`.
///
/// # Example
///
/// ```rust,ignore
/// use scanlens::backends::{VirusTotalConfig, VirusTotalProvider};
///
/// let provider = VirusTotalProvider::new(VirusTotalConfig::new("your-api-key"))?;
/// ```
#[derive(Debug)]
pub struct VirusTotalProvider {
    config: VirusTotalConfig,
    client: reqwest::Client,
}

impl VirusTotalProvider {
    /// Creates a new VirusTotal provider with the given configuration.
    pub fn new(config: VirusTotalConfig) -> Result<Self, ScanError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ScanError::configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &VirusTotalConfig {
        &self.config
    }

    fn files_url(&self) -> String {
        format!("{}/files", self.config.base_url)
    }

    fn analysis_url(&self, job_id: &str) -> String {
        format!("{}/analyses/{}", self.config.base_url, job_id)
    }
}

#[async_trait]
impl AnalysisProvider for VirusTotalProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn upload(&self, data: &[u8], filename: &str) -> Result<String, ScanError> {
        let part = reqwest::multipart::Part::bytes(data.to_vec()).file_name(filename.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(self.files_url())
            .header("x-apikey", self.config.api_key.expose_secret())
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                ScanError::upload_failed(PROVIDER, format!("request failed: {}", e.without_url()))
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScanError::upload_failed(
                PROVIDER,
                format!("API error: {}", status),
            ));
        }

        let body: UploadEnvelope = response
            .json()
            .await
            .map_err(|e| {
                ScanError::upload_failed(
                    PROVIDER,
                    format!("unreadable response: {}", e.without_url()),
                )
            })?;

        if body.data.id.is_empty() {
            return Err(ScanError::upload_failed(PROVIDER, "empty analysis id"));
        }

        Ok(body.data.id)
    }

    async fn fetch_analysis(&self, job_id: &str) -> Result<RawAnalysis, ScanError> {
        let response = self
            .client
            .get(self.analysis_url(job_id))
            .header("x-apikey", self.config.api_key.expose_secret())
            .send()
            .await
            .map_err(|e| {
                ScanError::transient(PROVIDER, format!("request failed: {}", e.without_url()))
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScanError::transient(PROVIDER, format!("API error: {}", status)));
        }

        let body: AnalysisEnvelope = response
            .json()
            .await
            .map_err(|e| {
                ScanError::transient(PROVIDER, format!("unreadable response: {}", e.without_url()))
            })?;

        Ok(body.data.attributes)
    }
}
