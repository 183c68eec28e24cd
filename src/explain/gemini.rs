//! Gemini explanation provider.
//!
//! Calls `POST {base}/models/{model}:generateContent` with a short prompt
//! built from the statistics and returns the first candidate's text.

use crate::core::{Explainer, ScanError, ScanStatistics};

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default Gemini API base URL.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model.
pub const DEFAULT_MODEL: &str = "gemini-pro";

/// Gemini explainer configuration.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API key (kept secret).
    pub api_key: SecretString,

    /// Base URL for the API.
    pub base_url: String,

    /// Model name.
    pub model: String,

    /// Per-request timeout.
    pub timeout: Duration,
}

impl GeminiConfig {
    /// Creates a new configuration with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::from_secret(SecretString::new(api_key.into().into()))
    }

    /// Creates a new configuration from an already-wrapped key.
    pub fn from_secret(api_key: SecretString) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Sets the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f64,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl GenerateResponse {
    fn first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .filter_map(|c| c.content)
            .flat_map(|c| c.parts)
            .map(|p| p.text.trim().to_string())
            .find(|text| !text.is_empty())
    }
}

/// Builds the prompt sent to the model.
pub fn build_prompt(stats: &ScanStatistics) -> String {
    format!(
        "You are a cybersecurity assistant explaining file scan results to a non-technical user.\n\
         \n\
         Scan results from {total} antivirus engines:\n\
         - {malicious} engines flagged this file as malicious\n\
         - {suspicious} engines found it suspicious\n\
         - {harmless} engines found it safe\n\
         - {undetected} engines could not determine\n\
         \n\
         Write a 2-3 sentence explanation for a regular user. Be clear and direct.\n\
         If malicious > 0, warn them not to open the file.\n\
         If clean, reassure them briefly.\n\
         No technical jargon. No markdown formatting.",
        total = stats.total(),
        malicious = stats.malicious,
        suspicious = stats.suspicious,
        harmless = stats.harmless,
        undetected = stats.undetected,
    )
}

/// Explainer backed by the Gemini `generateContent` API.
#[derive(Debug)]
pub struct GeminiExplainer {
    config: GeminiConfig,
    client: reqwest::Client,
}

impl GeminiExplainer {
    /// Creates a new explainer with the given configuration.
    pub fn new(config: GeminiConfig) -> Result<Self, ScanError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ScanError::configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url, self.config.model
        )
    }
}

#[async_trait]
impl Explainer for GeminiExplainer {
    async fn explain(&self, stats: &ScanStatistics) -> Result<String, ScanError> {
        let request = GenerateRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: build_prompt(stats),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.4,
                max_output_tokens: 256,
            },
        };

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.config.api_key.expose_secret())])
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                ScanError::explanation_failed(format!("request failed: {}", e.without_url()))
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScanError::explanation_failed(format!("API error: {}", status)));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| {
                ScanError::explanation_failed(format!("unreadable response: {}", e.without_url()))
            })?;

        body.first_text()
            .ok_or_else(|| ScanError::explanation_failed("response contained no text"))
    }
}
