//! Process-wide configuration.
//!
//! Built once at startup with [`ScanConfig::from_env`] and handed to
//! [`ScanService::from_config`](crate::manager::ScanService::from_config).
//! Nothing in the scan path reads the environment afterwards.
//!
//! | Variable | Default |
//! |---|---|
//! | `VIRUSTOTAL_API_KEY` | required |
//! | `VIRUSTOTAL_BASE_URL` | `https://www.virustotal.com/api/v3` |
//! | `GEMINI_API_KEY` | unset: static explanations only |
//! | `GEMINI_BASE_URL` | `https://generativelanguage.googleapis.com/v1beta` |
//! | `GEMINI_MODEL` | `gemini-pro` |
//! | `SCAN_MAX_UPLOAD_BYTES` | 33554432 (32 MiB) |
//! | `SCAN_ALLOWED_EXTENSIONS` | `txt,pdf,js,html,css,py,exe,dll,zip` (empty allows all) |
//! | `SCAN_POLL_ATTEMPTS` | 15 |
//! | `SCAN_POLL_INTERVAL_SECS` | 20 |
//! | `SCAN_POLL_BACKOFF` | 1.0 |
//! | `SCAN_REQUEST_TIMEOUT_SECS` | 60 |

use crate::core::{ScanError, UploadLimits};
use crate::manager::PollPolicy;

use secrecy::SecretString;
use std::str::FromStr;
use std::time::Duration;

const VIRUSTOTAL_DEFAULT_BASE_URL: &str = "https://www.virustotal.com/api/v3";
const GEMINI_DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const GEMINI_DEFAULT_MODEL: &str = "gemini-pro";

/// Complete configuration for a scan service.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Credential for the scanning provider.
    pub virustotal_api_key: SecretString,

    /// Scanning provider base URL.
    pub virustotal_base_url: String,

    /// Credential for the explanation provider, if any.
    pub gemini_api_key: Option<SecretString>,

    /// Explanation provider base URL.
    pub gemini_base_url: String,

    /// Explanation model name.
    pub gemini_model: String,

    /// Upload size and extension limits.
    pub limits: UploadLimits,

    /// Poll budget.
    pub poll: PollPolicy,

    /// Per-request HTTP timeout.
    pub request_timeout: Duration,
}

impl ScanConfig {
    /// Creates a configuration with defaults and the given provider key.
    pub fn new(virustotal_api_key: impl Into<String>) -> Self {
        Self {
            virustotal_api_key: SecretString::new(virustotal_api_key.into().into()),
            virustotal_base_url: VIRUSTOTAL_DEFAULT_BASE_URL.to_string(),
            gemini_api_key: None,
            gemini_base_url: GEMINI_DEFAULT_BASE_URL.to_string(),
            gemini_model: GEMINI_DEFAULT_MODEL.to_string(),
            limits: UploadLimits::default(),
            poll: PollPolicy::default(),
            request_timeout: Duration::from_secs(60),
        }
    }

    /// Loads `.env` (if present) and reads the process environment.
    pub fn from_env() -> Result<Self, ScanError> {
        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!(path = %path.display(), "Loaded .env file"),
            Err(err) if err.not_found() => {}
            Err(err) => {
                return Err(ScanError::configuration(format!("invalid .env file: {}", err)));
            }
        }

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ScanError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let api_key = get("VIRUSTOTAL_API_KEY")
            .ok_or_else(|| ScanError::configuration("VIRUSTOTAL_API_KEY is not set"))?;
        let mut config = Self::new(api_key);

        if let Some(url) = get("VIRUSTOTAL_BASE_URL") {
            config.virustotal_base_url = url;
        }
        config.gemini_api_key = get("GEMINI_API_KEY").map(|key| SecretString::new(key.into()));
        if let Some(url) = get("GEMINI_BASE_URL") {
            config.gemini_base_url = url;
        }
        if let Some(model) = get("GEMINI_MODEL") {
            config.gemini_model = model;
        }

        if let Some(max) = parse::<u64>("SCAN_MAX_UPLOAD_BYTES", get("SCAN_MAX_UPLOAD_BYTES"))? {
            config.limits = config.limits.with_max_size(max);
        }
        // Present but empty means "allow all", so read it without the emptiness filter.
        if let Some(list) = lookup("SCAN_ALLOWED_EXTENSIONS") {
            config.limits = config.limits.with_allowed_extensions(list.split(','));
        }

        if let Some(attempts) = parse::<u32>("SCAN_POLL_ATTEMPTS", get("SCAN_POLL_ATTEMPTS"))? {
            config.poll = config.poll.with_max_attempts(attempts);
        }
        if let Some(secs) =
            parse::<u64>("SCAN_POLL_INTERVAL_SECS", get("SCAN_POLL_INTERVAL_SECS"))?
        {
            config.poll = config.poll.with_interval(Duration::from_secs(secs));
        }
        if let Some(factor) = parse::<f64>("SCAN_POLL_BACKOFF", get("SCAN_POLL_BACKOFF"))? {
            config.poll = config.poll.with_backoff_multiplier(factor);
        }
        if let Some(secs) =
            parse::<u64>("SCAN_REQUEST_TIMEOUT_SECS", get("SCAN_REQUEST_TIMEOUT_SECS"))?
        {
            config.request_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    /// Sets the explanation provider key.
    pub fn with_gemini_api_key(mut self, key: impl Into<String>) -> Self {
        self.gemini_api_key = Some(SecretString::new(key.into().into()));
        self
    }

    /// Sets the scanning provider base URL.
    pub fn with_virustotal_base_url(mut self, url: impl Into<String>) -> Self {
        self.virustotal_base_url = url.into();
        self
    }

    /// Sets the explanation provider base URL.
    pub fn with_gemini_base_url(mut self, url: impl Into<String>) -> Self {
        self.gemini_base_url = url.into();
        self
    }

    /// Sets the upload limits.
    pub fn with_limits(mut self, limits: UploadLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Sets the poll budget.
    pub fn with_poll(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }

    /// Sets the per-request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

fn parse<T: FromStr>(key: &str, value: Option<String>) -> Result<Option<T>, ScanError> {
    value
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|_| {
                    ScanError::configuration(format!("{} has invalid value '{}'", key, raw))
                })
        })
        .transpose()
}
