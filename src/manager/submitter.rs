//! File submission.

use crate::core::{ArcProvider, ScanError, ScanJob};

/// Uploads file bytes to the provider and obtains a [`ScanJob`].
///
/// Single-shot: one outbound request, no retries. The filename is passed
/// through unmodified, even when empty; validating it is the caller's job.
#[derive(Debug, Clone)]
pub struct ScanSubmitter {
    provider: ArcProvider,
}

impl ScanSubmitter {
    /// Creates a submitter for the given provider.
    pub fn new(provider: ArcProvider) -> Self {
        Self { provider }
    }

    /// Submits the file.
    ///
    /// # Errors
    ///
    /// Always `ScanError::UploadFailed`: any other error coming out of the
    /// provider is folded into it so the failure stays a reported value
    /// of a single kind.
    pub async fn submit(&self, data: &[u8], filename: &str) -> Result<ScanJob, ScanError> {
        let provider = self.provider.name();

        tracing::debug!(
            provider = %provider,
            filename = %filename,
            size = data.len(),
            "Uploading file"
        );

        match self.provider.upload(data, filename).await {
            Ok(job_id) => {
                let job = ScanJob::new(job_id);
                tracing::info!(
                    provider = %provider,
                    job_id = %job.job_id,
                    filename = %filename,
                    "File submitted"
                );
                Ok(job)
            }
            Err(err) => {
                tracing::warn!(
                    provider = %provider,
                    filename = %filename,
                    error = %err,
                    "Upload failed"
                );
                Err(match err {
                    err @ ScanError::UploadFailed { .. } => err,
                    other => ScanError::upload_failed(provider, other.to_string()),
                })
            }
        }
    }
}
