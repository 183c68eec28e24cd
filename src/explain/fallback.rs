//! Deterministic explanation used when the explanation service fails.

use crate::core::{Explainer, ScanError, ScanStatistics};

use async_trait::async_trait;

/// Builds the static explanation for the given statistics.
///
/// Never divides: a zero total gets its own sentence.
pub fn fallback_explanation(stats: &ScanStatistics) -> String {
    let total = stats.total();

    if stats.malicious > 0 {
        format!(
            "Warning: {} out of {} security scanners flagged this file as potentially dangerous. Do not open this file.",
            stats.malicious, total
        )
    } else if total == 0 {
        "No security scanners reported a result for this file, so its safety could not be determined.".to_string()
    } else {
        format!(
            "This file appears to be safe. {} security scanners found no threats.",
            total
        )
    }
}

/// An explainer that always returns [`fallback_explanation`].
///
/// Used when no explanation service is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticExplainer;

#[async_trait]
impl Explainer for StaticExplainer {
    async fn explain(&self, stats: &ScanStatistics) -> Result<String, ScanError> {
        Ok(fallback_explanation(stats))
    }
}
