//! Natural-language explanations of scan statistics.
//!
//! - [`fallback`] - the deterministic static explanation
//! - [`gemini`] - Gemini-backed explainer (requires `gemini` feature)

pub mod fallback;

#[cfg(feature = "gemini")]
pub mod gemini;

pub use fallback::{fallback_explanation, StaticExplainer};

#[cfg(feature = "gemini")]
pub use gemini::{GeminiConfig, GeminiExplainer};

use crate::core::{Explainer, ScanStatistics};

/// An explanation and whether it came from the static fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Explanation {
    /// The text shown to the user.
    pub text: String,
    /// `true` if the explainer failed and the fallback was used.
    pub fallback: bool,
}

/// Asks the explainer, falling back to [`fallback_explanation`] on any error.
pub async fn explain_or_fallback(explainer: &dyn Explainer, stats: &ScanStatistics) -> Explanation {
    match explainer.explain(stats).await {
        Ok(text) => Explanation {
            text,
            fallback: false,
        },
        Err(err) => {
            tracing::warn!(error = %err, "Explanation failed, using fallback");
            Explanation {
                text: fallback_explanation(stats),
                fallback: true,
            }
        }
    }
}
