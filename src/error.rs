//! Error taxonomy for a batch run.
//!
//! Every variant is fatal to the run it occurs in. Quality failures are only
//! raised as errors when the operator asks for a strict gate; otherwise the
//! validator result is persisted next to the report.

use thiserror::Error;

pub type Result<T, E = AnalysisError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Model key not present in the static catalog.
    #[error("Unknown model: {key}. Available models: {available}")]
    UnknownModel { key: String, available: String },

    /// Theme slug not present in the theme table.
    #[error("Theme config not found for slug: {slug}. Available themes: {available}")]
    UnknownTheme { slug: String, available: String },

    #[error("No API key configured. Set OPENROUTER_API_KEY (or AI_GATEWAY_API_KEY) or add it to {location}.")]
    MissingApiKey { location: String },

    /// Estimated prompt plus reserved output does not fit the model's context window.
    #[error(
        "Token budget exceeds the context window of {model}: required {required} tokens, limit {limit} tokens ({deficit} over).\n\
         Remediation:\n  \
         1. Reduce the number of sessions with --limit\n  \
         2. Use a larger-context model, e.g. --model=gemini-2.0-flash\n  \
         3. Enable automatic selection with --auto-model"
    )]
    ContextWindowExceeded {
        model: String,
        required: usize,
        limit: usize,
        deficit: usize,
    },

    /// Non-success HTTP status from the LLM backend.
    #[error("OpenRouter API error: {status} {body}")]
    Api { status: u16, body: String },

    #[error("API request timeout after {secs} seconds")]
    Timeout { secs: u64 },

    #[error("Invalid response structure from OpenRouter API: {0}")]
    MalformedResponse(String),

    #[error("Could not reach OpenRouter: {0}")]
    Transport(#[from] reqwest::Error),

    /// Zero sessions available where at least one is required.
    #[error("No sessions found for slug: {slug}")]
    NoSessions { slug: String },

    /// The generated report failed validation and the run was configured to stop on it.
    #[error("Report failed the quality check with {error_count} error(s): {summary}")]
    QualityGate { error_count: usize, summary: String },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl AnalysisError {
    pub(crate) fn io(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }

    pub(crate) fn csv(path: impl AsRef<std::path::Path>, source: csv::Error) -> Self {
        Self::Csv {
            path: path.as_ref().display().to_string(),
            source,
        }
    }

    /// Errors raised before any network traffic because the run is misconfigured.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::UnknownModel { .. } | Self::UnknownTheme { .. } | Self::MissingApiKey { .. }
        )
    }

    /// Errors originating from the LLM call itself.
    pub fn is_external_call(&self) -> bool {
        matches!(
            self,
            Self::Api { .. } | Self::Timeout { .. } | Self::MalformedResponse(_) | Self::Transport(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_window_message_includes_deficit_and_remediation() {
        let err = AnalysisError::ContextWindowExceeded {
            model: "google/gemini-2.0-flash-exp:free".to_string(),
            required: 1_004_001,
            limit: 1_000_000,
            deficit: 4_001,
        };
        let msg = err.to_string();
        assert!(msg.contains("4001 over"));
        assert!(msg.contains("--limit"));
        assert!(msg.contains("--auto-model"));
    }

    #[test]
    fn classification_helpers() {
        let unknown = AnalysisError::UnknownModel {
            key: "gpt-9".to_string(),
            available: String::new(),
        };
        assert!(unknown.is_configuration());
        assert!(!unknown.is_external_call());

        let timeout = AnalysisError::Timeout { secs: 120 };
        assert!(timeout.is_external_call());
        assert_eq!(timeout.to_string(), "API request timeout after 120 seconds");
    }
}
