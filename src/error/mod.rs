//! Error types for azure-deploy.

pub mod unified;

pub use unified::{ErrorCategory, RecoverySuggestion};

use thiserror::Error;

/// Primary error type for all provider operations.
#[derive(Error, Debug)]
pub enum AzureError {
    #[error("Unsupported Azure deployment: {0}")]
    UnsupportedModel(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Missing dependency: {0}")]
    DependencyMissing(String),

    #[error("Azure OpenAI API error for model {model}: {source}")]
    ProviderCallFailed {
        model: String,
        #[source]
        source: Box<AzureError>,
    },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Rate limited: retry after {retry_after_ms:?}ms")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("Stream error: {0}")]
    Stream(String),
}

impl AzureError {
    /// Create an API error.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Wrap a call-boundary failure for `model`.
    ///
    /// Already-wrapped errors are passed through so the cause chain stays one
    /// level deep.
    pub fn call_failed(model: impl Into<String>, cause: AzureError) -> Self {
        match cause {
            wrapped @ Self::ProviderCallFailed { .. } => wrapped,
            cause => Self::ProviderCallFailed {
                model: model.into(),
                source: Box::new(cause),
            },
        }
    }

    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::UnsupportedModel(_) | Self::InvalidParameter(_) => ErrorCategory::Validation,
            Self::DependencyMissing(_) | Self::Configuration(_) => ErrorCategory::Configuration,
            Self::ProviderCallFailed { source, .. } => source.category(),
            Self::Authentication(_) => ErrorCategory::Authentication,
            Self::RateLimited { .. } => ErrorCategory::RateLimit,
            Self::Network(e) if e.is_timeout() => ErrorCategory::Timeout,
            Self::Network(_) => ErrorCategory::Network,
            Self::Serialization(_) => ErrorCategory::Serialization,
            Self::Api { status, .. } => match status {
                401 | 403 => ErrorCategory::Authentication,
                429 => ErrorCategory::RateLimit,
                500..=599 => ErrorCategory::Server,
                _ => ErrorCategory::Api,
            },
            _ => ErrorCategory::Unknown,
        }
    }

    /// Whether a caller-level retry could plausibly succeed.
    ///
    /// Nothing in this crate retries; the hint is for callers that do.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::RateLimit
                | ErrorCategory::Network
                | ErrorCategory::Timeout
                | ErrorCategory::Server
        )
    }

    /// Suggest recovery actions.
    pub fn recovery_suggestion(&self) -> RecoverySuggestion {
        match self.category() {
            ErrorCategory::Validation => RecoverySuggestion::FixRequest,
            ErrorCategory::Authentication => RecoverySuggestion::CheckCredentials,
            ErrorCategory::RateLimit => RecoverySuggestion::RetryWithBackoff,
            ErrorCategory::Network => RecoverySuggestion::RetryWithBackoff,
            ErrorCategory::Timeout => RecoverySuggestion::IncreaseTimeout,
            ErrorCategory::Server => RecoverySuggestion::RetryWithBackoff,
            ErrorCategory::Configuration => RecoverySuggestion::CheckConfiguration,
            _ => RecoverySuggestion::ContactSupport,
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, AzureError>;
