//! Error taxonomy for the Meta-AI Orchestrator

use axum::http::StatusCode;
use thiserror::Error;

/// Main error type for the orchestrator
#[derive(Error, Debug)]
pub enum Error {
    /// Bad submission: unknown provider tag, missing required field, etc.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Task or agent id unknown.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Adapter's `initialize()` returned false: bad credential or
    /// unreachable endpoint. Raised at registration time.
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Provider tag not in the closed set accepted by the adapter factory.
    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    /// Adapter execution failed. `permanent` distinguishes a
    /// provider-signalled 4xx auth/validation failure (never retried) from
    /// a transient failure (timeout, network reset, 5xx) that is retried.
    #[error("Execution failed: {message}")]
    Execution { message: String, permanent: bool },

    /// Control API called before the orchestrator has finished starting.
    #[error("Service not ready")]
    ServiceNotReady,

    /// Operation exceeded its deadline.
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// Outbound HTTP call to a provider or MCP endpoint failed.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON (de)serialization failure.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Filesystem/config IO failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal invariant violation; should not normally surface to a client.
    #[error("Internal error: {0}")]
    Internal(String),

    /// Catch-all for errors crossing a process boundary.
    #[error("Unknown error: {0}")]
    Unknown(#[from] anyhow::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether the worker loop should retry the task that produced this
    /// error. Resolves the question of permanent vs transient provider
    /// failures: auth/validation-shaped failures never succeed on retry,
    /// so they are marked permanent at construction time.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Execution { permanent, .. } => !permanent,
            Error::Network(_) | Error::Timeout(_) => true,
            _ => false,
        }
    }

    /// HTTP status the Control API maps this error to.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Validation(_) | Error::UnknownProvider(_) | Error::ProviderUnavailable(_) => {
                StatusCode::BAD_REQUEST
            }
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::ServiceNotReady => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Severity bucket used when recording the error counter metric.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Error::ServiceNotReady | Error::ProviderUnavailable(_) => ErrorSeverity::Critical,
            Error::Execution { .. } | Error::UnknownProvider(_) => ErrorSeverity::High,
            Error::Timeout(_) | Error::Network(_) => ErrorSeverity::Medium,
            Error::Validation(_) | Error::NotFound(_) => ErrorSeverity::Low,
            _ => ErrorSeverity::Medium,
        }
    }

    pub fn execution(message: impl Into<String>) -> Self {
        Error::Execution {
            message: message.into(),
            permanent: false,
        }
    }

    pub fn execution_permanent(message: impl Into<String>) -> Self {
        Error::Execution {
            message: message.into(),
            permanent: true,
        }
    }

    /// Build an `Execution` error from a provider's non-2xx HTTP
    /// response, classifying it permanent/transient per the spec's
    /// retry-classification resolution: a 4xx (auth, bad request,
    /// validation) will never succeed on retry, a 5xx might.
    pub fn from_status(provider: &str, status: reqwest::StatusCode, body: &str) -> Self {
        let message = format!("{provider} API error: {status} - {body}");
        if status.is_client_error() {
            Error::execution_permanent(message)
        } else {
            Error::execution(message)
        }
    }
}

/// Error severity levels, used as a Prometheus label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}
