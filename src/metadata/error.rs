//! Error taxonomy for the TMDB access layer.
//!
//! Every layer above the API client propagates [`TmdbError`] unchanged; the
//! only place a failure is swallowed is the batch detail fetch, which logs
//! and skips the failing id.

/// Unified error type for upstream access, decoding and caller validation.
#[derive(Debug, thiserror::Error)]
pub enum TmdbError {
    /// Required configuration (credential, base URL) is missing or invalid.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Transport-level failure (DNS, TCP, TLS, timeout) after retries ran out.
    #[error("Failed to connect to TMDB API: {source}")]
    Connectivity {
        /// The underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// The upstream rejected the credential (HTTP 401).
    #[error("TMDB API key is invalid or expired")]
    Unauthorized,

    /// The requested resource does not exist upstream (HTTP 404).
    #[error("Resource not found on TMDB: {endpoint}")]
    NotFound {
        /// Endpoint that returned 404.
        endpoint: String,
    },

    /// The upstream quota was exceeded (HTTP 429); callers should back off.
    #[error("TMDB rate limit exceeded, try again later")]
    RateLimited,

    /// The upstream failed internally (HTTP 5xx).
    #[error("TMDB server error ({status}): {message}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Upstream `status_message`, if any.
        message: String,
    },

    /// Any other non-success response.
    #[error("TMDB error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Upstream `status_message`, if any.
        message: String,
    },

    /// A 2xx body could not be decoded into the expected shape.
    #[error("Failed to decode TMDB response from {endpoint}: {message}")]
    Decode {
        /// Endpoint whose payload failed to decode.
        endpoint: String,
        /// Decoder error description.
        message: String,
    },

    /// Caller input rejected before any upstream call was made.
    #[error("Validation error: {0}")]
    Validation(String),
}

impl TmdbError {
    /// Classify a non-success upstream response.
    pub fn from_status(status: u16, endpoint: &str, message: String) -> Self {
        match status {
            401 => TmdbError::Unauthorized,
            404 => TmdbError::NotFound {
                endpoint: endpoint.to_string(),
            },
            429 => TmdbError::RateLimited,
            500..=599 => TmdbError::Server { status, message },
            _ => TmdbError::Api { status, message },
        }
    }

    /// Map this error to the HTTP status an outer web layer should return.
    pub fn http_status(&self) -> u16 {
        match self {
            TmdbError::Configuration(_) => 500,
            TmdbError::Connectivity { .. } => 500,
            TmdbError::Unauthorized => 401,
            TmdbError::NotFound { .. } => 404,
            TmdbError::RateLimited => 429,
            TmdbError::Server { .. } => 500,
            TmdbError::Api { status, .. } if (400..500).contains(status) => *status,
            TmdbError::Api { .. } => 502,
            TmdbError::Decode { .. } => 502,
            TmdbError::Validation(_) => 400,
        }
    }

    /// Whether retrying the same call later may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            TmdbError::Connectivity { .. } | TmdbError::RateLimited | TmdbError::Server { .. }
        )
    }

    /// Convenience constructor for [`TmdbError::Validation`].
    pub fn validation(message: impl Into<String>) -> Self {
        TmdbError::Validation(message.into())
    }
}

/// Result alias using [`TmdbError`].
pub type Result<T> = std::result::Result<T, TmdbError>;
