//! Unified error handling for `vector-api`.
//!
//! This module exposes a single top-level error type [`VectorApiError`] for the
//! whole library, and groups domain-specific errors in nested enums
//! ([`ConfigError`], [`ValidationError`]). Every error can be classified into a
//! [`FailureKind`] so callers can show the user a message that separates
//! "could not reach server" from "request rejected".
//!
//! All messages include the suffix `[Vector API]` to simplify attribution in logs.

use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;

/* ------------------------------------------------------------------------- */
/* Public result alias                                                       */
/* ------------------------------------------------------------------------- */

/// Unified result alias for the entire crate.
pub type Result<T> = std::result::Result<T, VectorApiError>;

/* ------------------------------------------------------------------------- */
/* Top-level error                                                           */
/* ------------------------------------------------------------------------- */

/// Top-level error for the `vector-api` crate.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum VectorApiError {
    /// Input rejected locally, before any network call.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Configuration/validation errors at startup.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Underlying HTTP transport error (connect refused, DNS, reset).
    #[error("[Vector API] transport error: {0}")]
    Transport(String),

    /// Request exceeded the configured timeout.
    #[error("[Vector API] request timed out after {0:?}")]
    Timeout(Duration),

    /// Backend answered with a non-2xx status.
    #[error("[Vector API] HTTP {status} from {url}: {snippet}")]
    HttpStatus {
        /// Numeric HTTP status code.
        status: StatusCode,
        /// Request URL.
        url: String,
        /// Short snippet of the response body (trimmed).
        snippet: String,
    },

    /// A 2xx payload could not be decoded as expected.
    #[error("[Vector API] decode error: {0}")]
    Decode(String),
}

/// Coarse classification used for user-facing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Local validation failed; nothing was sent.
    Invalid,
    /// The server could not be reached (network error or timeout).
    Unreachable,
    /// The server answered and refused the request (non-2xx).
    Rejected,
    /// The server answered 2xx with a payload we could not understand.
    Malformed,
}

impl VectorApiError {
    /// Maps a `reqwest` transport error, keeping timeouts distinct.
    pub(crate) fn from_transport(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            VectorApiError::Timeout(timeout)
        } else {
            VectorApiError::Transport(err.to_string())
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            VectorApiError::Validation(_) | VectorApiError::Config(_) => FailureKind::Invalid,
            VectorApiError::Transport(_) | VectorApiError::Timeout(_) => FailureKind::Unreachable,
            VectorApiError::HttpStatus { .. } => FailureKind::Rejected,
            VectorApiError::Decode(_) => FailureKind::Malformed,
        }
    }

    /// Short message suitable for showing to an end user.
    pub fn user_message(&self) -> String {
        match self {
            VectorApiError::Validation(e) => e.to_string(),
            VectorApiError::Config(e) => e.to_string(),
            VectorApiError::Transport(_) => "could not reach server".to_string(),
            VectorApiError::Timeout(after) => {
                format!("could not reach server (no answer after {}s)", after.as_secs_f32())
            }
            VectorApiError::HttpStatus { status, .. } => {
                format!("request rejected by server (HTTP {})", status.as_u16())
            }
            VectorApiError::Decode(_) => "unexpected response from server".to_string(),
        }
    }
}

/* ------------------------------------------------------------------------- */
/* Validation errors                                                         */
/* ------------------------------------------------------------------------- */

/// Input problems detected before a request is built.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Text to store was empty or whitespace only.
    #[error("text to insert must not be empty")]
    EmptyText,

    /// Search query was empty or whitespace only.
    #[error("search query must not be empty")]
    EmptyQuery,

    /// `top_k` must be at least 1.
    #[error("top_k must be a positive integer")]
    ZeroTopK,
}

/* ------------------------------------------------------------------------- */
/* Config errors                                                             */
/* ------------------------------------------------------------------------- */

/// Error enum for environment/config-driven setup.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A number failed to parse (ports, limits, timeouts).
    #[error("[Vector API] invalid number in {var}: {reason}")]
    InvalidNumber {
        /// Variable name (e.g., `VECTOR_API_PORT`).
        var: &'static str,
        /// Human-readable reason (e.g., `expected u16`).
        reason: &'static str,
    },

    /// Value had the wrong format (e.g., invalid URL).
    #[error("[Vector API] invalid format in {var}: {reason}")]
    InvalidFormat {
        /// Variable name (e.g., `VECTOR_API_URL`).
        var: &'static str,
        /// Explanation (e.g., `must start with http:// or https://`).
        reason: &'static str,
    },

    /// A numeric field was outside of the allowed range.
    #[error("[Vector API] {field} is out of range: {detail}")]
    OutOfRange {
        /// Field name (e.g., `SEARCH_TOP_K`).
        field: &'static str,
        /// Description of the expected range.
        detail: &'static str,
    },

    /// The HTTP client could not be constructed.
    #[error("[Vector API] failed to build HTTP client: {0}")]
    HttpClient(String),
}

/* ------------------------------------------------------------------------- */
/* Env helpers                                                               */
/* ------------------------------------------------------------------------- */

/// Returns a trimmed, non-empty value for `name` from `lookup`.
pub(crate) fn lookup_non_empty<F>(lookup: &F, name: &'static str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parses an optional `u64` (`Ok(None)` if unset/empty).
///
/// # Errors
/// Returns [`ConfigError::InvalidNumber`] if the variable is set but not a valid `u64`.
pub(crate) fn lookup_opt_u64<F>(lookup: &F, name: &'static str) -> Result<Option<u64>>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup_non_empty(lookup, name) {
        Some(v) => v.parse::<u64>().map(Some).map_err(|_| {
            VectorApiError::from(ConfigError::InvalidNumber {
                var: name,
                reason: "expected u64",
            })
        }),
        None => Ok(None),
    }
}

/* ------------------------------------------------------------------------- */
/* Validation helpers                                                        */
/* ------------------------------------------------------------------------- */

/// Validates that an HTTP endpoint starts with `http://` or `https://`.
///
/// # Errors
/// Returns [`ConfigError::InvalidFormat`] when the scheme is missing.
pub fn validate_http_endpoint(var: &'static str, value: &str) -> Result<()> {
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::InvalidFormat {
            var,
            reason: "must start with http:// or https://",
        }
        .into())
    }
}

/// Trims a response body into a single-line snippet for error messages.
pub(crate) fn make_snippet(body: &str) -> String {
    let flat = body.split_whitespace().collect::<Vec<_>>().join(" ");
    flat.chars().take(240).collect()
}
