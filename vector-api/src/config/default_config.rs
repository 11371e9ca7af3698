//! Client config loaded from environment variables.
//!
//! # Environment variables
//!
//! - `VECTOR_API_URL`          = backend base URL (takes precedence)
//! - `VECTOR_API_PORT`         = port, used as `http://localhost:{port}` when the URL is unset
//! - `VECTOR_API_TIMEOUT_SECS` = request timeout in seconds (default 30)
//! - `SEARCH_TOP_K`            = default search `top_k` (default 5)
//!
//! Nothing is mandatory: with an empty environment the client targets
//! `http://localhost:8080` with a 30 second timeout and `top_k = 5`.

use std::time::Duration;

use tracing::debug;

use crate::{
    config::client_config::ClientConfig,
    error_handler::{
        ConfigError, Result, VectorApiError, lookup_non_empty, lookup_opt_u64,
        validate_http_endpoint,
    },
    models::requests::TopK,
};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

impl ClientConfig {
    /// Builds the config from the process environment.
    ///
    /// # Errors
    /// See [`ClientConfig::from_lookup`].
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup.
    ///
    /// # Errors
    /// - [`ConfigError::InvalidFormat`] if the URL lacks an http(s) scheme
    /// - [`ConfigError::InvalidNumber`] if a numeric variable does not parse
    /// - [`ConfigError::OutOfRange`] for a zero port, timeout or `top_k`
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let endpoint = resolve_endpoint(&lookup)?;

        let timeout_secs =
            lookup_opt_u64(&lookup, "VECTOR_API_TIMEOUT_SECS")?.unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(ConfigError::OutOfRange {
                field: "VECTOR_API_TIMEOUT_SECS",
                detail: "expected at least 1 second",
            }
            .into());
        }

        let default_top_k = match lookup_opt_u64(&lookup, "SEARCH_TOP_K")? {
            Some(k) => TopK::new(k).map_err(|_| ConfigError::OutOfRange {
                field: "SEARCH_TOP_K",
                detail: "expected a positive integer",
            })?,
            None => TopK::default(),
        };

        debug!(
            %endpoint,
            timeout_secs,
            top_k = default_top_k.get(),
            "client config resolved"
        );

        Ok(Self {
            endpoint,
            timeout: Duration::from_secs(timeout_secs),
            default_top_k,
        })
    }
}

/// Resolves the backend endpoint.
///
/// Precedence:
/// 1. `VECTOR_API_URL` if present and non-empty
/// 2. `VECTOR_API_PORT` → `http://localhost:{port}`
/// 3. `http://localhost:8080`
fn resolve_endpoint<F>(lookup: &F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup_non_empty(lookup, "VECTOR_API_URL") {
        validate_http_endpoint("VECTOR_API_URL", &url)?;
        return Ok(url.trim_end_matches('/').to_string());
    }

    let port = match lookup_non_empty(lookup, "VECTOR_API_PORT") {
        Some(port) => port.parse::<u16>().map_err(|_| {
            VectorApiError::from(ConfigError::InvalidNumber {
                var: "VECTOR_API_PORT",
                reason: "expected u16 (1..=65535)",
            })
        })?,
        None => DEFAULT_PORT,
    };
    if port == 0 {
        return Err(ConfigError::OutOfRange {
            field: "VECTOR_API_PORT",
            detail: "expected a port in 1..=65535",
        }
        .into());
    }

    Ok(format!("http://localhost:{port}"))
}
