use std::time::Duration;

use crate::models::requests::TopK;

/// Configuration for talking to the embedding store backend.
///
/// # Fields
///
/// - `endpoint`: Base URL of the backend (e.g., `http://localhost:8080`).
/// - `timeout`: Per-request timeout; exceeding it is a transport failure.
/// - `default_top_k`: `top_k` used when a search does not specify one.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use vector_api::{ClientConfig, TopK};
///
/// let cfg = ClientConfig {
///     endpoint: "http://localhost:8080".to_string(),
///     timeout: Duration::from_secs(30),
///     default_top_k: TopK::default(),
/// };
/// assert_eq!(cfg.default_top_k.get(), 5);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Backend base URL, without a trailing route.
    pub endpoint: String,

    /// Request timeout applied to every call.
    pub timeout: Duration,

    /// Default number of neighbours requested by a search.
    pub default_top_k: TopK,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8080".to_string(),
            timeout: Duration::from_secs(30),
            default_top_k: TopK::default(),
        }
    }
}
