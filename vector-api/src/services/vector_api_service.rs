//! Thin HTTP client for the embedding store.
//!
//! Routes:
//! - `POST {endpoint}/insert`: `{ "text": ... }`, any 2xx is success, body ignored
//! - `POST {endpoint}/search`: `{ "query_text": ..., "top_k": ... }`, 2xx with a JSON
//!   array of records ordered by similarity (a `null` body means no matches)
//!
//! # Examples
//!
//! ```no_run
//! use vector_api::{ClientConfig, InsertRequest, SearchQuery, TopK, VectorApiService, VectorBackend};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let svc = VectorApiService::new(ClientConfig::default())?;
//!
//! svc.insert(&InsertRequest::new("Ferris is a friendly crab.")?).await?;
//!
//! let hits = svc.search(&SearchQuery::new("crab", TopK::default())?).await?;
//! for hit in &hits {
//!     println!("{} {}", hit.id, hit.text);
//! }
//! # Ok(()) }
//! ```

use std::time::{Duration, Instant};

use reqwest::Response;
use tracing::{debug, instrument, warn};

use crate::{
    backend::{BackendFuture, VectorBackend},
    config::client_config::ClientConfig,
    error_handler::{ConfigError, Result, VectorApiError, make_snippet, validate_http_endpoint},
    models::{
        record::Record,
        requests::{InsertRequest, SearchQuery},
    },
};

/// HTTP implementation of [`VectorBackend`].
///
/// Reuses one `reqwest::Client` configured with the request timeout.
#[derive(Debug, Clone)]
pub struct VectorApiService {
    client: reqwest::Client,
    timeout: Duration,
    url_insert: String,
    url_search: String,
}

impl VectorApiService {
    /// Creates a new [`VectorApiService`] from the given config.
    ///
    /// # Errors
    /// - [`ConfigError::InvalidFormat`] if `cfg.endpoint` is not an http(s) URL
    /// - [`ConfigError::HttpClient`] if the HTTP client cannot be built
    pub fn new(cfg: ClientConfig) -> Result<Self> {
        let endpoint = cfg.endpoint.trim();
        validate_http_endpoint("endpoint", endpoint)?;

        let client = reqwest::Client::builder()
            .timeout(cfg.timeout)
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        let base = endpoint.trim_end_matches('/');

        Ok(Self {
            client,
            timeout: cfg.timeout,
            url_insert: format!("{base}/insert"),
            url_search: format!("{base}/search"),
        })
    }

    #[instrument(skip_all, fields(chars = request.text().chars().count()))]
    async fn post_insert(&self, request: &InsertRequest) -> Result<()> {
        let start = Instant::now();
        debug!("POST {}", self.url_insert);

        let resp = self
            .client
            .post(&self.url_insert)
            .json(request)
            .send()
            .await
            .map_err(|e| VectorApiError::from_transport(e, self.timeout))?;

        let resp = ensure_success(resp, &self.url_insert).await?;
        debug!(
            status = %resp.status(),
            latency_ms = start.elapsed().as_millis(),
            "insert acknowledged"
        );
        Ok(())
    }

    #[instrument(skip_all, fields(top_k = query.top_k().get()))]
    async fn post_search(&self, query: &SearchQuery) -> Result<Vec<Record>> {
        let start = Instant::now();
        debug!("POST {}", self.url_search);

        let resp = self
            .client
            .post(&self.url_search)
            .json(query)
            .send()
            .await
            .map_err(|e| VectorApiError::from_transport(e, self.timeout))?;

        let resp = ensure_success(resp, &self.url_search).await?;

        let body = resp
            .bytes()
            .await
            .map_err(|e| VectorApiError::from_transport(e, self.timeout))?;

        let records = serde_json::from_slice::<Option<Vec<Record>>>(&body)
            .map_err(|e| {
                VectorApiError::Decode(format!(
                    "serde error: {e}; expected `[{{ id, text, embedding }}]`"
                ))
            })?
            .unwrap_or_default();

        debug!(
            hits = records.len(),
            latency_ms = start.elapsed().as_millis(),
            "search answered"
        );
        Ok(records)
    }
}

impl VectorBackend for VectorApiService {
    fn insert<'a>(&'a self, request: &'a InsertRequest) -> BackendFuture<'a, ()> {
        Box::pin(self.post_insert(request))
    }

    fn search<'a>(&'a self, query: &'a SearchQuery) -> BackendFuture<'a, Vec<Record>> {
        Box::pin(self.post_search(query))
    }
}

/// Turns a non-2xx response into [`VectorApiError::HttpStatus`].
async fn ensure_success(resp: Response, url: &str) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let text = resp.text().await.unwrap_or_default();
    let snippet = make_snippet(&text);
    warn!(%url, %status, %snippet, "backend returned non-success status");

    Err(VectorApiError::HttpStatus {
        status,
        url: url.to_string(),
        snippet,
    })
}
