//! HTTP client for a text-embedding store.
//!
//! The backend owns embedding generation, storage and similarity ranking; this
//! crate only validates input, sends the two requests and maps the answers
//! into typed results and errors.

pub mod backend;
pub mod config;
pub mod error_handler;
pub mod models;
pub mod services;
pub mod telemetry;

pub use backend::{BackendFuture, VectorBackend};
pub use config::client_config::ClientConfig;
pub use error_handler::{ConfigError, FailureKind, Result, ValidationError, VectorApiError};
pub use models::{
    record::Record,
    requests::{InsertRequest, SearchQuery, TopK},
};
pub use services::vector_api_service::VectorApiService;

pub use reqwest::StatusCode;
