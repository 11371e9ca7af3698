use std::{future::Future, pin::Pin};

use crate::{
    error_handler::Result,
    models::{
        record::Record,
        requests::{InsertRequest, SearchQuery},
    },
};

/// Boxed future returned by [`VectorBackend`] calls.
pub type BackendFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// The two operations the embedding store exposes.
///
/// Implemented over HTTP by
/// [`VectorApiService`](crate::services::vector_api_service::VectorApiService);
/// implement it yourself to plug in another transport or a scripted fake.
pub trait VectorBackend: Send + Sync {
    /// Stores a text. The backend computes and persists its embedding.
    fn insert<'a>(&'a self, request: &'a InsertRequest) -> BackendFuture<'a, ()>;

    /// Returns up to `top_k` records, most similar first.
    fn search<'a>(&'a self, query: &'a SearchQuery) -> BackendFuture<'a, Vec<Record>>;
}
