use thiserror::Error;
use vector_api::{TopK, VectorApiError};

/// Errors that end the console session.
///
/// Failures of individual inserts/searches never show up here; they are
/// rendered and the loop keeps going.
#[derive(Debug, Error)]
pub enum ConsoleError {
    /// Config could not be loaded or the HTTP client could not be built.
    #[error(transparent)]
    Client(#[from] VectorApiError),

    #[error("failed to read input")]
    Input(#[source] std::io::Error),

    #[error("failed to write output")]
    Output(#[source] std::io::Error),
}

/// Handy result alias used across the console.
pub type ConsoleResult<T> = Result<T, ConsoleError>;

/// A line that could not be turned into a command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("unknown command `{0}` (type `help`)")]
    Unknown(String),

    #[error("`top` needs a number, e.g. `top {}`", TopK::DEFAULT)]
    MissingTopK,

    #[error("`{0}` is not a valid top_k (expected a positive integer)")]
    InvalidTopK(String),
}
