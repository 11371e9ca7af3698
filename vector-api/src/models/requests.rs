//! Request payloads for the two backend routes.
//!
//! Constructors enforce the local preconditions (non-empty text, positive
//! `top_k`), so a value of these types is always safe to send.

use std::{fmt, num::NonZeroU64};

use serde::Serialize;

use crate::error_handler::ValidationError;

/// Maximum number of ranked results a search should return. Always >= 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TopK(NonZeroU64);

impl TopK {
    pub const DEFAULT: u64 = 5;

    /// # Errors
    /// [`ValidationError::ZeroTopK`] when `k == 0`.
    pub fn new(k: u64) -> Result<Self, ValidationError> {
        NonZeroU64::new(k).map(Self).ok_or(ValidationError::ZeroTopK)
    }

    pub fn get(self) -> u64 {
        self.0.get()
    }
}

impl Default for TopK {
    fn default() -> Self {
        Self(NonZeroU64::MIN.saturating_add(Self::DEFAULT - 1))
    }
}

impl fmt::Display for TopK {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Body of `POST /insert`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InsertRequest {
    text: String,
}

impl InsertRequest {
    /// Wraps `text` unchanged; whitespace-only input counts as empty.
    ///
    /// # Errors
    /// [`ValidationError::EmptyText`] for empty or blank text.
    pub fn new(text: impl Into<String>) -> Result<Self, ValidationError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(ValidationError::EmptyText);
        }
        Ok(Self { text })
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Body of `POST /search`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchQuery {
    query_text: String,
    top_k: TopK,
}

impl SearchQuery {
    /// # Errors
    /// [`ValidationError::EmptyQuery`] for empty or blank query text.
    pub fn new(query_text: impl Into<String>, top_k: TopK) -> Result<Self, ValidationError> {
        let query_text = query_text.into();
        if query_text.trim().is_empty() {
            return Err(ValidationError::EmptyQuery);
        }
        Ok(Self { query_text, top_k })
    }

    pub fn query_text(&self) -> &str {
        &self.query_text
    }

    pub fn top_k(&self) -> TopK {
        self.top_k
    }
}
