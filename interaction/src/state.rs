use std::{cell::Ref, ops::Deref};

use vector_api::{FailureKind, Record, VectorApiError};

/// Which user operation a status or notice belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Insert,
    Search,
}

/// A failure surfaced to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub operation: Operation,
    pub kind: FailureKind,
    pub message: String,
}

impl Notice {
    pub(crate) fn from_error(operation: Operation, err: &VectorApiError) -> Self {
        Self {
            operation,
            kind: err.kind(),
            message: err.user_message(),
        }
    }
}

/// Drafts, results and notices rendered by the presentation layer.
///
/// Only [`Session`](crate::Session) mutates it. Busy flags live on the session
/// and are joined in by [`StateView`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InteractionState {
    pub(crate) draft_text: String,
    pub(crate) draft_query: String,
    pub(crate) results: Vec<Record>,
    pub(crate) insert_notice: Option<Notice>,
    pub(crate) search_notice: Option<Notice>,
}

impl InteractionState {
    pub fn draft_text(&self) -> &str {
        &self.draft_text
    }

    pub fn draft_query(&self) -> &str {
        &self.draft_query
    }

    /// Last successful search result, in backend order.
    pub fn results(&self) -> &[Record] {
        &self.results
    }

    pub fn notice(&self, operation: Operation) -> Option<&Notice> {
        match operation {
            Operation::Insert => self.insert_notice.as_ref(),
            Operation::Search => self.search_notice.as_ref(),
        }
    }

    pub(crate) fn set_notice(&mut self, operation: Operation, notice: Option<Notice>) {
        match operation {
            Operation::Insert => self.insert_notice = notice,
            Operation::Search => self.search_notice = notice,
        }
    }
}

/// Read guard over [`InteractionState`] plus the busy flags at the time the
/// view was taken.
pub struct StateView<'a> {
    state: Ref<'a, InteractionState>,
    insert_busy: bool,
    search_busy: bool,
}

impl<'a> StateView<'a> {
    pub(crate) fn new(
        state: Ref<'a, InteractionState>,
        insert_busy: bool,
        search_busy: bool,
    ) -> Self {
        Self {
            state,
            insert_busy,
            search_busy,
        }
    }

    pub fn insert_busy(&self) -> bool {
        self.insert_busy
    }

    pub fn search_busy(&self) -> bool {
        self.search_busy
    }

    /// True while any operation is in flight.
    pub fn busy(&self) -> bool {
        self.insert_busy || self.search_busy
    }
}

impl Deref for StateView<'_> {
    type Target = InteractionState;

    fn deref(&self) -> &InteractionState {
        &self.state
    }
}
