//! Session controller: the single writer of [`InteractionState`].
//!
//! Each operation goes `Idle → Busy → Idle`. The busy count is owned by an
//! `InFlight` guard over a `Cell`, so it is released on success, on failure
//! and when the operation future is dropped mid-flight, whatever borrows of
//! the state are alive at that moment.
//!
//! Searches are tagged with a monotonically increasing sequence number. Only
//! the completion carrying the latest issued number may touch `results` or the
//! search notice; older completions are logged and discarded.
//!
//! The session is meant for a single-threaded event loop: state sits in a
//! `RefCell` and no borrow is ever held across an `.await`.

use std::cell::{Cell, RefCell};

use tracing::{debug, info, warn};
use vector_api::{InsertRequest, SearchQuery, TopK, VectorApiError, VectorBackend};

use crate::state::{InteractionState, Notice, Operation, StateView};

/// How a search settled when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Results were replaced with `hits` records.
    Applied { seq: u64, hits: usize },
    /// A newer search was issued meanwhile; this answer was discarded.
    Superseded { seq: u64 },
}

/// Holds one unit of an in-flight counter until dropped.
struct InFlight<'s> {
    count: &'s Cell<usize>,
}

impl<'s> InFlight<'s> {
    fn begin(count: &'s Cell<usize>) -> Self {
        count.set(count.get() + 1);
        Self { count }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.count.set(self.count.get().saturating_sub(1));
    }
}

/// Owns the interaction state and drives insert/search against a backend.
pub struct Session<B> {
    backend: B,
    default_top_k: Cell<TopK>,
    inserts_in_flight: Cell<usize>,
    searches_in_flight: Cell<usize>,
    last_search_seq: Cell<u64>,
    state: RefCell<InteractionState>,
}

impl<B: VectorBackend> Session<B> {
    pub fn new(backend: B, default_top_k: TopK) -> Self {
        Self {
            backend,
            default_top_k: Cell::new(default_top_k),
            inserts_in_flight: Cell::new(0),
            searches_in_flight: Cell::new(0),
            last_search_seq: Cell::new(0),
            state: RefCell::new(InteractionState::default()),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Read access for rendering. Do not hold the view across an `.await`.
    pub fn state(&self) -> StateView<'_> {
        StateView::new(
            self.state.borrow(),
            self.inserts_in_flight.get() > 0,
            self.searches_in_flight.get() > 0,
        )
    }

    pub fn default_top_k(&self) -> TopK {
        self.default_top_k.get()
    }

    pub fn set_default_top_k(&self, top_k: TopK) {
        self.default_top_k.set(top_k);
    }

    /// Keystroke in the insert field.
    pub fn edit_draft_text(&self, text: impl Into<String>) {
        self.state.borrow_mut().draft_text = text.into();
    }

    /// Keystroke in the search field.
    pub fn edit_draft_query(&self, query: impl Into<String>) {
        self.state.borrow_mut().draft_query = query.into();
    }

    /// Replaces the draft text and submits it.
    pub async fn insert(&self, text: impl Into<String>) -> Result<(), VectorApiError> {
        self.edit_draft_text(text);
        self.submit_insert().await
    }

    /// Replaces the draft query and submits it.
    pub async fn search(
        &self,
        query: impl Into<String>,
        top_k: Option<TopK>,
    ) -> Result<SearchOutcome, VectorApiError> {
        self.edit_draft_query(query);
        self.submit_search(top_k).await
    }

    /// Sends the current draft text to the backend.
    ///
    /// Blank drafts are refused locally. On success the draft is cleared unless
    /// it was edited while the request was in flight; on failure it is kept.
    ///
    /// # Errors
    /// The validation or backend error, which is also recorded as the insert
    /// notice in the state.
    pub async fn submit_insert(&self) -> Result<(), VectorApiError> {
        let draft = self.state.borrow().draft_text.clone();
        let request = match InsertRequest::new(draft) {
            Ok(request) => request,
            Err(e) => return Err(self.refuse(Operation::Insert, e.into())),
        };

        self.state.borrow_mut().set_notice(Operation::Insert, None);
        let _guard = InFlight::begin(&self.inserts_in_flight);
        info!(chars = request.text().chars().count(), "insert submitted");

        let result = self.backend.insert(&request).await;

        let mut state = self.state.borrow_mut();
        match &result {
            Ok(()) => {
                if state.draft_text == request.text() {
                    state.draft_text.clear();
                }
                info!("insert stored");
            }
            Err(err) => {
                warn!(error = %err, "insert failed");
                let notice = Notice::from_error(Operation::Insert, err);
                state.set_notice(Operation::Insert, Some(notice));
            }
        }
        result
    }

    /// Sends the current draft query to the backend.
    ///
    /// `top_k` falls back to the session default. The returned records replace
    /// `results` verbatim, in backend order, only if no newer search was issued
    /// in the meantime. A failed search leaves `results` untouched.
    ///
    /// # Errors
    /// The validation or backend error of the latest search, which is also
    /// recorded as the search notice. Errors of superseded searches are
    /// discarded and reported as [`SearchOutcome::Superseded`].
    pub async fn submit_search(
        &self,
        top_k: Option<TopK>,
    ) -> Result<SearchOutcome, VectorApiError> {
        let draft = self.state.borrow().draft_query.clone();
        let top_k = top_k.unwrap_or_else(|| self.default_top_k.get());
        let query = match SearchQuery::new(draft, top_k) {
            Ok(query) => query,
            Err(e) => return Err(self.refuse(Operation::Search, e.into())),
        };

        self.state.borrow_mut().set_notice(Operation::Search, None);
        let _guard = InFlight::begin(&self.searches_in_flight);
        let seq = self.last_search_seq.get() + 1;
        self.last_search_seq.set(seq);
        info!(seq, top_k = top_k.get(), "search submitted");

        let result = self.backend.search(&query).await;

        let latest = self.last_search_seq.get();
        if seq != latest {
            debug!(
                seq,
                latest,
                ok = result.is_ok(),
                "discarding superseded search response"
            );
            return Ok(SearchOutcome::Superseded { seq });
        }

        let mut state = self.state.borrow_mut();
        match result {
            Ok(records) => {
                let hits = records.len();
                state.results = records;
                info!(seq, hits, "search applied");
                Ok(SearchOutcome::Applied { seq, hits })
            }
            Err(err) => {
                warn!(seq, error = %err, "search failed");
                state.set_notice(
                    Operation::Search,
                    Some(Notice::from_error(Operation::Search, &err)),
                );
                Err(err)
            }
        }
    }

    /// Records a local refusal; nothing is sent and busy is not touched.
    fn refuse(&self, op: Operation, err: VectorApiError) -> VectorApiError {
        debug!(operation = ?op, error = %err, "refused before sending");
        self.state
            .borrow_mut()
            .set_notice(op, Some(Notice::from_error(op, &err)));
        err
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::pin::pin;
    use std::sync::Mutex;

    use futures::poll;
    use tokio::sync::oneshot;
    use vector_api::{BackendFuture, FailureKind, Record, StatusCode, ValidationError};

    use super::*;

    type Reply<T> = oneshot::Sender<vector_api::Result<T>>;

    /// Backend whose answers are released by the test through oneshot channels,
    /// in whatever order the test chooses.
    #[derive(Default)]
    struct ScriptedBackend {
        inserts: Mutex<VecDeque<oneshot::Receiver<vector_api::Result<()>>>>,
        searches: Mutex<VecDeque<oneshot::Receiver<vector_api::Result<Vec<Record>>>>>,
        insert_calls: Mutex<Vec<String>>,
        search_calls: Mutex<Vec<(String, u64)>>,
    }

    impl ScriptedBackend {
        fn script_insert(&self) -> Reply<()> {
            let (tx, rx) = oneshot::channel();
            self.inserts.lock().unwrap().push_back(rx);
            tx
        }

        fn script_search(&self) -> Reply<Vec<Record>> {
            let (tx, rx) = oneshot::channel();
            self.searches.lock().unwrap().push_back(rx);
            tx
        }

        fn insert_calls(&self) -> Vec<String> {
            self.insert_calls.lock().unwrap().clone()
        }

        fn search_calls(&self) -> Vec<(String, u64)> {
            self.search_calls.lock().unwrap().clone()
        }
    }

    fn dropped() -> VectorApiError {
        VectorApiError::Transport("script dropped".into())
    }

    impl VectorBackend for ScriptedBackend {
        fn insert<'a>(&'a self, request: &'a InsertRequest) -> BackendFuture<'a, ()> {
            self.insert_calls
                .lock()
                .unwrap()
                .push(request.text().to_string());
            let rx = self.inserts.lock().unwrap().pop_front().expect("unscripted insert");
            Box::pin(async move { rx.await.unwrap_or_else(|_| Err(dropped())) })
        }

        fn search<'a>(&'a self, query: &'a SearchQuery) -> BackendFuture<'a, Vec<Record>> {
            self.search_calls
                .lock()
                .unwrap()
                .push((query.query_text().to_string(), query.top_k().get()));
            let rx = self.searches.lock().unwrap().pop_front().expect("unscripted search");
            Box::pin(async move { rx.await.unwrap_or_else(|_| Err(dropped())) })
        }
    }

    fn record(id: &str, text: &str) -> Record {
        Record {
            id: id.to_string(),
            text: text.to_string(),
            embedding: vec![0.5, -0.25],
        }
    }

    fn texts(session: &Session<ScriptedBackend>) -> Vec<String> {
        session
            .state()
            .results()
            .iter()
            .map(|r| r.text.clone())
            .collect()
    }

    fn server_error() -> VectorApiError {
        VectorApiError::HttpStatus {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            url: "http://localhost:8080/search".into(),
            snippet: "Search failed".into(),
        }
    }

    #[tokio::test]
    async fn successful_insert_clears_draft_and_busy() {
        let backend = ScriptedBackend::default();
        let reply = backend.script_insert();
        let session = Session::new(backend, TopK::default());
        session.edit_draft_text("remember the milk");

        let mut fut = pin!(session.submit_insert());
        assert!(poll!(&mut fut).is_pending());
        assert!(session.state().insert_busy());
        assert!(session.state().busy());
        assert!(!session.state().search_busy());

        reply.send(Ok(())).unwrap();
        fut.await.unwrap();

        let state = session.state();
        assert_eq!(state.draft_text(), "");
        assert!(!state.busy());
        assert!(state.notice(Operation::Insert).is_none());
        assert_eq!(session.backend().insert_calls(), ["remember the milk"]);
    }

    #[tokio::test]
    async fn blank_insert_never_reaches_backend() {
        let session = Session::new(ScriptedBackend::default(), TopK::default());

        for draft in ["", "   \n"] {
            session.edit_draft_text(draft);
            let err = session.submit_insert().await.unwrap_err();
            assert!(matches!(
                err,
                VectorApiError::Validation(ValidationError::EmptyText)
            ));
        }

        let state = session.state();
        assert!(session.backend().insert_calls().is_empty());
        assert!(!state.busy());
        assert_eq!(state.notice(Operation::Insert).unwrap().kind, FailureKind::Invalid);
    }

    #[tokio::test]
    async fn failed_insert_keeps_draft_and_surfaces_error() {
        let backend = ScriptedBackend::default();
        backend
            .script_insert()
            .send(Err(VectorApiError::Transport("connection refused".into())))
            .unwrap();
        let session = Session::new(backend, TopK::default());

        let err = session.insert("do not lose me").await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::Unreachable);

        let state = session.state();
        assert_eq!(state.draft_text(), "do not lose me");
        assert!(!state.insert_busy());
        let notice = state.notice(Operation::Insert).unwrap();
        assert_eq!(notice.kind, FailureKind::Unreachable);
        assert_eq!(notice.message, "could not reach server");
    }

    #[tokio::test]
    async fn retry_after_failure_clears_old_notice() {
        let backend = ScriptedBackend::default();
        backend
            .script_insert()
            .send(Err(VectorApiError::Transport("reset".into())))
            .unwrap();
        backend.script_insert().send(Ok(())).unwrap();
        let session = Session::new(backend, TopK::default());

        assert!(session.insert("second try works").await.is_err());
        session.submit_insert().await.unwrap();

        let state = session.state();
        assert!(state.notice(Operation::Insert).is_none());
        assert_eq!(state.draft_text(), "");
        assert_eq!(
            session.backend().insert_calls(),
            ["second try works", "second try works"]
        );
    }

    #[tokio::test]
    async fn draft_edited_during_insert_is_not_cleared() {
        let backend = ScriptedBackend::default();
        let reply = backend.script_insert();
        let session = Session::new(backend, TopK::default());
        session.edit_draft_text("first note");

        let mut fut = pin!(session.submit_insert());
        assert!(poll!(&mut fut).is_pending());
        session.edit_draft_text("second note, typed while waiting");

        reply.send(Ok(())).unwrap();
        fut.await.unwrap();

        assert_eq!(
            session.state().draft_text(),
            "second note, typed while waiting"
        );
    }

    #[tokio::test]
    async fn search_results_keep_backend_order() {
        let backend = ScriptedBackend::default();
        let reply = backend.script_search();
        let session = Session::new(backend, TopK::default());
        session.edit_draft_query("cat");

        let mut fut = pin!(session.submit_search(None));
        assert!(poll!(&mut fut).is_pending());
        assert!(session.state().search_busy());

        reply
            .send(Ok(vec![
                record("3", "kitten"),
                record("1", "cat"),
                record("8", "lion"),
            ]))
            .unwrap();
        let outcome = fut.await.unwrap();

        assert_eq!(outcome, SearchOutcome::Applied { seq: 1, hits: 3 });
        assert_eq!(texts(&session), ["kitten", "cat", "lion"]);
        assert!(!session.state().busy());
        assert_eq!(session.state().draft_query(), "cat");
        assert_eq!(session.backend().search_calls(), [("cat".to_string(), 5)]);
    }

    #[tokio::test]
    async fn empty_result_is_not_an_error() {
        let backend = ScriptedBackend::default();
        backend.script_search().send(Ok(vec![record("1", "old")])).unwrap();
        backend.script_search().send(Ok(Vec::new())).unwrap();
        let session = Session::new(backend, TopK::default());

        session.search("first", None).await.unwrap();
        let outcome = session.search("no such thing", None).await.unwrap();

        assert_eq!(outcome, SearchOutcome::Applied { seq: 2, hits: 0 });
        let state = session.state();
        assert!(state.results().is_empty());
        assert!(state.notice(Operation::Search).is_none());
    }

    #[tokio::test]
    async fn failed_search_keeps_previous_results() {
        let backend = ScriptedBackend::default();
        backend
            .script_search()
            .send(Ok(vec![record("1", "a"), record("2", "b")]))
            .unwrap();
        backend.script_search().send(Err(server_error())).unwrap();
        let session = Session::new(backend, TopK::default());

        session.search("letters", None).await.unwrap();
        let err = session.search("boom", None).await.unwrap_err();

        assert_eq!(err.kind(), FailureKind::Rejected);
        assert_eq!(texts(&session), ["a", "b"]);
        let state = session.state();
        assert!(!state.search_busy());
        let notice = state.notice(Operation::Search).unwrap();
        assert_eq!(notice.message, "request rejected by server (HTTP 500)");
    }

    #[tokio::test]
    async fn later_search_wins_when_earlier_answers_last() {
        let backend = ScriptedBackend::default();
        let reply_a = backend.script_search();
        let reply_b = backend.script_search();
        let session = Session::new(backend, TopK::default());

        session.edit_draft_query("A");
        let mut search_a = pin!(session.submit_search(None));
        assert!(poll!(&mut search_a).is_pending());

        session.edit_draft_query("B");
        let mut search_b = pin!(session.submit_search(None));
        assert!(poll!(&mut search_b).is_pending());

        reply_b.send(Ok(vec![record("b", "from B")])).unwrap();
        assert_eq!(
            search_b.await.unwrap(),
            SearchOutcome::Applied { seq: 2, hits: 1 }
        );
        // A is still in flight.
        assert!(session.state().search_busy());

        reply_a.send(Ok(vec![record("a", "from A")])).unwrap();
        assert_eq!(
            search_a.await.unwrap(),
            SearchOutcome::Superseded { seq: 1 }
        );

        assert_eq!(texts(&session), ["from B"]);
        assert!(!session.state().search_busy());
    }

    #[tokio::test]
    async fn earlier_search_answering_first_is_still_discarded() {
        let backend = ScriptedBackend::default();
        backend.script_search().send(Ok(vec![record("0", "before")])).unwrap();
        let reply_a = backend.script_search();
        let reply_b = backend.script_search();
        let session = Session::new(backend, TopK::default());
        session.search("warm up", None).await.unwrap();

        session.edit_draft_query("A");
        let mut search_a = pin!(session.submit_search(None));
        assert!(poll!(&mut search_a).is_pending());
        session.edit_draft_query("B");
        let mut search_b = pin!(session.submit_search(None));
        assert!(poll!(&mut search_b).is_pending());

        reply_a.send(Err(server_error())).unwrap();
        assert_eq!(
            search_a.await.unwrap(),
            SearchOutcome::Superseded { seq: 2 }
        );
        assert_eq!(texts(&session), ["before"]);
        assert!(session.state().notice(Operation::Search).is_none());
        assert!(session.state().search_busy());

        reply_b.send(Ok(vec![record("b", "from B")])).unwrap();
        search_b.await.unwrap();
        assert_eq!(texts(&session), ["from B"]);
        assert!(!session.state().busy());
    }

    #[tokio::test]
    async fn insert_and_search_track_busy_independently() {
        let backend = ScriptedBackend::default();
        let insert_reply = backend.script_insert();
        let search_reply = backend.script_search();
        let session = Session::new(backend, TopK::default());

        session.edit_draft_text("note");
        session.edit_draft_query("query");
        let mut insert = pin!(session.submit_insert());
        let mut search = pin!(session.submit_search(None));
        assert!(poll!(&mut insert).is_pending());
        assert!(poll!(&mut search).is_pending());
        assert!(session.state().insert_busy() && session.state().search_busy());

        insert_reply.send(Ok(())).unwrap();
        insert.await.unwrap();
        assert!(!session.state().insert_busy());
        assert!(session.state().search_busy());
        assert!(session.state().busy());

        search_reply.send(Ok(vec![record("1", "hit")])).unwrap();
        search.await.unwrap();
        assert!(!session.state().busy());
        assert_eq!(texts(&session), ["hit"]);
    }

    #[tokio::test]
    async fn dropping_an_in_flight_search_clears_busy() {
        let backend = ScriptedBackend::default();
        let _reply = backend.script_search();
        let session = Session::new(backend, TopK::default());
        session.edit_draft_query("abandoned");

        let mut fut = Box::pin(session.submit_search(None));
        assert!(poll!(&mut fut).is_pending());
        assert!(session.state().search_busy());

        drop(fut);
        assert!(!session.state().search_busy());
    }

    #[tokio::test]
    async fn dropping_an_in_flight_search_while_state_is_read_clears_busy() {
        let backend = ScriptedBackend::default();
        let _reply = backend.script_search();
        let session = Session::new(backend, TopK::default());
        session.edit_draft_query("abandoned");

        let mut fut = Box::pin(session.submit_search(None));
        assert!(poll!(&mut fut).is_pending());

        let view = session.state();
        assert!(view.search_busy());
        drop(fut);
        drop(view);

        assert!(!session.state().search_busy());
        assert!(!session.state().busy());
    }

    #[tokio::test]
    async fn dropping_an_in_flight_insert_keeps_draft_and_clears_busy() {
        let backend = ScriptedBackend::default();
        let _reply = backend.script_insert();
        let session = Session::new(backend, TopK::default());
        session.edit_draft_text("half sent");

        let mut fut = Box::pin(session.submit_insert());
        assert!(poll!(&mut fut).is_pending());
        {
            let _view = session.state();
            drop(fut);
        }

        let state = session.state();
        assert!(!state.insert_busy());
        assert_eq!(state.draft_text(), "half sent");
    }

    #[tokio::test]
    async fn blank_query_never_reaches_backend() {
        let session = Session::new(ScriptedBackend::default(), TopK::default());

        let err = session.search("  ", None).await.unwrap_err();

        assert!(matches!(
            err,
            VectorApiError::Validation(ValidationError::EmptyQuery)
        ));
        assert!(session.backend().search_calls().is_empty());
        assert!(!session.state().search_busy());
        assert_eq!(
            session.state().notice(Operation::Search).unwrap().kind,
            FailureKind::Invalid
        );
    }

    #[tokio::test]
    async fn top_k_defaults_and_overrides() {
        let backend = ScriptedBackend::default();
        for _ in 0..3 {
            backend.script_search().send(Ok(Vec::new())).unwrap();
        }
        let session = Session::new(backend, TopK::default());

        session.search("cat", None).await.unwrap();
        session.set_default_top_k(TopK::new(2).unwrap());
        session.search("cat", None).await.unwrap();
        session.search("cat", Some(TopK::new(9).unwrap())).await.unwrap();

        let ks: Vec<u64> = session
            .backend()
            .search_calls()
            .into_iter()
            .map(|(_, k)| k)
            .collect();
        assert_eq!(ks, [5, 2, 9]);
    }
}
