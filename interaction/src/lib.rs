//! Interaction state for the notes client and the session that drives it.
//!
//! [`Session`] is the only writer of [`InteractionState`]; the presentation
//! layer edits drafts through it, submits operations, and renders the state.

mod session;
mod state;

pub use session::{SearchOutcome, Session};
pub use state::{InteractionState, Notice, Operation, StateView};
