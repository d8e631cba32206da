//! Narrowing sessions: the state machine driving one user from species
//! selection through follow-up questions to a result.

mod controller;
mod types;

pub use controller::{parse_symptom_text, NarrowingSession};
pub use types::{
    CandidateSummary, NarrowingState, QuestionView, ResultOutcome, SelectedDisease,
    SessionSnapshot,
};

use thiserror::Error;

/// Errors from driving a session with an operation its state does not accept.
#[derive(Debug, Error, PartialEq)]
pub enum SessionError {
    #[error("Cannot {operation} while in state {state}")]
    InvalidTransition {
        state: &'static str,
        operation: &'static str,
    },

    #[error("No symptoms given")]
    EmptySymptoms,

    #[error("Candidate at catalog position {0} is not among the offered candidates")]
    UnknownCandidate(usize),
}
