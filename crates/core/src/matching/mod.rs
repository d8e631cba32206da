//! Symptom matching: normalization, keyword scoring, follow-up questions
//! and answer-driven refinement.
//!
//! ```text
//! symptoms ──► match_diseases ──► ranking ──► QuestionGenerator ──► questions
//!                                    │                                 │
//!                                    │            answers ◄────────────┘
//!                                    ▼               │
//!                                 Refiner ◄──────────┘
//!                                    │
//!                                    ▼
//!                             refined ranking
//! ```
//!
//! Everything here is pure and synchronous.

mod matcher;
mod normalize;
mod questions;
mod refiner;
mod types;

pub use matcher::match_diseases;
pub use normalize::normalize;
pub use questions::{QuestionGenerator, QuestionGeneratorConfig};
pub use refiner::Refiner;
pub use types::{Answer, AnswerMap, CandidateQuestion, MatchResult};
