//! Prometheus metrics for the narrowing engine.
//!
//! This module provides metrics for:
//! - Sessions (started, symptom submissions, outcomes)
//! - Matching (candidates per submission)
//! - Narrowing (questions generated, answers given)

use once_cell::sync::Lazy;
use prometheus::{Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Sessions
// =============================================================================

/// Narrowing sessions created.
pub static SESSIONS_STARTED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "petdiag_sessions_started_total",
        "Total narrowing sessions started",
    )
    .unwrap()
});

/// Symptom submissions by result.
pub static SYMPTOM_SUBMISSIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "petdiag_symptom_submissions_total",
            "Total symptom submissions",
        ),
        &["result"], // "matched", "no_match"
    )
    .unwrap()
});

/// Sessions reaching a result or the image gate, by outcome.
pub static OUTCOMES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("petdiag_outcomes_total", "Narrowing outcomes"),
        &["outcome"], // "selected", "image_confirm", "manual_choice", "no_match"
    )
    .unwrap()
});

// =============================================================================
// Matching and narrowing
// =============================================================================

/// Candidates returned by the matcher.
pub static CANDIDATES_PER_SUBMISSION: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "petdiag_candidates_per_submission",
            "Number of candidate diseases per symptom submission",
        )
        .buckets(vec![0.0, 1.0, 2.0, 5.0, 10.0, 25.0, 50.0, 100.0]),
    )
    .unwrap()
});

/// Follow-up questions generated per ranking.
pub static QUESTIONS_GENERATED: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "petdiag_questions_generated",
            "Number of follow-up questions generated per ranking",
        )
        .buckets(vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]),
    )
    .unwrap()
});

/// Answers to follow-up questions, by kind.
pub static ANSWERS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("petdiag_answers_total", "Follow-up answers received"),
        &["answer"], // "yes", "no", "unknown"
    )
    .unwrap()
});

/// Returns all core metrics for registration.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Sessions
        Box::new(SESSIONS_STARTED.clone()),
        Box::new(SYMPTOM_SUBMISSIONS.clone()),
        Box::new(OUTCOMES.clone()),
        // Matching and narrowing
        Box::new(CANDIDATES_PER_SUBMISSION.clone()),
        Box::new(QUESTIONS_GENERATED.clone()),
        Box::new(ANSWERS.clone()),
    ]
}
