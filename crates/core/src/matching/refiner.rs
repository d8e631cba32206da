//! Answer-driven re-scoring.

use std::cmp::Ordering;
use tracing::debug;

use crate::config::NarrowingConfig;
use crate::matching::types::{Answer, AnswerMap, MatchResult};

/// Applies follow-up answers to a ranking.
///
/// A confirmed symptom the keyword match missed adds `positive_bonus`; a
/// denied symptom the match counted removes `negative_penalty`. Unknown
/// answers, and answers about keywords a candidate does not list on the
/// relevant side, change nothing.
#[derive(Debug, Clone)]
pub struct Refiner {
    positive_bonus: f64,
    negative_penalty: f64,
}

impl Default for Refiner {
    fn default() -> Self {
        Self {
            positive_bonus: 1.0,
            negative_penalty: 0.5,
        }
    }
}

impl Refiner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_weights(positive_bonus: f64, negative_penalty: f64) -> Self {
        Self {
            positive_bonus,
            negative_penalty,
        }
    }

    /// Return a re-sorted copy of `matches` with `final_score` set.
    ///
    /// Sorted by final score descending, then keyword score descending,
    /// then catalog position.
    pub fn refine(&self, matches: &[MatchResult], answers: &AnswerMap) -> Vec<MatchResult> {
        let mut refined: Vec<MatchResult> = matches
            .iter()
            .map(|m| {
                let mut next = m.clone();
                next.final_score = Some(m.score as f64 + self.bonus(m, answers));
                next
            })
            .collect();

        refined.sort_by(compare_refined);

        debug!(
            candidates = refined.len(),
            answers = answers.len(),
            top = refined.first().map(|m| m.disease_id()).unwrap_or(""),
            "Refined ranking"
        );

        refined
    }

    fn bonus(&self, candidate: &MatchResult, answers: &AnswerMap) -> f64 {
        answers
            .iter()
            .map(|(symptom, answer)| match answer {
                Answer::Yes if candidate.unmatched_keywords.iter().any(|k| k == symptom) => {
                    self.positive_bonus
                }
                Answer::No if candidate.matched_keywords.iter().any(|k| k == symptom) => {
                    -self.negative_penalty
                }
                _ => 0.0,
            })
            .sum()
    }
}

impl From<&NarrowingConfig> for Refiner {
    fn from(config: &NarrowingConfig) -> Self {
        Self::with_weights(config.positive_bonus, config.negative_penalty)
    }
}

fn compare_refined(a: &MatchResult, b: &MatchResult) -> Ordering {
    b.effective_score()
        .total_cmp(&a.effective_score())
        .then_with(|| b.score.cmp(&a.score))
        .then_with(|| a.catalog_position.cmp(&b.catalog_position))
}
