//! Follow-up question generation.
//!
//! Picks keywords the leading candidates did not match and asks about the
//! ones shared by the most candidates first: a symptom several candidates
//! disagree on is the cheapest way to separate them.

use std::collections::HashMap;
use tracing::debug;

use crate::config::NarrowingConfig;
use crate::matching::types::{CandidateQuestion, MatchResult};
use crate::metrics;

/// Configuration for the question generator.
#[derive(Debug, Clone)]
pub struct QuestionGeneratorConfig {
    /// Number of top-ranked candidates examined.
    pub candidate_pool: usize,
    /// Unmatched keywords taken from each examined candidate.
    pub keywords_per_candidate: usize,
    /// Maximum questions returned.
    pub max_questions: usize,
}

impl Default for QuestionGeneratorConfig {
    fn default() -> Self {
        Self {
            candidate_pool: 5,
            keywords_per_candidate: 3,
            max_questions: 5,
        }
    }
}

impl From<&NarrowingConfig> for QuestionGeneratorConfig {
    fn from(config: &NarrowingConfig) -> Self {
        Self {
            candidate_pool: config.question_pool,
            keywords_per_candidate: config.questions_per_candidate,
            max_questions: config.max_questions,
        }
    }
}

/// Builds yes/no questions from a ranking.
#[derive(Debug, Clone, Default)]
pub struct QuestionGenerator {
    config: QuestionGeneratorConfig,
}

impl QuestionGenerator {
    /// Create a generator with default limits (5 candidates, 3 keywords, 5 questions).
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: QuestionGeneratorConfig) -> Self {
        Self { config }
    }

    /// Generate questions from `ranked`, which must already be sorted.
    ///
    /// Questions are ordered by the number of related candidates, most
    /// first; ties keep the order in which the symptom was first seen.
    pub fn generate(&self, ranked: &[MatchResult]) -> Vec<CandidateQuestion> {
        let mut questions: Vec<CandidateQuestion> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();

        for candidate in ranked.iter().take(self.config.candidate_pool) {
            let position = candidate.catalog_position;
            for symptom in candidate
                .unmatched_keywords
                .iter()
                .take(self.config.keywords_per_candidate)
            {
                let slot = *index.entry(symptom.as_str()).or_insert_with(|| {
                    questions.push(CandidateQuestion {
                        symptom: symptom.clone(),
                        related_positions: Vec::new(),
                        related_disease_ids: Vec::new(),
                    });
                    questions.len() - 1
                });
                let question = &mut questions[slot];
                if !question.related_positions.contains(&position) {
                    question.related_positions.push(position);
                    question
                        .related_disease_ids
                        .push(candidate.disease_id().to_string());
                }
            }
        }

        // Stable sort keeps first-seen order among equal counts
        questions.sort_by(|a, b| b.related_positions.len().cmp(&a.related_positions.len()));
        questions.truncate(self.config.max_questions);

        debug!(
            candidates = ranked.len().min(self.config.candidate_pool),
            questions = questions.len(),
            "Generated follow-up questions"
        );
        metrics::QUESTIONS_GENERATED.observe(questions.len() as f64);

        questions
    }
}
