//! Shared types for matching, questions, and refinement.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::catalog::DiseaseRecord;

/// A catalog record scored against the current symptoms.
///
/// Only created for records with at least one matched keyword.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchResult {
    pub disease: Arc<DiseaseRecord>,
    /// Index of the record in the catalog; the final tie-breaker.
    pub catalog_position: usize,
    /// Number of matched keywords, duplicates counted.
    pub score: u32,
    /// Keywords that matched, in record order.
    pub matched_keywords: Vec<String>,
    /// Keywords that did not match, in record order.
    pub unmatched_keywords: Vec<String>,
    /// Score after answers were applied. `score` itself never changes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_score: Option<f64>,
}

impl MatchResult {
    /// Refined score when present, keyword score otherwise.
    pub fn effective_score(&self) -> f64 {
        self.final_score.unwrap_or(self.score as f64)
    }

    pub fn disease_id(&self) -> &str {
        &self.disease.id
    }

    pub fn needs_image(&self) -> bool {
        self.disease.needs_image
    }
}

/// A yes/no follow-up question about a keyword the match missed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CandidateQuestion {
    pub symptom: String,
    /// Catalog positions of the leading candidates that list `symptom` as
    /// unmatched. Relatedness is counted here; record ids may repeat.
    pub related_positions: Vec<usize>,
    /// Record ids of the same candidates, parallel to `related_positions`.
    pub related_disease_ids: Vec<String>,
}

/// Tri-state answer to a follow-up question.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Answer {
    Yes,
    No,
    /// Skipped or not sure.
    Unknown,
}

impl Answer {
    pub fn as_str(&self) -> &'static str {
        match self {
            Answer::Yes => "yes",
            Answer::No => "no",
            Answer::Unknown => "unknown",
        }
    }
}

impl From<Option<bool>> for Answer {
    fn from(value: Option<bool>) -> Self {
        match value {
            Some(true) => Answer::Yes,
            Some(false) => Answer::No,
            None => Answer::Unknown,
        }
    }
}

/// Answers keyed by symptom. A later answer for the same symptom
/// replaces the earlier one.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct AnswerMap(BTreeMap<String, Answer>);

impl AnswerMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, symptom: impl Into<String>, answer: Answer) {
        self.0.insert(symptom.into(), answer);
    }

    pub fn get(&self, symptom: &str) -> Option<Answer> {
        self.0.get(symptom).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Answer)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl<S: Into<String>> FromIterator<(S, Answer)> for AnswerMap {
    fn from_iter<I: IntoIterator<Item = (S, Answer)>>(iter: I) -> Self {
        let mut map = AnswerMap::new();
        for (symptom, answer) in iter {
            map.record(symptom, answer);
        }
        map
    }
}
