//! Keyword matcher.
//!
//! Scores every catalog record admitted for the query species by counting
//! keywords that overlap a user symptom. Overlap is substring containment
//! in either direction on normalized text, so "đau" matches the keyword
//! "đau bụng" and "đau bụng quá" matches the keyword "đau bụng".

use std::cmp::Ordering;
use std::sync::Arc;
use tracing::debug;

use crate::catalog::{DiseaseRecord, Species};
use crate::matching::normalize::normalize;
use crate::matching::types::MatchResult;
use crate::metrics;

/// Rank `records` against `symptoms` for `species`.
///
/// Records of another species never appear, and neither do records with
/// no matched keyword. The result is sorted by score descending, ties in
/// catalog order. An empty result means nothing matched.
pub fn match_diseases<S: AsRef<str>>(
    species: Species,
    symptoms: &[S],
    records: &[Arc<DiseaseRecord>],
) -> Vec<MatchResult> {
    // A symptom that folds to nothing would be contained in every keyword.
    let inputs: Vec<String> = symptoms
        .iter()
        .map(|s| normalize(s.as_ref()))
        .filter(|s| !s.is_empty())
        .collect();

    if inputs.is_empty() {
        return Vec::new();
    }

    let mut results: Vec<MatchResult> = records
        .iter()
        .enumerate()
        .filter(|(_, record)| record.species.admits(species))
        .filter_map(|(position, record)| score_record(position, record, &inputs))
        .collect();

    results.sort_by(compare_by_score);

    debug!(
        species = %species,
        symptoms = inputs.len(),
        candidates = results.len(),
        "Matched symptoms against catalog"
    );
    metrics::CANDIDATES_PER_SUBMISSION.observe(results.len() as f64);

    results
}

/// Whether a normalized keyword and a normalized symptom overlap.
fn keyword_matches(keyword: &str, symptom: &str) -> bool {
    keyword.contains(symptom) || symptom.contains(keyword)
}

fn score_record(
    position: usize,
    record: &Arc<DiseaseRecord>,
    inputs: &[String],
) -> Option<MatchResult> {
    let mut matched = Vec::new();
    let mut unmatched = Vec::new();

    for keyword in &record.symptom_keywords {
        let folded = normalize(keyword);
        let is_match =
            !folded.is_empty() && inputs.iter().any(|input| keyword_matches(&folded, input));
        if is_match {
            matched.push(keyword.clone());
        } else {
            unmatched.push(keyword.clone());
        }
    }

    if matched.is_empty() {
        return None;
    }

    Some(MatchResult {
        disease: Arc::clone(record),
        catalog_position: position,
        score: matched.len() as u32,
        matched_keywords: matched,
        unmatched_keywords: unmatched,
        final_score: None,
    })
}

fn compare_by_score(a: &MatchResult, b: &MatchResult) -> Ordering {
    b.score
        .cmp(&a.score)
        .then_with(|| a.catalog_position.cmp(&b.catalog_position))
}
