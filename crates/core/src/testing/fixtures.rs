//! Builders for catalog records and match results used in tests.

use std::sync::Arc;

use crate::catalog::{Catalog, DiseaseRecord, SpeciesScope};
use crate::matching::MatchResult;

/// A disease record with the fields the engine reads; display fields empty.
pub fn disease(id: &str, species: SpeciesScope, keywords: &[&str], needs_image: bool) -> DiseaseRecord {
    DiseaseRecord {
        id: id.to_string(),
        name: format!("Disease {}", id),
        localized_name: None,
        species,
        symptom_keywords: keywords.iter().map(|k| k.to_string()).collect(),
        severity_score: 5,
        needs_image,
        image_type: needs_image.then(|| "Photo".to_string()),
        summary: None,
        nutrition_advice: None,
        common_breeds: Vec::new(),
        source_page: None,
    }
}

/// Wrap records the way a loaded catalog holds them.
pub fn records(records: Vec<DiseaseRecord>) -> Vec<Arc<DiseaseRecord>> {
    records.into_iter().map(Arc::new).collect()
}

/// A match result with explicit partitions, bypassing the matcher.
pub fn scored(id: &str, score: u32, matched: &[&str], unmatched: &[&str]) -> MatchResult {
    scored_at(0, id, score, matched, unmatched)
}

/// Like [`scored`] for a record at a given catalog position.
pub fn scored_at(
    position: usize,
    id: &str,
    score: u32,
    matched: &[&str],
    unmatched: &[&str],
) -> MatchResult {
    let keywords: Vec<&str> = matched.iter().chain(unmatched.iter()).copied().collect();
    MatchResult {
        disease: Arc::new(disease(id, SpeciesScope::Dog, &keywords, false)),
        catalog_position: position,
        score,
        matched_keywords: matched.iter().map(|k| k.to_string()).collect(),
        unmatched_keywords: unmatched.iter().map(|k| k.to_string()).collect(),
        final_score: None,
    }
}

/// Two dog diseases sharing "nôn mửa"; only B needs an image.
pub fn vomiting_catalog() -> Catalog {
    Catalog::new(vec![
        disease("A", SpeciesScope::Dog, &["nôn mửa", "tiêu chảy"], false),
        disease("B", SpeciesScope::Dog, &["nôn mửa", "sốt"], true),
    ])
}

/// A small mixed-species catalog.
pub fn sample_catalog() -> Catalog {
    Catalog::new(vec![
        disease("parvo", SpeciesScope::Dog, &["nôn mửa", "tiêu chảy", "sốt", "chán ăn"], false),
        disease("mange", SpeciesScope::Dog, &["rụng lông", "ngứa ngáy", "viêm da"], true),
        disease("ringworm", SpeciesScope::Cat, &["rụng lông", "ngứa ngáy"], true),
        disease("fip", SpeciesScope::Cat, &["sốt", "chán ăn", "báng bụng"], false),
        disease("obesity", SpeciesScope::Both, &["tăng cân", "mệt mỏi"], false),
        disease("gastritis", SpeciesScope::Unspecified, &["nôn mửa", "đau bụng"], false),
    ])
}
