//! Immutable in-memory disease catalog.

use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use crate::catalog::types::{DiseaseRecord, Species, SpeciesScope};
use crate::matching::normalize;

/// Errors raised while loading a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Record counts by species scope.
#[derive(Debug, Clone, Serialize, PartialEq, Eq, Default)]
pub struct CatalogStats {
    pub total: usize,
    pub dog: usize,
    pub cat: usize,
    pub both: usize,
    pub unspecified: usize,
    pub other: usize,
    pub needs_image: usize,
}

/// The loaded disease catalog.
///
/// Records are shared through `Arc` so match results can point at them
/// without copying the payload. Nothing here is mutated after load.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    records: Vec<Arc<DiseaseRecord>>,
    fingerprint: String,
}

impl Catalog {
    /// Build a catalog from already parsed records.
    pub fn new(records: Vec<DiseaseRecord>) -> Self {
        Self {
            records: records.into_iter().map(Arc::new).collect(),
            fingerprint: String::new(),
        }
    }

    /// Parse a JSON array of disease records.
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let records: Vec<DiseaseRecord> = serde_json::from_str(json)?;
        let mut catalog = Self::new(records);
        catalog.fingerprint = fingerprint(json.as_bytes());
        debug!(
            records = catalog.len(),
            fingerprint = %catalog.fingerprint,
            "Parsed disease catalog"
        );
        Ok(catalog)
    }

    /// Load a catalog from a JSON file.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let catalog = Self::from_json_str(&json)?;
        info!(
            path = %path.display(),
            records = catalog.len(),
            fingerprint = %catalog.fingerprint,
            "Loaded disease catalog"
        );
        Ok(catalog)
    }

    /// All records, in file order.
    pub fn records(&self) -> &[Arc<DiseaseRecord>] {
        &self.records
    }

    /// First record with the given id.
    pub fn get(&self, id: &str) -> Option<&Arc<DiseaseRecord>> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Short SHA-256 of the source JSON. Empty when built from records.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn stats(&self) -> CatalogStats {
        let mut stats = CatalogStats {
            total: self.records.len(),
            ..Default::default()
        };
        for record in &self.records {
            match record.species {
                SpeciesScope::Dog => stats.dog += 1,
                SpeciesScope::Cat => stats.cat += 1,
                SpeciesScope::Both => stats.both += 1,
                SpeciesScope::Unspecified => stats.unspecified += 1,
                SpeciesScope::Other(_) => stats.other += 1,
            }
            if record.needs_image {
                stats.needs_image += 1;
            }
        }
        stats
    }

    /// Distinct symptom keywords of records admitted for `species`, in
    /// first-seen order. `filter` keeps keywords whose normalized text
    /// contains the normalized filter.
    pub fn symptom_vocabulary(&self, species: Species, filter: Option<&str>) -> Vec<String> {
        let filter = filter.map(normalize).filter(|f| !f.is_empty());
        let mut seen = HashSet::new();
        let mut vocabulary = Vec::new();

        for record in self.records.iter().filter(|r| r.species.admits(species)) {
            for keyword in &record.symptom_keywords {
                let key = normalize(keyword);
                if key.is_empty() || !seen.insert(key.clone()) {
                    continue;
                }
                if let Some(f) = &filter {
                    if !key.contains(f.as_str()) {
                        continue;
                    }
                }
                vocabulary.push(keyword.trim().to_string());
            }
        }

        vocabulary
    }
}

fn fingerprint(bytes: &[u8]) -> String {
    let digest = format!("{:x}", Sha256::digest(bytes));
    digest[..16].to_string()
}
