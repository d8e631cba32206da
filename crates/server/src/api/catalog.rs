//! Catalog API handlers.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use petdiag_core::{CatalogStats, Species};

use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct CatalogStatsResponse {
    #[serde(flatten)]
    pub stats: CatalogStats,
    pub fingerprint: String,
}

#[derive(Debug, Deserialize)]
pub struct SymptomQueryParams {
    pub species: Species,
    #[serde(default)]
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SymptomListResponse {
    pub species: Species,
    pub symptoms: Vec<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/v1/catalog/stats
pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<CatalogStatsResponse> {
    let catalog = state.catalog();
    Json(CatalogStatsResponse {
        stats: catalog.stats(),
        fingerprint: catalog.fingerprint().to_string(),
    })
}

/// GET /api/v1/symptoms?species=dog&q=...
///
/// Known symptom keywords for a species, for autocomplete.
pub async fn list_symptoms(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SymptomQueryParams>,
) -> Json<SymptomListResponse> {
    let symptoms = state
        .catalog()
        .symptom_vocabulary(params.species, params.q.as_deref());
    Json(SymptomListResponse {
        species: params.species,
        symptoms,
    })
}
