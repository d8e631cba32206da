use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::{catalog, handlers, middleware::metrics_middleware, sessions};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // API routes
    let api_routes = Router::new()
        // Health, config and metrics
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        .route("/metrics", get(handlers::metrics))
        // Catalog
        .route("/catalog/stats", get(catalog::get_stats))
        .route("/symptoms", get(catalog::list_symptoms))
        // Sessions
        .route("/sessions", post(sessions::create_session))
        .route(
            "/sessions/{id}",
            get(sessions::get_session).delete(sessions::delete_session),
        )
        .route("/sessions/{id}/species", post(sessions::select_species))
        .route("/sessions/{id}/symptoms", post(sessions::submit_symptoms))
        .route("/sessions/{id}/answer", post(sessions::answer))
        .route("/sessions/{id}/pick", post(sessions::pick))
        .route("/sessions/{id}/image/select", post(sessions::select_image))
        .route("/sessions/{id}/image/skip", post(sessions::skip_image))
        .route("/sessions/{id}/back", post(sessions::back))
        .route("/sessions/{id}/reset", post(sessions::reset))
        .layer(middleware::from_fn(metrics_middleware))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
