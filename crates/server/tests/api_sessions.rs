//! API integration tests for narrowing sessions, driven in-process.

mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{fixtures, TestFixture};
use petdiag_core::{Catalog, Config, SpeciesScope};

#[tokio::test]
async fn test_health() {
    let fixture = TestFixture::new();
    let response = fixture.get("/api/v1/health").await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
}

#[tokio::test]
async fn test_config_is_exposed() {
    let fixture = TestFixture::new();
    let response = fixture.get("/api/v1/config").await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["narrowing"]["max_questions"], 5);
    assert_eq!(response.body["server"]["port"], 8080);
}

#[tokio::test]
async fn test_create_session_starts_at_species_select() {
    let fixture = TestFixture::new();
    let response = fixture.post_empty("/api/v1/sessions").await;
    assert_status!(response, StatusCode::CREATED);
    assert_eq!(response.body["state"], "species_select");

    let id = response.body["id"].as_str().unwrap();
    let fetched = fixture.get(&format!("/api/v1/sessions/{}", id)).await;
    assert_status!(fetched, StatusCode::OK);
    assert_eq!(fetched.body["id"], id);
}

#[tokio::test]
async fn test_full_flow_through_image_gate() {
    let fixture = TestFixture::new();
    let id = fixture.create_session().await;
    let base = format!("/api/v1/sessions/{}", id);

    let response = fixture
        .post(&format!("{}/species", base), json!({ "species": "dog" }))
        .await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["state"], "symptom_entry");

    let response = fixture
        .post(
            &format!("{}/symptoms", base),
            json!({ "symptoms": ["nôn mửa"] }),
        )
        .await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["state"], "narrowing");
    assert_eq!(response.body["candidates"].as_array().unwrap().len(), 2);
    assert_eq!(response.body["question"]["symptom"], "tiêu chảy");
    assert_eq!(response.body["question"]["total"], 2);

    let response = fixture
        .post(&format!("{}/answer", base), json!({ "answer": null }))
        .await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["question"]["symptom"], "sốt");
    assert_eq!(response.body["question"]["index"], 1);

    let response = fixture
        .post(&format!("{}/answer", base), json!({ "answer": true }))
        .await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["state"], "image_confirm");
    assert_eq!(response.body["image_choices"][0]["disease_id"], "B");
    assert_eq!(response.body["image_choices"][0]["position"], 1);
    assert_eq!(response.body["image_choices"][0]["final_score"], 2.0);
    assert_eq!(response.body["image_fallback"]["disease_id"], "A");

    let response = fixture.post_empty(&format!("{}/image/skip", base)).await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["state"], "result");
    assert_eq!(response.body["outcome"], "selected");
    assert_eq!(response.body["selected"]["summary"]["disease_id"], "A");
    assert_eq!(response.body["selected"]["record"]["disease_name"], "Disease A");

    let response = fixture.post_empty(&format!("{}/reset", base)).await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["state"], "species_select");
}

#[tokio::test]
async fn test_confirming_image_candidate() {
    let fixture = TestFixture::new();
    let id = fixture.create_session().await;
    let base = format!("/api/v1/sessions/{}", id);

    fixture
        .post(&format!("{}/species", base), json!({ "species": "dog" }))
        .await;
    fixture
        .post(&format!("{}/symptoms", base), json!({ "text": "nôn mửa" }))
        .await;
    fixture
        .post(&format!("{}/answer", base), json!({ "answer": false }))
        .await;
    fixture
        .post(&format!("{}/answer", base), json!({ "answer": true }))
        .await;

    let response = fixture
        .post(
            &format!("{}/image/select", base),
            json!({ "position": 0 }),
        )
        .await;
    assert_status!(response, StatusCode::UNPROCESSABLE_ENTITY);

    let response = fixture
        .post(
            &format!("{}/image/select", base),
            json!({ "position": 1 }),
        )
        .await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["selected"]["summary"]["disease_id"], "B");
    assert_eq!(response.body["selected"]["summary"]["image_type"], "Photo");
}

#[tokio::test]
async fn test_no_match_offers_only_reset() {
    let fixture = TestFixture::new();
    let id = fixture.create_session().await;
    let base = format!("/api/v1/sessions/{}", id);

    fixture
        .post(&format!("{}/species", base), json!({ "species": "dog" }))
        .await;
    let response = fixture
        .post(&format!("{}/symptoms", base), json!({ "text": "co giật" }))
        .await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["state"], "result");
    assert_eq!(response.body["outcome"], "no_match");

    let response = fixture
        .post(&format!("{}/answer", base), json!({ "answer": true }))
        .await;
    assert_status!(response, StatusCode::CONFLICT);
    assert!(response.body["error"]
        .as_str()
        .unwrap()
        .contains("result"));
}

#[tokio::test]
async fn test_empty_symptoms_rejected() {
    let fixture = TestFixture::new();
    let id = fixture.create_session().await;
    let base = format!("/api/v1/sessions/{}", id);

    fixture
        .post(&format!("{}/species", base), json!({ "species": "cat" }))
        .await;
    let response = fixture
        .post(&format!("{}/symptoms", base), json!({ "text": " , " }))
        .await;
    assert_status!(response, StatusCode::UNPROCESSABLE_ENTITY);

    let response = fixture.post(&format!("{}/symptoms", base), json!({})).await;
    assert_status!(response, StatusCode::UNPROCESSABLE_ENTITY);

    let response = fixture.get(&base).await;
    assert_eq!(response.body["state"], "symptom_entry");
    assert_eq!(response.body["species"], "cat");
}

#[tokio::test]
async fn test_invalid_transition_is_conflict() {
    let fixture = TestFixture::new();
    let id = fixture.create_session().await;

    let response = fixture
        .post_empty(&format!("/api/v1/sessions/{}/back", id))
        .await;
    assert_status!(response, StatusCode::CONFLICT);

    let response = fixture
        .post_empty(&format!("/api/v1/sessions/{}/image/skip", id))
        .await;
    assert_status!(response, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_pick_while_narrowing() {
    let fixture = TestFixture::new();
    let id = fixture.create_session().await;
    let base = format!("/api/v1/sessions/{}", id);

    fixture
        .post(&format!("{}/species", base), json!({ "species": "dog" }))
        .await;
    fixture
        .post(&format!("{}/symptoms", base), json!({ "symptoms": ["nôn mửa"] }))
        .await;

    let response = fixture
        .post(&format!("{}/pick", base), json!({ "position": 1 }))
        .await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["outcome"], "selected");
    assert_eq!(response.body["selected"]["summary"]["disease_id"], "B");

    let response = fixture.post_empty(&format!("{}/back", base)).await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["state"], "narrowing");
    assert_eq!(response.body["question"]["index"], 0);
}

#[tokio::test]
async fn test_unknown_and_deleted_sessions() {
    let fixture = TestFixture::new();
    let response = fixture.get("/api/v1/sessions/does-not-exist").await;
    assert_status!(response, StatusCode::NOT_FOUND);

    let id = fixture.create_session().await;
    let response = fixture.delete(&format!("/api/v1/sessions/{}", id)).await;
    assert_status!(response, StatusCode::NO_CONTENT);

    let response = fixture.get(&format!("/api/v1/sessions/{}", id)).await;
    assert_status!(response, StatusCode::NOT_FOUND);
    let response = fixture.delete(&format!("/api/v1/sessions/{}", id)).await;
    assert_status!(response, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_session_limit() {
    let mut config = Config::default();
    config.server.max_sessions = 1;
    let fixture = TestFixture::with_catalog(fixtures::vomiting_catalog(), config);

    fixture.create_session().await;
    let response = fixture.post_empty("/api/v1/sessions").await;
    assert_status!(response, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_idle_session_frees_its_slot() {
    let mut config = Config::default();
    config.server.max_sessions = 1;
    config.server.session_idle_secs = 1;
    let fixture = TestFixture::with_catalog(fixtures::vomiting_catalog(), config);

    let stale = fixture.create_session().await;
    tokio::time::sleep(std::time::Duration::from_millis(1500)).await;

    let response = fixture.post_empty("/api/v1/sessions").await;
    assert_status!(response, StatusCode::CREATED);
    let response = fixture.get(&format!("/api/v1/sessions/{}", stale)).await;
    assert_status!(response, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_symptom_vocabulary() {
    let fixture = TestFixture::new();

    let response = fixture.get("/api/v1/symptoms?species=dog").await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(
        response.body["symptoms"],
        json!(["nôn mửa", "tiêu chảy", "sốt"])
    );

    let response = fixture.get("/api/v1/symptoms?species=dog&q=sot").await;
    assert_eq!(response.body["symptoms"], json!(["sốt"]));

    let response = fixture.get("/api/v1/symptoms?species=cat").await;
    assert_eq!(response.body["symptoms"], json!([]));
}

#[tokio::test]
async fn test_catalog_stats() {
    let catalog = Catalog::new(vec![
        fixtures::disease("a", SpeciesScope::Dog, &["ho"], false),
        fixtures::disease("b", SpeciesScope::Cat, &["ho"], true),
        fixtures::disease("c", SpeciesScope::Both, &["sốt"], false),
    ]);
    let fixture = TestFixture::with_catalog(catalog, Config::default());

    let response = fixture.get("/api/v1/catalog/stats").await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["total"], 3);
    assert_eq!(response.body["dog"], 1);
    assert_eq!(response.body["cat"], 1);
    assert_eq!(response.body["both"], 1);
    assert_eq!(response.body["needs_image"], 1);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let fixture = TestFixture::new();
    fixture.get("/api/v1/health").await;

    let (status, body) = fixture.get_text("/api/v1/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("petdiag_http_requests_total"));
    assert!(body.contains("petdiag_sessions_started_total"));
}
