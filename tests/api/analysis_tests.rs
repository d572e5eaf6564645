//! Completing sessions and the background damage analysis.

use actix_web::http::StatusCode;
use damage_inspection_lib::config::AnalyzerBackend;
use damage_inspection_lib::models::analysis::AnalysisStatus;
use damage_inspection_lib::services::{AnalysisRunner, StubDamageAnalyzer};
use serde_json::{Value, json};
use std::sync::Arc;

use super::helpers::*;
use super::mock_provider::MockVisionProvider;

async fn session_status<S>(app: &S, id: &str) -> Value
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let (_, body) = call_json(app, get(&format!("/api/v1/sessions/{}/details", id))).await;
    body["data"]["session"]["status"].clone()
}

#[actix_rt::test]
async fn test_complete_without_credential_records_error() {
    let env = setup().await;
    let app = create_test_app(&env, AppOptions::default()).await;

    let session = create_session(&app, None).await;
    let id = session["id"].as_str().unwrap();
    upload_photo(&app, id, 0, "fronte").await;

    let (status, body) =
        call_json(&app, post_empty(&format!("/api/v1/sessions/{}/complete", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "uploaded");
    assert_eq!(body["data"]["valid_photos"], 1);
    assert!(body["data"]["completed_at"].is_string());

    let results = wait_for_analysis(&app, id).await;
    assert_eq!(results, json!({"analysis_status": "error", "damages": []}));
    assert_eq!(session_status(&app, id).await, "completed");
}

#[actix_rt::test]
async fn test_complete_with_no_photos_is_empty_success() {
    let env = setup().await;
    let app = create_test_app(&env, AppOptions::default()).await;

    let session = create_session(&app, None).await;
    let id = session["id"].as_str().unwrap();

    let (status, body) =
        call_json(&app, post_empty(&format!("/api/v1/sessions/{}/complete", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["valid_photos"], 0);

    let results = wait_for_analysis(&app, id).await;
    assert_eq!(results, json!({"analysis_status": "completed", "damages": []}));
    assert_eq!(session_status(&app, id).await, "completed");
}

#[actix_rt::test]
async fn test_provider_damages_are_filtered_to_vocabulary() {
    let provider = MockVisionProvider::start().await;
    provider.set_analysis_reply(
        r#"{"damages": [
            {"damage_type": "graffio", "severity": "lieve", "zone": "frontale",
             "description": "Graffio sul parafango"},
            {"damage_type": "bruciatura", "severity": "grave", "zone": "frontale"},
            {"damage_type": "crepa", "severity": "catastrofico", "zone": "posteriore"},
            {"damage_type": "crepa", "severity": "grave", "zone": "posteriore"},
            {"damage_type": "graffio", "severity": "moderato", "zone": "laterale_destro"},
            "not an object"
        ]}"#,
    );
    let env = setup().await;
    let app = create_test_app(&env, AppOptions::with_provider(&provider.base_url)).await;

    let session = create_session(&app, None).await;
    let id = session["id"].as_str().unwrap();
    upload_photo(&app, id, 0, "fronte").await;
    upload_photo(&app, id, 2, "retro").await;
    call_json(&app, post_empty(&format!("/api/v1/sessions/{}/complete", id))).await;

    let results = wait_for_analysis(&app, id).await;
    assert_eq!(results["analysis_status"], "completed");

    let damages = results["damages"].as_array().unwrap();
    assert_eq!(damages.len(), 3);
    assert!(damages.iter().all(|d| d["bounding_box"].is_null()));
    assert!(damages.iter().any(|d| d["damage_type"] == "graffio"
        && d["zone"] == "frontale"
        && d["description"] == "Graffio sul parafango"));
    assert!(!damages.iter().any(|d| d["damage_type"] == "bruciatura"));

    // Analysis request carries both stored photos
    let request = provider.last_request().unwrap();
    let content = request.pointer("/messages/0/content").unwrap();
    assert_eq!(content.as_array().unwrap().len(), 3);

    let analysis = env.pool.get_analysis_for_session(id).await.unwrap().unwrap();
    let raw: Value = serde_json::from_str(analysis.raw_response.as_deref().unwrap()).unwrap();
    assert_eq!(raw["damages"].as_array().unwrap().len(), 3);

    let (_, body) = call_json(&app, get("/api/v1/sessions")).await;
    let item = &body["data"][0];
    assert_eq!(item["analysis_status"], "completed");
    assert_eq!(item["damage_count"], 3);
    let mut types: Vec<&str> = item["damage_types"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t.as_str().unwrap())
        .collect();
    types.sort_unstable();
    assert_eq!(types, ["crepa", "graffio"]);
    assert_eq!(item["status"], "completed");
}

#[actix_rt::test]
async fn test_provider_error_is_redacted() {
    let provider = MockVisionProvider::start().await;
    let env = setup().await;
    let app = create_test_app(&env, AppOptions::with_provider(&provider.base_url)).await;

    let session = create_session(&app, None).await;
    let id = session["id"].as_str().unwrap();
    upload_photo(&app, id, 0, "fronte").await;

    provider.fail_with(
        401,
        &format!("{{\"error\": \"Incorrect API key provided: {}\"}}", TEST_PROVIDER_KEY),
    );
    call_json(&app, post_empty(&format!("/api/v1/sessions/{}/complete", id))).await;

    let results = wait_for_analysis(&app, id).await;
    assert_eq!(results["analysis_status"], "error");

    let analysis = env.pool.get_analysis_for_session(id).await.unwrap().unwrap();
    let raw = analysis.raw_response.unwrap();
    assert!(raw.contains("401"));
    assert!(raw.contains("[REDACTED]"));
    assert!(!raw.contains(TEST_PROVIDER_KEY));
    assert_eq!(session_status(&app, id).await, "completed");
}

#[actix_rt::test]
async fn test_stub_analyzer_follows_angle_labels() {
    let env = setup().await;
    let app = create_test_app(
        &env,
        AppOptions {
            analyzer: AnalyzerBackend::Stub,
            ..AppOptions::default()
        },
    )
    .await;

    let session = create_session(&app, None).await;
    let id = session["id"].as_str().unwrap();
    upload_photo(&app, id, 0, "fronte").await;
    upload_photo(&app, id, 1, "lato_sinistro").await;
    call_json(&app, post_empty(&format!("/api/v1/sessions/{}/complete", id))).await;

    let results = wait_for_analysis(&app, id).await;
    assert_eq!(results["analysis_status"], "completed");

    let damages = results["damages"].as_array().unwrap();
    assert_eq!(damages.len(), 2);
    assert!(damages.iter().any(|d| d["zone"] == "frontale" && d["damage_type"] == "graffio"));
    assert!(damages
        .iter()
        .any(|d| d["zone"] == "laterale_sinistro" && d["damage_type"] == "ammaccatura"));

    let (_, body) = call_json(&app, get(&format!("/api/v1/sessions/{}/details", id))).await;
    assert_eq!(body["data"]["analysis_status"], "completed");
    assert_eq!(body["data"]["damages"].as_array().unwrap().len(), 2);
}

#[actix_rt::test]
async fn test_rerun_replaces_previous_result() {
    let env = setup().await;
    let app = create_test_app(&env, AppOptions::default()).await;

    let session = create_session(&app, Some("rerun")).await;
    let id = session["id"].as_str().unwrap();
    upload_photo(&app, id, 0, "fronte").await;

    let runner = AnalysisRunner::new(env.pool.clone(), Arc::new(StubDamageAnalyzer));
    assert_eq!(runner.run(id).await.unwrap(), AnalysisStatus::Completed);
    let first = env.pool.get_analysis_for_session(id).await.unwrap().unwrap();

    assert_eq!(runner.run(id).await.unwrap(), AnalysisStatus::Completed);
    let second = env.pool.get_analysis_for_session(id).await.unwrap().unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(env.pool.get_damages(&second.id).await.unwrap().len(), 1);
    assert_eq!(
        env.pool
            .get_analyses_for_sessions(&[id.to_string()])
            .await
            .unwrap()
            .len(),
        1
    );
}

#[actix_rt::test]
async fn test_incomplete_session_is_not_advanced_by_analysis() {
    let env = setup().await;
    let app = create_test_app(&env, AppOptions::default()).await;

    let session = create_session(&app, None).await;
    let id = session["id"].as_str().unwrap();
    call_json(&app, post_empty(&format!("/api/v1/sessions/{}/incomplete", id))).await;

    let runner = AnalysisRunner::new(env.pool.clone(), Arc::new(StubDamageAnalyzer));
    runner.run(id).await.unwrap();

    assert_eq!(session_status(&app, id).await, "incomplete");
}

#[actix_rt::test]
async fn test_completing_twice_keeps_one_analysis() {
    let env = setup().await;
    let app = create_test_app(
        &env,
        AppOptions {
            analyzer: AnalyzerBackend::Stub,
            ..AppOptions::default()
        },
    )
    .await;

    let session = create_session(&app, Some("double-complete")).await;
    let id = session["id"].as_str().unwrap();
    upload_photo(&app, id, 0, "fronte").await;

    let uri = format!("/api/v1/sessions/{}/complete", id);
    let (first, _) = call_json(&app, post_empty(&uri)).await;
    let (second, _) = call_json(&app, post_empty(&uri)).await;
    assert_eq!(first, StatusCode::OK);
    assert_eq!(second, StatusCode::OK);

    // Both queued runs go through the single worker.
    wait_for_analysis(&app, id).await;
    tokio::time::sleep(std::time::Duration::from_millis(200)).await;
    let results = wait_for_analysis(&app, id).await;

    assert_eq!(results["analysis_status"], "completed");
    assert_eq!(results["damages"].as_array().unwrap().len(), 1);

    let analyses = env
        .pool
        .get_analyses_for_sessions(&[id.to_string()])
        .await
        .unwrap();
    assert_eq!(analyses.len(), 1);
    assert_eq!(env.pool.get_damages(&analyses[0].id).await.unwrap().len(), 1);
    assert_eq!(session_status(&app, id).await, "completed");
}
