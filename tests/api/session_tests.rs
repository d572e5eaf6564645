//! Vehicle listing and session lifecycle.

use actix_web::http::StatusCode;
use damage_inspection_lib::db::seed::seed_id;
use damage_inspection_lib::services::inspection::{
    MSG_SESSION_NOT_FOUND, MSG_USER_NOT_FOUND, MSG_VEHICLE_NOT_FOUND,
};
use serde_json::json;

use super::helpers::*;

#[actix_rt::test]
async fn test_list_vehicles_returns_seed_fleet() {
    let env = setup().await;
    let app = create_test_app(&env, AppOptions::default()).await;

    let (status, body) = call_json(&app, get("/api/v1/vehicles")).await;
    assert_eq!(status, StatusCode::OK);

    let vehicles = body["data"].as_array().unwrap();
    assert_eq!(vehicles.len(), 4);

    let pulse = vehicles
        .iter()
        .find(|v| v["id"] == pulse_vehicle_id())
        .expect("seeded pulse vehicle");
    assert_eq!(pulse["type"], "pulse");
    assert_eq!(pulse["plate"], "AB12345");
}

#[actix_rt::test]
async fn test_create_session_starts_in_progress() {
    let env = setup().await;
    let app = create_test_app(&env, AppOptions::default()).await;

    let session = create_session(&app, None).await;

    assert!(!session["id"].as_str().unwrap().is_empty());
    assert_eq!(session["status"], "in_progress");
    assert_eq!(session["total_photos"], 4);
    assert_eq!(session["valid_photos"], 0);
    assert_eq!(session["vehicle_id"], pulse_vehicle_id());
    assert!(session["completed_at"].is_null());
}

#[actix_rt::test]
async fn test_create_session_is_idempotent_on_id() {
    let env = setup().await;
    let app = create_test_app(&env, AppOptions::default()).await;

    let first = create_session(&app, Some("offline-session-1")).await;
    let second = create_session(&app, Some("offline-session-1")).await;

    assert_eq!(first["id"], "offline-session-1");
    assert_eq!(first, second);

    let (_, body) = call_json(&app, get("/api/v1/sessions")).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[actix_rt::test]
async fn test_supplied_session_id_must_be_storable() {
    let env = setup().await;
    let app = create_test_app(&env, AppOptions::default()).await;

    let session = create_session(&app, Some("ispezione..2026")).await;
    assert_eq!(session["id"], "ispezione..2026");
    let (status, _) = upload_photo(&app, "ispezione..2026", 0, "fronte").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(stored_files(&env, "ispezione..2026").len(), 1);

    for bad in ["a/b", ".."] {
        let (status, body) = call_json(
            &app,
            post_json(
                "/api/v1/sessions",
                json!({"id": bad, "vehicle_id": pulse_vehicle_id(), "user_id": operator_id()}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["message"], format!("Identificativo non valido: {}", bad));
    }

    let (_, body) = call_json(&app, get("/api/v1/sessions")).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[actix_rt::test]
async fn test_create_session_unknown_references() {
    let env = setup().await;
    let app = create_test_app(&env, AppOptions::default()).await;

    let (status, body) = call_json(
        &app,
        post_json(
            "/api/v1/sessions",
            json!({"vehicle_id": "missing", "user_id": operator_id()}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], MSG_VEHICLE_NOT_FOUND);

    let (status, body) = call_json(
        &app,
        post_json(
            "/api/v1/sessions",
            json!({"vehicle_id": pulse_vehicle_id(), "user_id": "missing"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], MSG_USER_NOT_FOUND);

    let (_, body) = call_json(&app, get("/api/v1/sessions")).await;
    assert_eq!(body["data"], json!([]));
}

#[actix_rt::test]
async fn test_unknown_session_operations_are_404() {
    let env = setup().await;
    let app = create_test_app(&env, AppOptions::default()).await;

    for uri in [
        "/api/v1/sessions/nope/complete",
        "/api/v1/sessions/nope/incomplete",
    ] {
        let (status, body) = call_json(&app, post_empty(uri)).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(body["message"], MSG_SESSION_NOT_FOUND);
    }

    for uri in [
        "/api/v1/sessions/nope/details",
        "/api/v1/sessions/nope/results",
    ] {
        let (status, body) = call_json(&app, get(uri)).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(body["message"], MSG_SESSION_NOT_FOUND);
    }
}

#[actix_rt::test]
async fn test_mark_incomplete_recounts_photos() {
    let env = setup().await;
    let app = create_test_app(&env, AppOptions::default()).await;

    let session = create_session(&app, None).await;
    let id = session["id"].as_str().unwrap();

    let (status, _) = upload_photo(&app, id, 0, "fronte").await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = upload_photo(&app, id, 1, "lato_sinistro").await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) =
        call_json(&app, post_empty(&format!("/api/v1/sessions/{}/incomplete", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "incomplete");
    assert_eq!(body["data"]["valid_photos"], 2);
    assert!(body["data"]["completed_at"].is_string());

    // No analysis is triggered for incomplete sessions
    let (_, body) = call_json(&app, get(&format!("/api/v1/sessions/{}/results", id))).await;
    assert_eq!(body["data"]["analysis_status"], "pending");
    assert_eq!(body["data"]["damages"], json!([]));
}

#[actix_rt::test]
async fn test_results_pending_before_completion() {
    let env = setup().await;
    let app = create_test_app(&env, AppOptions::default()).await;

    let session = create_session(&app, None).await;
    let id = session["id"].as_str().unwrap();

    let (status, body) =
        call_json(&app, get(&format!("/api/v1/sessions/{}/results", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["data"],
        json!({"analysis_status": "pending", "damages": []})
    );
}

#[actix_rt::test]
async fn test_session_details_shape() {
    let env = setup().await;
    let app = create_test_app(&env, AppOptions::default()).await;

    let session = create_session(&app, None).await;
    let id = session["id"].as_str().unwrap();
    upload_photo(&app, id, 2, "retro").await;

    let (status, body) =
        call_json(&app, get(&format!("/api/v1/sessions/{}/details", id))).await;
    assert_eq!(status, StatusCode::OK);

    let data = &body["data"];
    assert_eq!(data["session"]["id"], id);
    assert_eq!(data["vehicle"]["id"], pulse_vehicle_id());
    assert_eq!(data["vehicle"]["type"], "pulse");
    assert_eq!(data["analysis_status"], "pending");
    assert_eq!(data["damages"], json!([]));

    let photos = data["photos"].as_array().unwrap();
    assert_eq!(photos.len(), 1);
    assert_eq!(photos[0]["angle_index"], 2);
    assert_eq!(photos[0]["angle_label"], "retro");
    assert_eq!(photos[0]["upload_status"], "uploaded");
    assert_eq!(photos[0]["is_valid"], true);
}

#[actix_rt::test]
async fn test_list_sessions_includes_summary_fields() {
    let env = setup().await;
    let app = create_test_app(&env, AppOptions::default()).await;

    create_session(&app, Some("s-a")).await;
    call_json(
        &app,
        post_json(
            "/api/v1/sessions",
            json!({
                "id": "s-b",
                "vehicle_id": seed_id("vehicle-hurba-001"),
                "user_id": operator_id(),
            }),
        ),
    )
    .await;

    let (status, body) = call_json(&app, get("/api/v1/sessions")).await;
    assert_eq!(status, StatusCode::OK);

    let items = body["data"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    for item in items {
        assert_eq!(item["analysis_status"], "pending");
        assert_eq!(item["damage_types"], json!([]));
        assert_eq!(item["damage_count"], 0);
        assert_eq!(item["status"], "in_progress");
    }
}
