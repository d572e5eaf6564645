//! API key guard, login and envelope edge cases.

use actix_web::http::StatusCode;
use actix_web::test;
use damage_inspection_lib::api::MSG_ROUTE_NOT_FOUND;
use damage_inspection_lib::auth::MSG_INVALID_API_KEY;
use damage_inspection_lib::config::API_KEY_HEADER;
use damage_inspection_lib::db::seed::{SEED_PASSWORD, SEED_USERNAME};
use serde_json::json;

use super::helpers::*;

#[actix_rt::test]
async fn test_health_needs_no_key() {
    let env = setup().await;
    let app = create_test_app(&env, AppOptions::default()).await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let (status, body) = call_json(&app, req).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"]["service"], "damage-detection-api");
    assert!(body["data"]["version"].is_string());
}

#[actix_rt::test]
async fn test_missing_or_wrong_key_is_forbidden() {
    let env = setup().await;
    let app = create_test_app(&env, AppOptions::default()).await;

    let req = test::TestRequest::get().uri("/api/v1/vehicles").to_request();
    let (status, body) = call_json(&app, req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], MSG_INVALID_API_KEY);
    assert!(body["data"].is_null());

    let req = test::TestRequest::get()
        .uri("/api/v1/vehicles")
        .insert_header((API_KEY_HEADER, "not-the-key"))
        .to_request();
    let (status, body) = call_json(&app, req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], MSG_INVALID_API_KEY);
}

#[actix_rt::test]
async fn test_empty_configured_key_disables_guard() {
    let env = setup().await;
    let app = create_test_app(
        &env,
        AppOptions {
            api_key: String::new(),
            ..AppOptions::default()
        },
    )
    .await;

    let req = test::TestRequest::get().uri("/api/v1/vehicles").to_request();
    let (status, _) = call_json(&app, req).await;
    assert_eq!(status, StatusCode::OK);
}

#[actix_rt::test]
async fn test_login_with_seeded_operator() {
    let env = setup().await;
    let app = create_test_app(&env, AppOptions::default()).await;

    let (status, body) = call_json(
        &app,
        post_json(
            "/api/v1/auth/login",
            json!({"username": SEED_USERNAME, "password": SEED_PASSWORD}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["username"], SEED_USERNAME);
    assert_eq!(body["data"]["user_id"], operator_id());
}

#[actix_rt::test]
async fn test_login_failures_are_indistinguishable() {
    let env = setup().await;
    let app = create_test_app(&env, AppOptions::default()).await;

    let (wrong_pw_status, wrong_pw_body) = call_json(
        &app,
        post_json(
            "/api/v1/auth/login",
            json!({"username": SEED_USERNAME, "password": "sbagliata"}),
        ),
    )
    .await;

    let (unknown_status, unknown_body) = call_json(
        &app,
        post_json(
            "/api/v1/auth/login",
            json!({"username": "nessuno", "password": SEED_PASSWORD}),
        ),
    )
    .await;

    assert_eq!(wrong_pw_status, StatusCode::BAD_REQUEST);
    assert_eq!(unknown_status, StatusCode::BAD_REQUEST);
    assert_eq!(wrong_pw_body, unknown_body);
    assert_eq!(wrong_pw_body["message"], "Credenziali non valide");
}

#[actix_rt::test]
async fn test_login_requires_api_key() {
    let env = setup().await;
    let app = create_test_app(&env, AppOptions::default()).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(json!({"username": SEED_USERNAME, "password": SEED_PASSWORD}))
        .to_request();
    let (status, _) = call_json(&app, req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_rt::test]
async fn test_malformed_json_is_422_envelope() {
    let env = setup().await;
    let app = create_test_app(&env, AppOptions::default()).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .insert_header((API_KEY_HEADER, TEST_API_KEY))
        .insert_header(("content-type", "application/json"))
        .set_payload("{\"username\": ")
        .to_request();
    let (status, body) = call_json(&app, req).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["status"], "error");
    assert!(
        body["message"]
            .as_str()
            .unwrap()
            .starts_with("Richiesta non valida")
    );
}

#[actix_rt::test]
async fn test_unknown_route_is_404_envelope() {
    let env = setup().await;
    let app = create_test_app(&env, AppOptions::default()).await;

    let (status, body) = call_json(&app, get("/api/v1/does-not-exist")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], MSG_ROUTE_NOT_FOUND);
}
