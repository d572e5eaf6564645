//! Photo upload: storage, validation gate and form errors.

use actix_web::http::StatusCode;
use damage_inspection_lib::services::photo_validator::REASON_NO_CREDENTIAL;

use super::helpers::*;
use super::mock_provider::MockVisionProvider;

#[actix_rt::test]
async fn test_upload_without_credential_is_accepted() {
    let env = setup().await;
    let app = create_test_app(&env, AppOptions::default()).await;

    let session = create_session(&app, None).await;
    let id = session["id"].as_str().unwrap();

    let (status, body) = upload_photo(&app, id, 0, "fronte").await;
    assert_eq!(status, StatusCode::CREATED);
    let photo_id = body["data"]["photo_id"].as_str().unwrap().to_string();

    let photos = env.pool.get_photos_for_session(id).await.unwrap();
    assert_eq!(photos.len(), 1);
    assert_eq!(photos[0].id, photo_id);
    assert!(photos[0].is_valid);
    assert_eq!(photos[0].validation_message.as_deref(), Some(REASON_NO_CREDENTIAL));

    let path = env.store.photo_path(id, &photo_id).unwrap();
    assert_eq!(photos[0].file_path, path.to_string_lossy());
    assert_eq!(
        std::fs::read(&path).unwrap(),
        b"\xFF\xD8\xFF\xE0fake-jpeg-bytes"
    );
}

#[actix_rt::test]
async fn test_accepted_by_provider_sends_image() {
    let provider = MockVisionProvider::start().await;
    let env = setup().await;
    let app = create_test_app(&env, AppOptions::with_provider(&provider.base_url)).await;

    let session = create_session(&app, None).await;
    let id = session["id"].as_str().unwrap();

    let (status, _) = upload_photo(&app, id, 0, "fronte").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(provider.request_count(), 1);

    let request = provider.last_request().unwrap();
    let image_url = request
        .pointer("/messages/0/content/1/image_url/url")
        .and_then(|v| v.as_str())
        .unwrap();
    assert!(image_url.starts_with("data:image/jpeg;base64,"));

    let photos = env.pool.get_photos_for_session(id).await.unwrap();
    assert_eq!(
        photos[0].validation_message.as_deref(),
        Some("Veicolo riconosciuto")
    );
}

#[actix_rt::test]
async fn test_rejected_photo_leaves_nothing_behind() {
    let provider = MockVisionProvider::start().await;
    provider.set_validation_reply(
        "```json\n{\"valid\": false, \"reason\": \"Nessun veicolo visibile\"}\n```",
    );
    let env = setup().await;
    let app = create_test_app(&env, AppOptions::with_provider(&provider.base_url)).await;

    let session = create_session(&app, None).await;
    let id = session["id"].as_str().unwrap();

    let (status, body) = upload_photo(&app, id, 0, "fronte").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "Foto non valida: Nessun veicolo visibile");

    assert!(env.pool.get_photos_for_session(id).await.unwrap().is_empty());
    assert!(stored_files(&env, id).is_empty());
}

#[actix_rt::test]
async fn test_provider_failure_fails_open() {
    let provider = MockVisionProvider::start().await;
    provider.fail_with(500, "upstream exploded");
    let env = setup().await;
    let app = create_test_app(&env, AppOptions::with_provider(&provider.base_url)).await;

    let session = create_session(&app, None).await;
    let id = session["id"].as_str().unwrap();

    let (status, _) = upload_photo(&app, id, 0, "fronte").await;
    assert_eq!(status, StatusCode::CREATED);

    let photos = env.pool.get_photos_for_session(id).await.unwrap();
    assert_eq!(photos.len(), 1);
    assert!(
        photos[0]
            .validation_message
            .as_deref()
            .unwrap()
            .starts_with("Errore validazione")
    );
}

#[actix_rt::test]
async fn test_upload_to_unknown_session() {
    let env = setup().await;
    let app = create_test_app(&env, AppOptions::default()).await;

    let (status, body) = upload_photo(&app, "ghost", 0, "fronte").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Sessione non trovata");
    assert!(stored_files(&env, "ghost").is_empty());
}

#[actix_rt::test]
async fn test_missing_form_fields_are_422() {
    let env = setup().await;
    let app = create_test_app(&env, AppOptions::default()).await;

    let session = create_session(&app, None).await;
    let id = session["id"].as_str().unwrap();

    let body = multipart_body(Some(b"jpeg"), Some("0"), None);
    let (status, body) = call_json(&app, upload_request(id, body)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["message"], "Campo obbligatorio mancante: angle_label");

    let body = multipart_body(None, Some("0"), Some("fronte"));
    let (status, body) = call_json(&app, upload_request(id, body)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["message"], "Campo obbligatorio mancante: file");

    let body = multipart_body(Some(b"jpeg"), Some("zero"), Some("fronte"));
    let (status, _) = call_json(&app, upload_request(id, body)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    assert!(env.pool.get_photos_for_session(id).await.unwrap().is_empty());
}

#[actix_rt::test]
async fn test_oversized_photo_is_413() {
    let env = setup().await;
    let app = create_test_app(
        &env,
        AppOptions {
            max_photo_size_bytes: 16,
            ..AppOptions::default()
        },
    )
    .await;

    let session = create_session(&app, None).await;
    let id = session["id"].as_str().unwrap();

    let big = vec![0xABu8; 64];
    let body = multipart_body(Some(&big), Some("0"), Some("fronte"));
    let (status, body) = call_json(&app, upload_request(id, body)).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["status"], "error");
    assert!(env.pool.get_photos_for_session(id).await.unwrap().is_empty());
    assert!(stored_files(&env, id).is_empty());
}
