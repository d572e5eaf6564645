//! Inspection session endpoints.

use actix_multipart::{Field, Multipart};
use actix_web::{HttpResponse, web};
use futures_util::StreamExt;
use utoipa::ToSchema;

use crate::auth::ApiKeyAuth;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::{
    CreateSessionRequest, PhotoUploadResponse, SessionDetailResponse, SessionListItem,
    SessionResponse, SessionResultsResponse, envelope,
};
use crate::services::inspection::{self, PhotoUpload};
use crate::services::{AnalysisQueue, PhotoStore, PhotoValidator};

/// Text form fields are tiny; anything bigger is a broken client.
const MAX_TEXT_FIELD_BYTES: usize = 1024;

/// Per-request upload limits.
#[derive(Debug, Clone, Copy)]
pub struct UploadLimits {
    pub max_photo_size_bytes: usize,
}

/// Multipart body of a photo upload (documentation only).
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct PhotoUploadForm {
    /// Image bytes
    #[schema(value_type = String, format = Binary)]
    file: Vec<u8>,
    /// Camera position ordinal (0..3)
    angle_index: i32,
    /// Camera position tag, e.g. `fronte`, `lato_sinistro`
    angle_label: String,
}

/// Create an inspection session. Idempotent on a supplied `id`.
#[utoipa::path(
    post,
    path = "/api/v1/sessions",
    tag = "Sessions",
    request_body = CreateSessionRequest,
    responses(
        (status = 201, description = "Session created (or already existed)", body = SessionResponse),
        (status = 404, description = "Unknown vehicle or user", body = crate::models::ErrorEnvelope),
        (status = 422, description = "Supplied id cannot be used", body = crate::models::ErrorEnvelope),
        (status = 403, description = "Invalid or missing API key", body = crate::models::ErrorEnvelope),
    ),
    security(
        ("api_key" = [])
    )
)]
pub async fn create_session(
    _auth: ApiKeyAuth,
    pool: web::Data<DbPool>,
    body: web::Json<CreateSessionRequest>,
) -> AppResult<HttpResponse> {
    let session = inspection::create_session(&pool, body.into_inner()).await?;
    Ok(envelope::created(SessionResponse::from(session)))
}

/// Upload one photo for a camera angle.
#[utoipa::path(
    post,
    path = "/api/v1/sessions/{session_id}/photos",
    tag = "Sessions",
    params(
        ("session_id" = String, Path, description = "Session ID")
    ),
    request_body(content = PhotoUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Photo accepted", body = PhotoUploadResponse),
        (status = 404, description = "Session not found", body = crate::models::ErrorEnvelope),
        (status = 413, description = "Photo too large", body = crate::models::ErrorEnvelope),
        (status = 422, description = "Photo rejected or form incomplete", body = crate::models::ErrorEnvelope),
    ),
    security(
        ("api_key" = [])
    )
)]
pub async fn upload_photo(
    _auth: ApiKeyAuth,
    pool: web::Data<DbPool>,
    store: web::Data<PhotoStore>,
    validator: web::Data<dyn PhotoValidator>,
    limits: web::Data<UploadLimits>,
    path: web::Path<String>,
    mut payload: Multipart,
) -> AppResult<HttpResponse> {
    let session_id = path.into_inner();
    let form = read_photo_form(&mut payload, limits.max_photo_size_bytes).await?;

    let photo = inspection::accept_photo(
        &pool,
        &store,
        validator.get_ref(),
        PhotoUpload {
            session_id,
            angle_index: form.angle_index,
            angle_label: form.angle_label,
            data: form.file,
        },
    )
    .await?;

    Ok(envelope::created(PhotoUploadResponse { photo_id: photo.id }))
}

/// Finish photo collection and queue damage analysis.
#[utoipa::path(
    post,
    path = "/api/v1/sessions/{session_id}/complete",
    tag = "Sessions",
    params(
        ("session_id" = String, Path, description = "Session ID")
    ),
    responses(
        (status = 200, description = "Session uploaded, analysis queued", body = SessionResponse),
        (status = 404, description = "Session not found", body = crate::models::ErrorEnvelope),
    ),
    security(
        ("api_key" = [])
    )
)]
pub async fn complete_session(
    _auth: ApiKeyAuth,
    pool: web::Data<DbPool>,
    queue: web::Data<AnalysisQueue>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let session = inspection::complete_session(&pool, &queue, &path.into_inner()).await?;
    Ok(envelope::ok(SessionResponse::from(session)))
}

/// Close a session without analysis.
#[utoipa::path(
    post,
    path = "/api/v1/sessions/{session_id}/incomplete",
    tag = "Sessions",
    params(
        ("session_id" = String, Path, description = "Session ID")
    ),
    responses(
        (status = 200, description = "Session marked incomplete", body = SessionResponse),
        (status = 404, description = "Session not found", body = crate::models::ErrorEnvelope),
    ),
    security(
        ("api_key" = [])
    )
)]
pub async fn mark_incomplete(
    _auth: ApiKeyAuth,
    pool: web::Data<DbPool>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let session = inspection::mark_incomplete(&pool, &path.into_inner()).await?;
    Ok(envelope::ok(SessionResponse::from(session)))
}

/// List sessions with their analysis summary.
#[utoipa::path(
    get,
    path = "/api/v1/sessions",
    tag = "Sessions",
    responses(
        (status = 200, description = "Session list", body = Vec<SessionListItem>),
    ),
    security(
        ("api_key" = [])
    )
)]
pub async fn list_sessions(_auth: ApiKeyAuth, pool: web::Data<DbPool>) -> AppResult<HttpResponse> {
    let sessions = inspection::list_sessions(&pool).await?;
    Ok(envelope::ok(sessions))
}

/// Session with vehicle, photos and damages.
#[utoipa::path(
    get,
    path = "/api/v1/sessions/{session_id}/details",
    tag = "Sessions",
    params(
        ("session_id" = String, Path, description = "Session ID")
    ),
    responses(
        (status = 200, description = "Session details", body = SessionDetailResponse),
        (status = 404, description = "Session not found", body = crate::models::ErrorEnvelope),
    ),
    security(
        ("api_key" = [])
    )
)]
pub async fn get_session_details(
    _auth: ApiKeyAuth,
    pool: web::Data<DbPool>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let details = inspection::session_details(&pool, &path.into_inner()).await?;
    Ok(envelope::ok(details))
}

/// Analysis status and damages for a session.
#[utoipa::path(
    get,
    path = "/api/v1/sessions/{session_id}/results",
    tag = "Sessions",
    params(
        ("session_id" = String, Path, description = "Session ID")
    ),
    responses(
        (status = 200, description = "Analysis results", body = SessionResultsResponse),
        (status = 404, description = "Session not found", body = crate::models::ErrorEnvelope),
    ),
    security(
        ("api_key" = [])
    )
)]
pub async fn get_session_results(
    _auth: ApiKeyAuth,
    pool: web::Data<DbPool>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let results = inspection::session_results(&pool, &path.into_inner()).await?;
    Ok(envelope::ok(results))
}

/// Parsed photo upload form.
struct PhotoForm {
    file: Vec<u8>,
    angle_index: i32,
    angle_label: String,
}

fn missing_field(name: &str) -> AppError {
    AppError::Unprocessable(format!("Campo obbligatorio mancante: {}", name))
}

/// Read `file`, `angle_index` and `angle_label`, ignoring unknown fields.
async fn read_photo_form(payload: &mut Multipart, max_photo_size: usize) -> AppResult<PhotoForm> {
    let mut file: Option<Vec<u8>> = None;
    let mut angle_index: Option<String> = None;
    let mut angle_label: Option<String> = None;

    while let Some(item) = payload.next().await {
        let mut field =
            item.map_err(|e| AppError::Unprocessable(format!("Multipart error: {}", e)))?;

        let name = field
            .content_disposition()
            .and_then(|cd| cd.get_name())
            .map(str::to_owned)
            .unwrap_or_default();

        match name.as_str() {
            "file" => {
                let data = read_field(&mut field, max_photo_size).await.map_err(|e| match e {
                    FieldError::TooLarge => AppError::PayloadTooLarge(format!(
                        "La foto supera la dimensione massima di {} byte",
                        max_photo_size
                    )),
                    FieldError::Read(msg) => AppError::Unprocessable(msg),
                })?;
                file = Some(data);
            }
            "angle_index" => angle_index = Some(read_text_field(&mut field, "angle_index").await?),
            "angle_label" => angle_label = Some(read_text_field(&mut field, "angle_label").await?),
            _ => drain_field(&mut field).await,
        }
    }

    let file = file.ok_or_else(|| missing_field("file"))?;
    let angle_index = angle_index
        .ok_or_else(|| missing_field("angle_index"))?
        .trim()
        .parse::<i32>()
        .map_err(|_| AppError::Unprocessable("angle_index deve essere un numero intero".to_string()))?;
    let angle_label = angle_label.ok_or_else(|| missing_field("angle_label"))?;

    Ok(PhotoForm {
        file,
        angle_index,
        angle_label,
    })
}

enum FieldError {
    TooLarge,
    Read(String),
}

async fn read_field(field: &mut Field, limit: usize) -> Result<Vec<u8>, FieldError> {
    let mut data = Vec::new();
    while let Some(chunk) = field.next().await {
        let chunk = chunk.map_err(|e| FieldError::Read(format!("Read error: {}", e)))?;
        if data.len() + chunk.len() > limit {
            return Err(FieldError::TooLarge);
        }
        data.extend_from_slice(&chunk);
    }
    Ok(data)
}

async fn read_text_field(field: &mut Field, name: &str) -> AppResult<String> {
    let data = read_field(field, MAX_TEXT_FIELD_BYTES)
        .await
        .map_err(|_| AppError::Unprocessable(format!("Campo non valido: {}", name)))?;
    String::from_utf8(data).map_err(|_| AppError::Unprocessable(format!("Campo non valido: {}", name)))
}

/// Consume a field we don't use so the stream can advance.
async fn drain_field(field: &mut Field) {
    while let Some(chunk) = field.next().await {
        if chunk.is_err() {
            break;
        }
    }
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/sessions")
            .route(web::get().to(list_sessions))
            .route(web::post().to(create_session)),
    )
    .service(web::resource("/sessions/{session_id}/photos").route(web::post().to(upload_photo)))
    .service(
        web::resource("/sessions/{session_id}/complete").route(web::post().to(complete_session)),
    )
    .service(
        web::resource("/sessions/{session_id}/incomplete").route(web::post().to(mark_incomplete)),
    )
    .service(
        web::resource("/sessions/{session_id}/details").route(web::get().to(get_session_details)),
    )
    .service(
        web::resource("/sessions/{session_id}/results").route(web::get().to(get_session_results)),
    );
}
