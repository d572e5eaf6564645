//! Operator login.

use actix_web::{HttpResponse, web};

use crate::auth::ApiKeyAuth;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::{LoginRequest, LoginResponse, envelope};
use crate::services::password::verify_login;

/// Same message for unknown user and wrong password.
pub const MSG_INVALID_CREDENTIALS: &str = "Credenziali non valide";

/// Log in with username and password.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Credentials accepted", body = LoginResponse),
        (status = 400, description = "Invalid credentials", body = crate::models::ErrorEnvelope),
        (status = 403, description = "Invalid or missing API key", body = crate::models::ErrorEnvelope),
    ),
    security(
        ("api_key" = [])
    )
)]
pub async fn login(
    _auth: ApiKeyAuth,
    pool: web::Data<DbPool>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let LoginRequest { username, password } = body.into_inner();

    let user = pool.find_user_by_username(&username).await?;

    // Argon2 is CPU-bound; keep it off the async workers. Unknown users
    // still pay for one verification.
    let stored_hash = user.as_ref().map(|u| u.password_hash.clone());
    let verified = web::block(move || verify_login(&password, stored_hash.as_deref()))
        .await
        .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))?;

    let Some(user) = user.filter(|_| verified) else {
        return Err(AppError::InvalidInput(MSG_INVALID_CREDENTIALS.to_string()));
    };

    Ok(envelope::ok(LoginResponse {
        user_id: user.id,
        username: user.username,
    }))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/auth/login").route(web::post().to(login)));
}
