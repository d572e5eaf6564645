//! Actix-web extractor enforcing the API key.

use std::future::{Ready, ready};

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest, web};
use tracing::{error, warn};

use super::{ApiKeyGuard, MSG_INVALID_API_KEY};
use crate::config::API_KEY_HEADER;
use crate::error::AppError;

/// Extractor that requires the configured API key.
///
/// Add it as a handler argument; the handler only runs if the check passes:
/// ```ignore
/// async fn list_vehicles(_auth: ApiKeyAuth, pool: web::Data<DbPool>) -> AppResult<HttpResponse> {
///     // ...
/// }
/// ```
pub struct ApiKeyAuth;

impl FromRequest for ApiKeyAuth {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let Some(guard) = req.app_data::<web::Data<ApiKeyGuard>>() else {
            error!("ApiKeyGuard is not registered as app data");
            return ready(Err(AppError::Internal(
                "API key guard not configured".to_string(),
            )));
        };

        // A header that is not valid UTF-8 counts as missing
        let provided = req
            .headers()
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok());

        if guard.verify(provided) {
            ready(Ok(ApiKeyAuth))
        } else {
            warn!(path = %req.path(), "Rejected request with invalid or missing API key");
            ready(Err(AppError::Forbidden(MSG_INVALID_API_KEY.to_string())))
        }
    }
}
