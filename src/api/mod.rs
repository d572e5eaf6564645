//! API endpoint modules.

pub mod auth;
pub mod health;
pub mod openapi;
pub mod sessions;
pub mod vehicles;

use actix_web::error::{InternalError, JsonPayloadError};
use actix_web::{HttpRequest, HttpResponse, web};

use crate::models::Envelope;

pub use health::configure_health_routes;
pub use openapi::ApiDoc;
pub use sessions::UploadLimits;

pub const MSG_ROUTE_NOT_FOUND: &str = "Risorsa non trovata";

/// Mount every authenticated route. Call inside `web::scope("/api/v1")`.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(auth::configure_routes)
        .configure(vehicles::configure_routes)
        .configure(sessions::configure_routes);
}

/// JSON extractor config rendering malformed bodies as a 422 envelope.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(json_error_handler)
}

fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let message = format!("Richiesta non valida: {}", err);
    let response = HttpResponse::UnprocessableEntity().json(Envelope::error(message));
    InternalError::from_response(err, response).into()
}

/// Fallback for unknown routes.
pub async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(Envelope::error(MSG_ROUTE_NOT_FOUND))
}
