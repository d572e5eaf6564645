//! Health check endpoint. Never requires an API key.

use actix_web::{HttpResponse, get, web};
use serde::Serialize;
use utoipa::ToSchema;

use crate::models::envelope;

pub const SERVICE_NAME: &str = "damage-detection-api";

/// Service identity.
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    service: &'static str,
    version: &'static str,
}

/// Health check endpoint.
///
/// Returns 200 if the service is running.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is running", body = HealthResponse)
    )
)]
#[get("/health")]
pub async fn health() -> HttpResponse {
    envelope::ok(HealthResponse {
        service: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Configure health routes (mounted at the root, outside `/api/v1`).
pub fn configure_health_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(health);
}
