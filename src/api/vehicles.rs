//! Vehicle endpoints.

use actix_web::{HttpResponse, web};

use crate::auth::ApiKeyAuth;
use crate::db::DbPool;
use crate::error::AppResult;
use crate::models::{VehicleResponse, envelope};

/// List all vehicles.
#[utoipa::path(
    get,
    path = "/api/v1/vehicles",
    tag = "Vehicles",
    responses(
        (status = 200, description = "Vehicle list", body = Vec<VehicleResponse>),
        (status = 403, description = "Invalid or missing API key", body = crate::models::ErrorEnvelope),
    ),
    security(
        ("api_key" = [])
    )
)]
pub async fn list_vehicles(_auth: ApiKeyAuth, pool: web::Data<DbPool>) -> AppResult<HttpResponse> {
    let vehicles: Vec<VehicleResponse> = pool
        .list_vehicles()
        .await?
        .into_iter()
        .map(VehicleResponse::from)
        .collect();

    Ok(envelope::ok(vehicles))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/vehicles").route(web::get().to(list_vehicles)));
}
