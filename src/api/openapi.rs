//! OpenAPI documentation configuration.

use utoipa::OpenApi;

use crate::{api, models};

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Damage Inspection API",
        description = "Vehicle damage inspection sessions: photo intake, validation and AI damage analysis"
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    paths(
        api::health::health,
        api::auth::login,
        api::vehicles::list_vehicles,
        api::sessions::create_session,
        api::sessions::upload_photo,
        api::sessions::complete_session,
        api::sessions::mark_incomplete,
        api::sessions::list_sessions,
        api::sessions::get_session_details,
        api::sessions::get_session_results,
    ),
    components(
        schemas(
            models::ErrorEnvelope,
            api::health::HealthResponse,
            models::LoginRequest,
            models::LoginResponse,
            models::VehicleResponse,
            models::CreateSessionRequest,
            models::SessionResponse,
            models::SessionStatus,
            models::SessionListItem,
            models::SessionDetailResponse,
            models::SessionResultsResponse,
            models::PhotoSummary,
            models::PhotoUploadResponse,
            api::sessions::PhotoUploadForm,
            models::AnalysisStatus,
            models::DamageView,
            models::DamageType,
            models::Severity,
            models::Zone,
        )
    ),
    tags(
        (name = "Health", description = "Service health"),
        (name = "Auth", description = "Operator login"),
        (name = "Vehicles", description = "Fleet vehicles"),
        (name = "Sessions", description = "Inspection sessions, photos and analysis results")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Add API key security scheme.
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "api_key",
                utoipa::openapi::security::SecurityScheme::ApiKey(
                    utoipa::openapi::security::ApiKey::Header(
                        utoipa::openapi::security::ApiKeyValue::new(crate::config::API_KEY_HEADER),
                    ),
                ),
            );
        }
    }
}
