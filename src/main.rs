//! Damage inspection server - main entry point.
//!
//! Starts the Actix-web server with configured routes, middleware and the
//! background analysis worker.

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, http::header, web};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use secrecy::ExposeSecret;

use damage_inspection_lib::api::{self, ApiDoc, UploadLimits};
use damage_inspection_lib::auth::ApiKeyGuard;
use damage_inspection_lib::config::{API_KEY_HEADER, Config};
use damage_inspection_lib::db::DbPool;
use damage_inspection_lib::middleware::RequestLogger;
use damage_inspection_lib::services::{
    AnalysisQueue, AnalysisRunner, PhotoStore, PhotoValidator, VisionClient, VisionPhotoValidator,
    analyzer_for, start_analysis_worker,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber).map_err(std::io::Error::other)?;

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            error!("");
            error!("Please check your environment variables:");
            error!("  - RUST_ENV must be set to 'development' or 'production'");
            error!("  - In production, DATABASE_URL and API_KEY must be set");
            std::process::exit(1);
        }
    };

    info!("========================================");
    info!("  Damage Inspection Server");
    info!("  Environment: {}", config.environment);
    info!("========================================");

    if config.is_development() {
        warn!("Running in DEVELOPMENT mode - do not use in production!");
    }

    // Photo storage
    let store = PhotoStore::new(config.sessions_dir());
    tokio::fs::create_dir_all(store.root()).await?;
    info!("Photo storage at {}", store.root().display());

    // Database
    let pool = DbPool::new(&config).await.map_err(std::io::Error::other)?;
    info!("Database connection established");
    pool.run_migrations().await.map_err(std::io::Error::other)?;

    if config.seed && pool.seed_if_empty().await.map_err(std::io::Error::other)? {
        info!("Seed vehicles and operator account inserted");
    }

    // Vision provider, validator and analyzer
    let vision = VisionClient::new(&config.provider).map_err(std::io::Error::other)?;
    if vision.is_configured() {
        info!(model = %config.provider.model, "Vision provider configured");
    } else {
        warn!("OPENAI_API_KEY is empty - photo validation disabled, vision analysis will fail");
    }

    let validator: Arc<dyn PhotoValidator> = Arc::new(VisionPhotoValidator::new(vision.clone()));
    let analyzer = analyzer_for(config.analyzer, vision, store.clone());
    info!(analyzer = analyzer.name(), "Damage analyzer selected");

    // Analysis worker
    let runner =
        AnalysisRunner::new(pool.clone(), analyzer).with_provider_key(config.provider.api_key.expose_secret());
    let (queue, receiver) = AnalysisQueue::channel();
    start_analysis_worker(runner, receiver);

    // Prepare shared state
    let bind_address = config.bind_address();
    let api_key_guard = ApiKeyGuard::new(config.api_key.expose_secret());
    if !api_key_guard.is_enabled() {
        warn!("API_KEY is empty - API key check disabled");
    }
    let upload_limits = UploadLimits {
        max_photo_size_bytes: config.max_photo_size_bytes,
    };
    let cors_origins = config.cors_origins.clone();
    let validator = web::Data::from(validator);
    let openapi = ApiDoc::openapi();

    let worker_count = if config.is_development() {
        4
    } else {
        num_cpus::get()
    };
    info!(
        "Starting server at http://{} ({} workers)",
        bind_address, worker_count
    );

    let server = HttpServer::new(move || {
        let cors = cors_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST", "OPTIONS"])
            .allowed_headers(vec![header::ACCEPT, header::CONTENT_TYPE])
            .allowed_header(API_KEY_HEADER)
            .supports_credentials()
            .max_age(3600);

        App::new()
            // Add CORS middleware (must be before other middleware)
            .wrap(cors)
            .wrap(RequestLogger)
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(store.clone()))
            .app_data(web::Data::new(queue.clone()))
            .app_data(web::Data::new(api_key_guard.clone()))
            .app_data(web::Data::new(upload_limits))
            .app_data(validator.clone())
            .app_data(api::json_config())
            .configure(api::configure_health_routes)
            .service(web::scope("/api/v1").configure(api::configure_routes))
            .service(
                SwaggerUi::new("/docs/{_:.*}").url("/api-docs/openapi.json", openapi.clone()),
            )
            .default_service(web::route().to(api::not_found))
    });

    server.workers(worker_count).bind(&bind_address)?.run().await
}
