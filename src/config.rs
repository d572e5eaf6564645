//! Application configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

use secrecy::{ExposeSecret, SecretString};

/// HTTP header name for API key authentication.
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Development default values - NEVER use in production.
pub mod defaults {
    pub const DEV_DATABASE_URL: &str = "sqlite://./data/db.sqlite3?mode=rwc";
    pub const DEV_HOST: &str = "127.0.0.1";
    pub const DEV_PORT: u16 = 8000;
    pub const DEV_DB_MAX_CONNECTIONS: u32 = 5;
    pub const DEV_DATA_DIR: &str = "./data";
    pub const DEV_MAX_PHOTO_SIZE_BYTES: usize = 2 * 1024 * 1024; // 2MB
    pub const DEV_CORS_ORIGINS: &str = "http://localhost:8000,http://192.168.1.200:8000";

    // Vision provider defaults
    pub const DEV_PROVIDER_BASE_URL: &str = "https://api.openai.com/v1";
    pub const DEV_PROVIDER_MODEL: &str = "gpt-4o-mini";
    pub const DEV_PROVIDER_TIMEOUT_SECS: u64 = 60;
}

/// Runtime environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    /// Parse environment from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Some(Self::Development),
            "production" | "prod" => Some(Self::Production),
            _ => None,
        }
    }

    /// Check if this is a development environment.
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    /// Check if this is a production environment.
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
        }
    }
}

/// Which damage analyzer backs the analysis worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyzerBackend {
    /// Hosted vision model (requires a provider credential).
    Vision,
    /// Deterministic rules keyed on angle labels. Opt-in only.
    Stub,
}

impl AnalyzerBackend {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "vision" | "openai" => Some(Self::Vision),
            "stub" | "mock" => Some(Self::Stub),
            _ => None,
        }
    }
}

/// Hosted vision provider settings (OpenAI-compatible chat completions).
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    /// Provider credential. Empty means "not configured".
    pub api_key: SecretString,
    /// Model name sent with every request
    pub model: String,
    /// Base URL, e.g. `https://api.openai.com/v1`
    pub base_url: String,
    /// Outbound request timeout in seconds
    pub timeout_secs: u64,
}

impl ProviderSettings {
    /// Whether a provider credential is configured.
    pub fn is_configured(&self) -> bool {
        !self.api_key.expose_secret().trim().is_empty()
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Runtime environment
    pub environment: Environment,
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Database URL (SQLite or PostgreSQL connection string)
    pub database_url: String,
    /// Maximum pooled database connections
    pub db_max_connections: u32,
    /// Shared secret expected in `X-API-Key`. Empty disables the check.
    pub api_key: SecretString,
    /// Root directory for stored photos
    pub data_dir: PathBuf,
    /// Maximum size of a single uploaded photo in bytes (default: 2MB)
    pub max_photo_size_bytes: usize,
    /// Allowed CORS origins
    pub cors_origins: Vec<String>,
    /// Insert seed vehicles and user into an empty database
    pub seed: bool,
    /// Damage analyzer backend
    pub analyzer: AnalyzerBackend,
    /// Vision provider settings
    pub provider: ProviderSettings,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// In development mode (RUST_ENV=development) every variable has a default
    /// and only RUST_ENV is required. In production mode the server will not
    /// start with the development database URL or without an API key.
    ///
    /// Environment variables:
    /// - `RUST_ENV`: Environment (development/production) - REQUIRED
    /// - `DD_HOST`: Server host (default: 127.0.0.1)
    /// - `DD_PORT`: Server port (default: 8000)
    /// - `DATABASE_URL`: SeaORM connection string (default: local SQLite file)
    /// - `DD_DB_MAX_CONNECTIONS`: Pool size (default: 5)
    /// - `API_KEY`: Shared API key (empty = no auth check)
    /// - `DATA_DIR`: Photo storage root (default: ./data)
    /// - `MAX_PHOTO_SIZE_BYTES`: Per-photo size limit (default: 2MB)
    /// - `CORS_ORIGINS`: Comma-separated allowed origins
    /// - `DD_SEED`: Seed an empty database (default: true)
    /// - `DD_ANALYZER`: `vision` or `stub` (default: vision)
    /// - `OPENAI_API_KEY`: Vision provider credential (empty = not configured)
    /// - `OPENAI_MODEL`: Vision model (default: gpt-4o-mini)
    /// - `OPENAI_BASE_URL`: Provider base URL
    /// - `DD_PROVIDER_TIMEOUT_SECS`: Provider request timeout (default: 60)
    pub fn from_env() -> Result<Self, ConfigError> {
        // Parse environment - required
        let env_str = env::var("RUST_ENV").map_err(|_| ConfigError::MissingEnvVar("RUST_ENV"))?;

        let environment = Environment::parse(&env_str).ok_or(ConfigError::InvalidValue(
            "RUST_ENV must be 'development' or 'production'",
        ))?;

        let host = env::var("DD_HOST").unwrap_or_else(|_| defaults::DEV_HOST.to_string());

        let port = env::var("DD_PORT")
            .unwrap_or_else(|_| defaults::DEV_PORT.to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidValue("DD_PORT must be a valid port number"))?;

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| defaults::DEV_DATABASE_URL.to_string());

        let db_max_connections = env::var("DD_DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| defaults::DEV_DB_MAX_CONNECTIONS.to_string())
            .parse::<u32>()
            .map_err(|_| ConfigError::InvalidValue("DD_DB_MAX_CONNECTIONS must be a valid number"))?;

        let api_key = SecretString::from(env::var("API_KEY").unwrap_or_default());

        let data_dir = PathBuf::from(
            env::var("DATA_DIR").unwrap_or_else(|_| defaults::DEV_DATA_DIR.to_string()),
        );

        let max_photo_size_bytes = env::var("MAX_PHOTO_SIZE_BYTES")
            .unwrap_or_else(|_| defaults::DEV_MAX_PHOTO_SIZE_BYTES.to_string())
            .parse::<usize>()
            .map_err(|_| ConfigError::InvalidValue("MAX_PHOTO_SIZE_BYTES must be a valid number"))?;

        let cors_origins = parse_list(
            &env::var("CORS_ORIGINS").unwrap_or_else(|_| defaults::DEV_CORS_ORIGINS.to_string()),
        );

        let seed = match env::var("DD_SEED") {
            Ok(v) => parse_bool(&v)
                .ok_or(ConfigError::InvalidValue("DD_SEED must be true or false"))?,
            Err(_) => true,
        };

        let analyzer = match env::var("DD_ANALYZER") {
            Ok(v) => AnalyzerBackend::parse(&v)
                .ok_or(ConfigError::InvalidValue("DD_ANALYZER must be 'vision' or 'stub'"))?,
            Err(_) => AnalyzerBackend::Vision,
        };

        let provider = ProviderSettings {
            api_key: SecretString::from(env::var("OPENAI_API_KEY").unwrap_or_default()),
            model: env::var("OPENAI_MODEL")
                .unwrap_or_else(|_| defaults::DEV_PROVIDER_MODEL.to_string()),
            base_url: env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| defaults::DEV_PROVIDER_BASE_URL.to_string()),
            timeout_secs: env::var("DD_PROVIDER_TIMEOUT_SECS")
                .unwrap_or_else(|_| defaults::DEV_PROVIDER_TIMEOUT_SECS.to_string())
                .parse::<u64>()
                .map_err(|_| {
                    ConfigError::InvalidValue("DD_PROVIDER_TIMEOUT_SECS must be a valid number")
                })?,
        };

        let config = Config {
            environment,
            host,
            port,
            database_url,
            db_max_connections,
            api_key,
            data_dir,
            max_photo_size_bytes,
            cors_origins,
            seed,
            analyzer,
            provider,
        };

        // Validate production configuration
        if environment.is_production() {
            config.validate_production()?;
        }

        Ok(config)
    }

    /// Validate that production configuration does not use development defaults.
    fn validate_production(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.database_url == defaults::DEV_DATABASE_URL {
            errors.push(format!(
                "DATABASE_URL is using development default '{}'. Set a production database URL.",
                defaults::DEV_DATABASE_URL
            ));
        }

        if !self.is_auth_enabled() {
            errors.push(
                "API_KEY is empty. Authentication cannot be disabled in production.".to_string(),
            );
        }

        if !errors.is_empty() {
            return Err(ConfigError::ProductionValidation(errors));
        }

        Ok(())
    }

    /// Get the server bind address.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Whether an `X-API-Key` secret is configured.
    pub fn is_auth_enabled(&self) -> bool {
        !self.api_key.expose_secret().trim().is_empty()
    }

    /// Check if running in development mode.
    pub fn is_development(&self) -> bool {
        self.environment.is_development()
    }

    /// Directory holding every session's photo folder.
    pub fn sessions_dir(&self) -> PathBuf {
        self.data_dir.join("sessions")
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(&'static str),

    #[error("Production configuration validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    ProductionValidation(Vec<String>),
}
