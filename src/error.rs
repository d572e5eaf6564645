//! Domain error types for the inspection server.
//!
//! Uses thiserror for ergonomic error handling with automatic Display implementations.
//! Every variant renders through the uniform `{status, data, message}` envelope.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};

use crate::models::envelope::Envelope;

/// Message returned for any failure whose details must stay server-side.
pub const INTERNAL_ERROR_MESSAGE: &str = "Errore interno del server";

/// Application-level errors.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Database operation failed
    #[error("Database error: {0}")]
    Database(String),

    /// Resource not found. Carries the client-facing message.
    #[error("{0}")]
    NotFound(String),

    /// Invalid input data (bad credentials, malformed request)
    #[error("{0}")]
    InvalidInput(String),

    /// Missing or wrong API key
    #[error("{0}")]
    Forbidden(String),

    /// Well-formed request rejected by a domain check (e.g. photo validation)
    #[error("{0}")]
    Unprocessable(String),

    /// Upload exceeds the configured size limit
    #[error("{0}")]
    PayloadTooLarge(String),

    /// Local filesystem operation failed
    #[error("File system error: {0}")]
    FileSystem(String),

    /// Anything else that must not leak to the caller
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Database(_) | AppError::FileSystem(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.status()
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AppError::Database(_) | AppError::FileSystem(_) | AppError::Internal(_) => {
                tracing::error!("{}", self);
                INTERNAL_ERROR_MESSAGE.to_string()
            }
            _ => self.to_string(),
        };

        HttpResponse::build(self.status()).json(Envelope::error(message))
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

// Conversion implementations for common error types

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("JSON parsing error: {}", err))
    }
}

impl From<sea_orm::DbErr> for AppError {
    fn from(err: sea_orm::DbErr) -> Self {
        AppError::Database(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::FileSystem(err.to_string())
    }
}
