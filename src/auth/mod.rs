//! Shared API key check for the `/api/v1` surface.

mod extractor;

use secrecy::{ExposeSecret, SecretString};
use subtle::ConstantTimeEq;

pub use extractor::ApiKeyAuth;

pub const MSG_INVALID_API_KEY: &str = "Invalid or missing API key";

/// The configured `X-API-Key` secret. An empty configuration disables the check.
#[derive(Clone)]
pub struct ApiKeyGuard(Option<SecretString>);

impl ApiKeyGuard {
    pub fn new(configured: &str) -> Self {
        let configured = configured.trim();
        if configured.is_empty() {
            Self(None)
        } else {
            Self(Some(SecretString::from(configured.to_string())))
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.0.is_some()
    }

    /// Whether a request carrying `provided` may pass.
    ///
    /// `ct_eq` returns false for unequal lengths without an early exit.
    pub fn verify(&self, provided: Option<&str>) -> bool {
        match (&self.0, provided) {
            (None, _) => true,
            (Some(expected), Some(provided)) => expected
                .expose_secret()
                .as_bytes()
                .ct_eq(provided.as_bytes())
                .into(),
            (Some(_), None) => false,
        }
    }
}

impl std::fmt::Debug for ApiKeyGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.0 {
            Some(_) => write!(f, "ApiKeyGuard([REDACTED])"),
            None => write!(f, "ApiKeyGuard(disabled)"),
        }
    }
}
