//! Runs one damage analysis for a session and records the outcome.
//!
//! Steps: reset the session's analysis row to `processing`, load its photos,
//! ask the analyzer, then store either the damages or a redacted error.
//! Whatever the outcome, a session still in `uploaded` is advanced to
//! `completed` so callers never wait on it forever.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use tracing::{error, info};

use super::damage_analyzer::{AnalysisError, DamageAnalyzer};
use super::redact::redact_secrets;
use crate::db::DbPool;
use crate::error::AppResult;
use crate::models::{AnalysisStatus, DamageRecord, SessionStatus};

#[derive(Clone)]
pub struct AnalysisRunner {
    pool: DbPool,
    analyzer: Arc<dyn DamageAnalyzer>,
    provider_key: Option<SecretString>,
}

impl AnalysisRunner {
    pub fn new(pool: DbPool, analyzer: Arc<dyn DamageAnalyzer>) -> Self {
        Self {
            pool,
            analyzer,
            provider_key: None,
        }
    }

    /// Provider credential to scrub from stored error text.
    pub fn with_provider_key(mut self, key: &str) -> Self {
        if !key.trim().is_empty() {
            self.provider_key = Some(SecretString::from(key.to_string()));
        }
        self
    }

    /// Analyze `session_id` and return the terminal analysis status.
    ///
    /// Analysis failures are recorded, not returned; `Err` means the outcome
    /// itself could not be stored.
    pub async fn run(&self, session_id: &str) -> AppResult<AnalysisStatus> {
        let analysis = self.pool.begin_analysis(session_id).await?;

        let outcome = match self.analyze(session_id).await {
            Ok(damages) => self
                .pool
                .complete_analysis(&analysis.id, &damages)
                .await
                .map(|()| damages.len())
                .map_err(AnalysisError::from),
            Err(e) => Err(e),
        };

        let status = match outcome {
            Ok(count) => {
                info!(
                    session_id,
                    analyzer = self.analyzer.name(),
                    damages = count,
                    "Analysis completed"
                );
                AnalysisStatus::Completed
            }
            Err(e) => {
                let message = self.redact(&e.to_string());
                error!(session_id, analyzer = self.analyzer.name(), "Analysis failed: {}", message);
                self.pool.fail_analysis(&analysis.id, &message).await?;
                AnalysisStatus::Error
            }
        };

        self.pool
            .advance_session_status(session_id, SessionStatus::Uploaded, SessionStatus::Completed)
            .await?;

        Ok(status)
    }

    async fn analyze(&self, session_id: &str) -> Result<Vec<DamageRecord>, AnalysisError> {
        let photos = self.pool.get_photos_for_session(session_id).await?;
        if photos.is_empty() {
            info!(session_id, "Session has no photos, nothing to analyze");
            return Ok(Vec::new());
        }

        self.analyzer.analyze(&photos).await
    }

    fn redact(&self, text: &str) -> String {
        match &self.provider_key {
            Some(key) => redact_secrets(text, &[key.expose_secret()]),
            None => redact_secrets(text, &[]),
        }
    }
}
