//! Damage analyzers: derive a session's damage list from its photos.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value;
use tracing::{info, warn};

use super::photo_store::PhotoStore;
use super::vision::{VisionClient, VisionError, is_reasoning_model};
use crate::config::AnalyzerBackend;
use crate::entity::photo;
use crate::error::AppError;
use crate::models::{DamageRecord, DamageType, Severity, Zone};

const ANALYSIS_MAX_TOKENS: u32 = 1024;
const ANALYSIS_MAX_TOKENS_REASONING: u32 = 2048;

/// Failures of one analysis run. Never rendered over HTTP.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("vision provider credential is not configured")]
    NotConfigured,

    #[error(transparent)]
    Vision(#[from] VisionError),

    #[error("provider reply field 'damages' is not a list")]
    MalformedDamages,

    #[error(transparent)]
    Storage(#[from] AppError),
}

#[async_trait]
pub trait DamageAnalyzer: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Analyze a session's photos. Every returned record is vocabulary-valid.
    async fn analyze(&self, photos: &[photo::Model]) -> Result<Vec<DamageRecord>, AnalysisError>;
}

fn damage_prompt() -> String {
    let join = |items: Vec<&str>| items.join(", ");
    format!(
        "Sei un perito che ispeziona veicoli elettrici leggeri di una flotta in sharing.\n\
         Ti vengono fornite le foto dello stesso veicolo scattate da più angolazioni.\n\
         Individua i danni visibili alla carrozzeria e alle parti esterne.\n\
         \n\
         Rispondi SOLO con un oggetto JSON (nessun testo aggiuntivo) in questo formato:\n\
         {{\n  \"damages\": [\n    {{\n      \"damage_type\": \"...\",\n      \
         \"severity\": \"...\",\n      \"zone\": \"...\",\n      \
         \"description\": \"breve descrizione in italiano\"\n    }}\n  ]\n}}\n\
         \n\
         Valori ammessi:\n\
         - damage_type: {}\n\
         - severity: {}\n\
         - zone: {}\n\
         \n\
         Se non vedi danni rispondi {{\"damages\": []}}. Non inventare danni non visibili.\n",
        join(DamageType::ALL.iter().map(|t| t.as_str()).collect()),
        join(Severity::ALL.iter().map(|s| s.as_str()).collect()),
        join(Zone::ALL.iter().map(|z| z.as_str()).collect()),
    )
}

/// Pull vocabulary-valid damages out of a provider reply, logging the rest.
pub fn extract_damages(reply: &Value) -> Result<Vec<DamageRecord>, AnalysisError> {
    let entries = match reply.get("damages") {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(entries)) => entries,
        Some(_) => return Err(AnalysisError::MalformedDamages),
    };

    let mut accepted = Vec::with_capacity(entries.len());
    for entry in entries {
        match DamageRecord::from_value(entry) {
            Some(record) => accepted.push(record),
            None => warn!("Skipping invalid damage entry: {}", entry),
        }
    }

    Ok(accepted)
}

/// Analyzer backed by the hosted vision model. Fails closed without a credential.
pub struct VisionDamageAnalyzer {
    client: VisionClient,
    store: PhotoStore,
}

impl VisionDamageAnalyzer {
    pub fn new(client: VisionClient, store: PhotoStore) -> Self {
        Self { client, store }
    }

    fn max_tokens(&self) -> u32 {
        if is_reasoning_model(self.client.model()) {
            ANALYSIS_MAX_TOKENS_REASONING
        } else {
            ANALYSIS_MAX_TOKENS
        }
    }
}

#[async_trait]
impl DamageAnalyzer for VisionDamageAnalyzer {
    fn name(&self) -> &'static str {
        "vision"
    }

    async fn analyze(&self, photos: &[photo::Model]) -> Result<Vec<DamageRecord>, AnalysisError> {
        if !self.client.is_configured() {
            return Err(AnalysisError::NotConfigured);
        }

        let mut images = Vec::with_capacity(photos.len());
        for photo in photos {
            match self.store.read(Path::new(&photo.file_path)).await {
                Ok(bytes) => images.push(STANDARD.encode(bytes)),
                Err(e) => warn!(
                    photo_id = %photo.id,
                    path = %photo.file_path,
                    "Skipping unreadable photo: {}",
                    e
                ),
            }
        }

        if images.is_empty() {
            info!("No readable photos, nothing to analyze");
            return Ok(Vec::new());
        }

        let reply = self
            .client
            .complete_json(&damage_prompt(), &images, self.max_tokens())
            .await?;

        extract_damages(&reply)
    }
}

/// Deterministic analyzer keyed on angle labels, for demos and offline runs.
pub struct StubDamageAnalyzer;

#[async_trait]
impl DamageAnalyzer for StubDamageAnalyzer {
    fn name(&self) -> &'static str {
        "stub"
    }

    async fn analyze(&self, photos: &[photo::Model]) -> Result<Vec<DamageRecord>, AnalysisError> {
        let has_label = |label: &str| photos.iter().any(|p| p.angle_label == label);
        let mut damages = Vec::new();

        if has_label("fronte") {
            damages.push(DamageRecord::new(
                DamageType::Graffio,
                Severity::Lieve,
                Zone::Frontale,
                "Graffio superficiale sulla carenatura frontale",
            ));
        }

        if has_label("lato_sinistro") {
            damages.push(DamageRecord::new(
                DamageType::Ammaccatura,
                Severity::Moderato,
                Zone::LateraleSinistro,
                "Ammaccatura sulla fiancata sinistra",
            ));
        }

        Ok(damages)
    }
}

/// Build the analyzer selected in configuration.
pub fn analyzer_for(
    backend: AnalyzerBackend,
    client: VisionClient,
    store: PhotoStore,
) -> Arc<dyn DamageAnalyzer> {
    match backend {
        AnalyzerBackend::Vision => Arc::new(VisionDamageAnalyzer::new(client, store)),
        AnalyzerBackend::Stub => Arc::new(StubDamageAnalyzer),
    }
}
