//! Photo validation against the expected vehicle silhouette.
//!
//! Validation is an assist, never a gate of record: any provider or parse
//! failure accepts the photo and records why.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value;
use tracing::{info, warn};

use super::vision::VisionClient;

const VALIDATION_MAX_TOKENS: u32 = 150;

pub const REASON_UNKNOWN_TYPE: &str = "Tipo veicolo senza validazione";
pub const REASON_NO_CREDENTIAL: &str = "Validazione disabilitata (no API key)";

/// Outcome of validating one photo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOutcome {
    pub valid: bool,
    pub reason: String,
}

impl ValidationOutcome {
    pub fn accept(reason: impl Into<String>) -> Self {
        Self {
            valid: true,
            reason: reason.into(),
        }
    }

    pub fn reject(reason: impl Into<String>) -> Self {
        Self {
            valid: false,
            reason: reason.into(),
        }
    }
}

#[async_trait]
pub trait PhotoValidator: Send + Sync {
    /// Decide whether `image` shows a vehicle of type `vehicle_type`.
    async fn validate(&self, image: &[u8], vehicle_type: &str) -> ValidationOutcome;
}

/// Rubric text for the vehicle types we know how to recognise.
pub fn vehicle_description(vehicle_type: &str) -> Option<&'static str> {
    match vehicle_type {
        "pulse" => Some(
            "Piaggio Ape Pulse 3: uno scooter elettrico a 3 ruote con un vano cargo \
             posteriore (cassone/box). Ha due ruote dietro e una davanti, design compatto \
             e utilitario per consegne urbane.",
        ),
        "hurba" => Some(
            "Hurba: uno scooter elettrico a due ruote in stile maxi-scooter (simile al \
             Yamaha T-Max). Design sportivo con carenatura aerodinamica, sella lunga, \
             e ruote grandi.",
        ),
        _ => None,
    }
}

fn validation_prompt(description: &str) -> String {
    format!(
        "Sei un sistema di controllo qualità fotografica per una flotta di veicoli.\n\
         \n\
         Il veicolo atteso in questa foto è: {description}\n\
         \n\
         Analizza l'immagine e rispondi SOLO con un oggetto JSON (nessun testo aggiuntivo):\n\
         {{\n  \"valid\": true/false,\n  \"reason\": \"breve spiegazione in italiano\"\n}}\n\
         \n\
         Regole:\n\
         - \"valid\": true se nell'immagine è chiaramente visibile il tipo di veicolo descritto \
         (anche parzialmente, da qualsiasi angolazione)\n\
         - \"valid\": false se l'immagine mostra un veicolo completamente diverso, nessun veicolo, \
         o è troppo sfocata/scura per identificare il soggetto\n\
         - Sii ragionevole: non serve una corrispondenza perfetta, basta che sia riconoscibile \
         come quel tipo di veicolo\n"
    )
}

/// Map the provider's JSON verdict. A missing `valid` field accepts.
fn outcome_from_reply(reply: &Value) -> ValidationOutcome {
    ValidationOutcome {
        valid: reply.get("valid").and_then(Value::as_bool).unwrap_or(true),
        reason: reply
            .get("reason")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
    }
}

/// Validator backed by the hosted vision model.
pub struct VisionPhotoValidator {
    client: VisionClient,
}

impl VisionPhotoValidator {
    pub fn new(client: VisionClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PhotoValidator for VisionPhotoValidator {
    async fn validate(&self, image: &[u8], vehicle_type: &str) -> ValidationOutcome {
        let Some(description) = vehicle_description(vehicle_type) else {
            info!(vehicle_type, "No rubric for vehicle type, skipping validation");
            return ValidationOutcome::accept(REASON_UNKNOWN_TYPE);
        };

        if !self.client.is_configured() {
            info!("No vision credential, skipping photo validation");
            return ValidationOutcome::accept(REASON_NO_CREDENTIAL);
        }

        let prompt = validation_prompt(description);
        let images = [STANDARD.encode(image)];

        match self
            .client
            .complete_json(&prompt, &images, VALIDATION_MAX_TOKENS)
            .await
        {
            Ok(reply) => outcome_from_reply(&reply),
            Err(e) => {
                warn!("Photo validation failed, accepting upload: {}", e);
                ValidationOutcome::accept(format!("Errore validazione: {}", e))
            }
        }
    }
}
