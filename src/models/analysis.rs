//! Analysis vocabulary and damage records.
//!
//! The three enumerated damage fields accept only the fixed Italian
//! vocabularies below; anything else is rejected at the boundary.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::entity::damage;

/// Lifecycle of a session's analysis result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStatus {
    /// No analysis row exists yet
    Pending,
    Processing,
    Completed,
    Error,
}

impl AnalysisStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Error => "error",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "processing" => Some(Self::Processing),
            "completed" => Some(Self::Completed),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DamageType {
    Graffio,
    Ammaccatura,
    Crepa,
    Rottura,
    PezzoMancante,
}

impl DamageType {
    pub const ALL: [DamageType; 5] = [
        Self::Graffio,
        Self::Ammaccatura,
        Self::Crepa,
        Self::Rottura,
        Self::PezzoMancante,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Graffio => "graffio",
            Self::Ammaccatura => "ammaccatura",
            Self::Crepa => "crepa",
            Self::Rottura => "rottura",
            Self::PezzoMancante => "pezzo_mancante",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Lieve,
    Moderato,
    Grave,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Self::Lieve, Self::Moderato, Self::Grave];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lieve => "lieve",
            Self::Moderato => "moderato",
            Self::Grave => "grave",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Zone {
    Frontale,
    LateraleSinistro,
    Posteriore,
    LateraleDestro,
    Superiore,
}

impl Zone {
    pub const ALL: [Zone; 5] = [
        Self::Frontale,
        Self::LateraleSinistro,
        Self::Posteriore,
        Self::LateraleDestro,
        Self::Superiore,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Frontale => "frontale",
            Self::LateraleSinistro => "laterale_sinistro",
            Self::Posteriore => "posteriore",
            Self::LateraleDestro => "laterale_destro",
            Self::Superiore => "superiore",
        }
    }
}

/// One detected defect, already checked against the vocabularies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageRecord {
    pub damage_type: DamageType,
    pub severity: Severity,
    pub zone: Zone,
    #[serde(default)]
    pub description: Option<String>,
}

impl DamageRecord {
    pub fn new(
        damage_type: DamageType,
        severity: Severity,
        zone: Zone,
        description: impl Into<String>,
    ) -> Self {
        Self {
            damage_type,
            severity,
            zone,
            description: Some(description.into()),
        }
    }

    /// Build a record from an untrusted JSON entry.
    ///
    /// Returns `None` unless type, severity and zone are all vocabulary members.
    pub fn from_value(value: &Value) -> Option<Self> {
        Self::deserialize(value).ok()
    }
}

/// Damage as shown to API callers.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DamageView {
    pub damage_type: String,
    pub severity: String,
    pub zone: String,
    pub description: Option<String>,
    pub bounding_box: Option<String>,
}

impl From<damage::Model> for DamageView {
    fn from(m: damage::Model) -> Self {
        Self {
            damage_type: m.damage_type,
            severity: m.severity,
            zone: m.zone,
            description: m.description,
            bounding_box: m.bounding_box,
        }
    }
}

/// Analysis outcome for one session (`GET /sessions/{id}/results`).
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResultsResponse {
    pub analysis_status: AnalysisStatus,
    pub damages: Vec<DamageView>,
}
