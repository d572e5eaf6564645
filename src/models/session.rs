//! Inspection session models.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::analysis::{AnalysisStatus, DamageView};
use super::photo::PhotoSummary;
use super::vehicle::VehicleResponse;
use crate::entity::session;

/// Number of camera angles every session expects.
pub const PHOTOS_PER_SESSION: i32 = 4;

/// Session lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    InProgress,
    /// Photos submitted, analysis queued
    Uploaded,
    /// Closed without analysis
    Incomplete,
    /// Analysis finished
    Completed,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InProgress => "in_progress",
            Self::Uploaded => "uploaded",
            Self::Incomplete => "incomplete",
            Self::Completed => "completed",
        }
    }
}

/// `POST /sessions` body. `id` makes creation idempotent.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSessionRequest {
    pub vehicle_id: String,
    pub user_id: String,
    #[serde(default)]
    pub id: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SessionResponse {
    pub id: String,
    pub vehicle_id: String,
    pub user_id: String,
    pub started_at: String,
    pub completed_at: Option<String>,
    pub status: String,
    pub total_photos: i32,
    pub valid_photos: i32,
}

impl From<session::Model> for SessionResponse {
    fn from(m: session::Model) -> Self {
        Self {
            id: m.id,
            vehicle_id: m.vehicle_id,
            user_id: m.user_id,
            started_at: m.started_at.to_rfc3339(),
            completed_at: m.completed_at.map(|t| t.to_rfc3339()),
            status: m.status,
            total_photos: m.total_photos,
            valid_photos: m.valid_photos,
        }
    }
}

/// Row of `GET /sessions`.
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionListItem {
    #[serde(flatten)]
    pub session: SessionResponse,
    pub analysis_status: AnalysisStatus,
    pub damage_types: Vec<String>,
    pub damage_count: usize,
}

/// `GET /sessions/{id}/details`.
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionDetailResponse {
    pub session: SessionResponse,
    pub vehicle: Option<VehicleResponse>,
    pub photos: Vec<PhotoSummary>,
    pub analysis_status: AnalysisStatus,
    pub damages: Vec<DamageView>,
}
