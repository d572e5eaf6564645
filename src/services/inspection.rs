//! Inspection session lifecycle and read views.
//!
//! `in_progress` is the only state that accepts work; `complete` moves a
//! session to `uploaded` and queues its analysis, `incomplete` closes it
//! without analysis. `uploaded -> completed` happens in the analysis worker.

use std::collections::HashMap;

use tracing::{info, warn};
use uuid::Uuid;

use super::analysis_queue::AnalysisQueue;
use super::photo_store::{PhotoStore, validate_storage_id};
use super::photo_validator::PhotoValidator;
use crate::db::DbPool;
use crate::entity::{analysis_result, photo, session};
use crate::error::{AppError, AppResult};
use crate::models::{
    AnalysisStatus, CreateSessionRequest, DamageView, NewPhoto, PhotoSummary,
    SessionDetailResponse, SessionListItem, SessionResponse, SessionResultsResponse,
    SessionStatus, VehicleResponse,
};

pub const MSG_VEHICLE_NOT_FOUND: &str = "Veicolo non trovato";
pub const MSG_USER_NOT_FOUND: &str = "Utente non trovato";
pub const MSG_SESSION_NOT_FOUND: &str = "Sessione non trovata";

fn session_not_found() -> AppError {
    AppError::NotFound(MSG_SESSION_NOT_FOUND.to_string())
}

/// One uploaded photo as received from the client.
#[derive(Debug)]
pub struct PhotoUpload {
    pub session_id: String,
    pub angle_index: i32,
    pub angle_label: String,
    pub data: Vec<u8>,
}

/// Create a session, or return the existing one when `id` is already taken.
pub async fn create_session(
    pool: &DbPool,
    request: CreateSessionRequest,
) -> AppResult<session::Model> {
    if pool.get_vehicle(&request.vehicle_id).await?.is_none() {
        return Err(AppError::NotFound(MSG_VEHICLE_NOT_FOUND.to_string()));
    }
    if pool.get_user(&request.user_id).await?.is_none() {
        return Err(AppError::NotFound(MSG_USER_NOT_FOUND.to_string()));
    }

    let session_id = request
        .id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    // Photos are stored under the session id
    validate_storage_id(&session_id)?;

    if let Some(existing) = pool.get_session(&session_id).await? {
        return Ok(existing);
    }

    match pool
        .insert_session(&session_id, &request.vehicle_id, &request.user_id)
        .await
    {
        Ok(created) => {
            info!(session_id = %created.id, vehicle_id = %created.vehicle_id, "Session created");
            Ok(created)
        }
        // A concurrent create with the same id won the race
        Err(e) => match pool.get_session(&session_id).await? {
            Some(existing) => Ok(existing),
            None => Err(e),
        },
    }
}

/// Store an upload, validate it and record it if accepted.
///
/// A rejected photo leaves neither a file nor a row behind.
pub async fn accept_photo(
    pool: &DbPool,
    store: &PhotoStore,
    validator: &dyn PhotoValidator,
    upload: PhotoUpload,
) -> AppResult<photo::Model> {
    let session = pool
        .get_session(&upload.session_id)
        .await?
        .ok_or_else(session_not_found)?;

    let vehicle_type = pool
        .get_vehicle(&session.vehicle_id)
        .await?
        .map(|v| v.vehicle_type)
        .unwrap_or_default();

    let photo_id = Uuid::new_v4().to_string();
    let path = store.put(&session.id, &photo_id, &upload.data).await?;

    let outcome = validator.validate(&upload.data, &vehicle_type).await;
    if !outcome.valid {
        store.delete(&path).await?;
        warn!(session_id = %session.id, reason = %outcome.reason, "Photo rejected");
        return Err(AppError::Unprocessable(format!(
            "Foto non valida: {}",
            outcome.reason
        )));
    }

    let new_photo = NewPhoto {
        id: photo_id,
        session_id: session.id.clone(),
        angle_index: upload.angle_index,
        angle_label: upload.angle_label,
        file_path: path.to_string_lossy().into_owned(),
        validation_message: Some(outcome.reason).filter(|r| !r.is_empty()),
    };

    match pool.insert_photo(new_photo).await {
        Ok(photo) => {
            info!(
                session_id = %session.id,
                photo_id = %photo.id,
                angle = %photo.angle_label,
                "Photo accepted"
            );
            Ok(photo)
        }
        Err(e) => {
            if let Err(cleanup) = store.delete(&path).await {
                warn!("Failed to remove orphaned photo file: {}", cleanup);
            }
            Err(e)
        }
    }
}

/// Close the session as `uploaded` and queue its analysis.
pub async fn complete_session(
    pool: &DbPool,
    queue: &AnalysisQueue,
    session_id: &str,
) -> AppResult<session::Model> {
    let session = pool
        .close_session(session_id, SessionStatus::Uploaded)
        .await?
        .ok_or_else(session_not_found)?;

    queue.enqueue(&session.id).await?;
    info!(
        session_id = %session.id,
        valid_photos = session.valid_photos,
        "Session completed, analysis queued"
    );
    Ok(session)
}

/// Close the session as `incomplete`. No analysis runs.
pub async fn mark_incomplete(pool: &DbPool, session_id: &str) -> AppResult<session::Model> {
    let session = pool
        .close_session(session_id, SessionStatus::Incomplete)
        .await?
        .ok_or_else(session_not_found)?;

    info!(session_id = %session.id, valid_photos = session.valid_photos, "Session marked incomplete");
    Ok(session)
}

fn analysis_status_of(analysis: Option<&analysis_result::Model>) -> AnalysisStatus {
    analysis
        .and_then(|a| AnalysisStatus::parse(&a.status))
        .unwrap_or(AnalysisStatus::Pending)
}

/// Damages are only shown for a completed analysis.
async fn visible_damages(
    pool: &DbPool,
    analysis: Option<&analysis_result::Model>,
) -> AppResult<Vec<DamageView>> {
    match analysis {
        Some(a) if analysis_status_of(Some(a)) == AnalysisStatus::Completed => Ok(pool
            .get_damages(&a.id)
            .await?
            .into_iter()
            .map(DamageView::from)
            .collect()),
        _ => Ok(Vec::new()),
    }
}

/// Every session with its analysis summary.
pub async fn list_sessions(pool: &DbPool) -> AppResult<Vec<SessionListItem>> {
    let sessions = pool.list_sessions().await?;
    let session_ids: Vec<String> = sessions.iter().map(|s| s.id.clone()).collect();

    let analyses: HashMap<String, analysis_result::Model> = pool
        .get_analyses_for_sessions(&session_ids)
        .await?
        .into_iter()
        .map(|a| (a.session_id.clone(), a))
        .collect();

    let completed_ids: Vec<String> = analyses
        .values()
        .filter(|a| analysis_status_of(Some(a)) == AnalysisStatus::Completed)
        .map(|a| a.id.clone())
        .collect();

    let mut damages_by_analysis: HashMap<String, Vec<String>> = HashMap::new();
    for damage in pool.get_damages_for_analyses(&completed_ids).await? {
        damages_by_analysis
            .entry(damage.analysis_id)
            .or_default()
            .push(damage.damage_type);
    }

    let items = sessions
        .into_iter()
        .map(|s| {
            let analysis = analyses.get(&s.id);
            let types = analysis
                .and_then(|a| damages_by_analysis.get(&a.id))
                .cloned()
                .unwrap_or_default();

            let damage_count = types.len();
            let mut damage_types: Vec<String> = Vec::new();
            for t in types {
                if !damage_types.contains(&t) {
                    damage_types.push(t);
                }
            }

            SessionListItem {
                analysis_status: analysis_status_of(analysis),
                session: SessionResponse::from(s),
                damage_types,
                damage_count,
            }
        })
        .collect();

    Ok(items)
}

/// Session with its vehicle, photos and visible damages.
pub async fn session_details(pool: &DbPool, session_id: &str) -> AppResult<SessionDetailResponse> {
    let session = pool
        .get_session(session_id)
        .await?
        .ok_or_else(session_not_found)?;

    let vehicle = pool.get_vehicle(&session.vehicle_id).await?;
    let photos = pool.get_photos_for_session(session_id).await?;
    let analysis = pool.get_analysis_for_session(session_id).await?;
    let damages = visible_damages(pool, analysis.as_ref()).await?;

    Ok(SessionDetailResponse {
        session: SessionResponse::from(session),
        vehicle: vehicle.map(VehicleResponse::from),
        photos: photos.into_iter().map(PhotoSummary::from).collect(),
        analysis_status: analysis_status_of(analysis.as_ref()),
        damages,
    })
}

/// Analysis status and damages; `pending` with no damages before any run.
pub async fn session_results(pool: &DbPool, session_id: &str) -> AppResult<SessionResultsResponse> {
    if pool.get_session(session_id).await?.is_none() {
        return Err(session_not_found());
    }

    let analysis = pool.get_analysis_for_session(session_id).await?;
    let damages = visible_damages(pool, analysis.as_ref()).await?;

    Ok(SessionResultsResponse {
        analysis_status: analysis_status_of(analysis.as_ref()),
        damages,
    })
}
