//! Database queries for analysis results and their damages.
//!
//! A session owns at most one analysis row (unique `session_id`). Starting a
//! new run resets that row instead of adding another.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde_json::json;
use uuid::Uuid;

use crate::entity::analysis_result::{self, Entity as AnalysisResult};
use crate::entity::damage::{self, Entity as Damage};
use crate::error::{AppError, AppResult};
use crate::models::{AnalysisStatus, DamageRecord};

use super::DbPool;

impl DbPool {
    /// Create or reset the session's analysis row in `processing` state.
    pub async fn begin_analysis(&self, session_id: &str) -> AppResult<analysis_result::Model> {
        let txn = self
            .connection()
            .begin()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        let existing = AnalysisResult::find()
            .filter(analysis_result::Column::SessionId.eq(session_id))
            .one(&txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to get analysis: {}", e)))?;

        let model = match existing {
            Some(previous) => {
                Damage::delete_many()
                    .filter(damage::Column::AnalysisId.eq(previous.id.as_str()))
                    .exec(&txn)
                    .await
                    .map_err(|e| AppError::Database(format!("Failed to clear damages: {}", e)))?;

                let mut active: analysis_result::ActiveModel = previous.into();
                active.status = Set(AnalysisStatus::Processing.as_str().to_string());
                active.created_at = Set(Utc::now());
                active.completed_at = Set(None);
                active.raw_response = Set(None);
                active
                    .update(&txn)
                    .await
                    .map_err(|e| AppError::Database(format!("Failed to reset analysis: {}", e)))?
            }
            None => analysis_result::ActiveModel {
                id: Set(Uuid::new_v4().to_string()),
                session_id: Set(session_id.to_string()),
                status: Set(AnalysisStatus::Processing.as_str().to_string()),
                created_at: Set(Utc::now()),
                completed_at: Set(None),
                raw_response: Set(None),
            }
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert analysis: {}", e)))?,
        };

        txn.commit()
            .await
            .map_err(|e| AppError::Database(format!("Failed to commit transaction: {}", e)))?;

        Ok(model)
    }

    /// Store the validated damages and mark the analysis completed.
    pub async fn complete_analysis(
        &self,
        analysis_id: &str,
        damages: &[DamageRecord],
    ) -> AppResult<()> {
        let raw_response = serde_json::to_string(&json!({ "damages": damages }))
            .map_err(|e| AppError::Internal(format!("Failed to encode damages: {}", e)))?;

        let txn = self
            .connection()
            .begin()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        if !damages.is_empty() {
            let rows = damages.iter().map(|d| damage::ActiveModel {
                id: Set(Uuid::new_v4().to_string()),
                analysis_id: Set(analysis_id.to_string()),
                damage_type: Set(d.damage_type.as_str().to_string()),
                severity: Set(d.severity.as_str().to_string()),
                zone: Set(d.zone.as_str().to_string()),
                description: Set(d.description.clone()),
                bounding_box: Set(None),
            });

            Damage::insert_many(rows)
                .exec(&txn)
                .await
                .map_err(|e| AppError::Database(format!("Failed to insert damages: {}", e)))?;
        }

        finish_analysis_on(&txn, analysis_id, AnalysisStatus::Completed, raw_response).await?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(format!("Failed to commit transaction: {}", e)))?;

        Ok(())
    }

    /// Mark the analysis failed with an already-redacted message.
    pub async fn fail_analysis(&self, analysis_id: &str, message: &str) -> AppResult<()> {
        let raw_response = serde_json::to_string(&json!({ "error": message }))
            .map_err(|e| AppError::Internal(format!("Failed to encode error: {}", e)))?;

        finish_analysis_on(
            self.connection(),
            analysis_id,
            AnalysisStatus::Error,
            raw_response,
        )
        .await
    }

    pub async fn get_analysis_for_session(
        &self,
        session_id: &str,
    ) -> AppResult<Option<analysis_result::Model>> {
        let result = AnalysisResult::find()
            .filter(analysis_result::Column::SessionId.eq(session_id))
            .order_by_desc(analysis_result::Column::CreatedAt)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get analysis: {}", e)))?;

        Ok(result)
    }

    /// Analysis rows for a batch of sessions, for list views.
    pub async fn get_analyses_for_sessions(
        &self,
        session_ids: &[String],
    ) -> AppResult<Vec<analysis_result::Model>> {
        if session_ids.is_empty() {
            return Ok(Vec::new());
        }

        let result = AnalysisResult::find()
            .filter(analysis_result::Column::SessionId.is_in(session_ids.iter().cloned()))
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list analyses: {}", e)))?;

        Ok(result)
    }

    pub async fn get_damages(&self, analysis_id: &str) -> AppResult<Vec<damage::Model>> {
        self.get_damages_for_analyses(&[analysis_id.to_string()])
            .await
    }

    pub async fn get_damages_for_analyses(
        &self,
        analysis_ids: &[String],
    ) -> AppResult<Vec<damage::Model>> {
        if analysis_ids.is_empty() {
            return Ok(Vec::new());
        }

        let result = Damage::find()
            .filter(damage::Column::AnalysisId.is_in(analysis_ids.iter().cloned()))
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get damages: {}", e)))?;

        Ok(result)
    }
}

/// Stamp a terminal status on an analysis row.
async fn finish_analysis_on<C: ConnectionTrait>(
    db: &C,
    analysis_id: &str,
    status: AnalysisStatus,
    raw_response: String,
) -> AppResult<()> {
    let active = analysis_result::ActiveModel {
        id: Set(analysis_id.to_string()),
        status: Set(status.as_str().to_string()),
        completed_at: Set(Some(Utc::now())),
        raw_response: Set(Some(raw_response)),
        ..Default::default()
    };

    active
        .update(db)
        .await
        .map_err(|e| AppError::Database(format!("Failed to update analysis: {}", e)))?;

    Ok(())
}
