//! Database queries for inspection sessions.

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

use crate::entity::session::{self, ActiveModel, Entity as Session};
use crate::error::{AppError, AppResult};
use crate::models::{PHOTOS_PER_SESSION, SessionStatus};

use super::DbPool;
use super::photos::count_valid_photos_on;

impl DbPool {
    pub async fn get_session(&self, id: &str) -> AppResult<Option<session::Model>> {
        let result = Session::find_by_id(id.to_string())
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get session: {}", e)))?;

        Ok(result)
    }

    /// Insert a fresh `in_progress` session expecting the standard photo set.
    pub async fn insert_session(
        &self,
        id: &str,
        vehicle_id: &str,
        user_id: &str,
    ) -> AppResult<session::Model> {
        let active = ActiveModel {
            id: Set(id.to_string()),
            vehicle_id: Set(vehicle_id.to_string()),
            user_id: Set(user_id.to_string()),
            started_at: Set(Utc::now()),
            completed_at: Set(None),
            status: Set(SessionStatus::InProgress.as_str().to_string()),
            total_photos: Set(PHOTOS_PER_SESSION),
            valid_photos: Set(0),
        };

        let result = active
            .insert(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert session: {}", e)))?;

        Ok(result)
    }

    /// All sessions, newest first.
    pub async fn list_sessions(&self) -> AppResult<Vec<session::Model>> {
        let result = Session::find()
            .order_by_desc(session::Column::StartedAt)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list sessions: {}", e)))?;

        Ok(result)
    }

    /// Close a session: recount its valid photos, stamp `completed_at` and
    /// set `status`. Returns `None` if the session does not exist.
    ///
    /// Recount and update run in one transaction so the stored count always
    /// matches the photos present at the moment of closing.
    pub async fn close_session(
        &self,
        id: &str,
        status: SessionStatus,
    ) -> AppResult<Option<session::Model>> {
        let txn = self
            .connection()
            .begin()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        let Some(existing) = Session::find_by_id(id.to_string())
            .one(&txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to get session: {}", e)))?
        else {
            return Ok(None);
        };

        let valid_photos = count_valid_photos_on(&txn, id).await?;

        let mut active: ActiveModel = existing.into();
        active.status = Set(status.as_str().to_string());
        active.completed_at = Set(Some(Utc::now()));
        active.valid_photos = Set(i32::try_from(valid_photos).unwrap_or(i32::MAX));

        let updated = active
            .update(&txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to update session: {}", e)))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(format!("Failed to commit transaction: {}", e)))?;

        Ok(Some(updated))
    }

    /// Move a session from `from` to `to` only if it is still in `from`.
    ///
    /// Returns whether a row changed.
    pub async fn advance_session_status(
        &self,
        id: &str,
        from: SessionStatus,
        to: SessionStatus,
    ) -> AppResult<bool> {
        let result = Session::update_many()
            .col_expr(session::Column::Status, Expr::value(to.as_str()))
            .filter(session::Column::Id.eq(id))
            .filter(session::Column::Status.eq(from.as_str()))
            .exec(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to update session status: {}", e)))?;

        Ok(result.rows_affected > 0)
    }
}
