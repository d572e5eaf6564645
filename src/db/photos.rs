//! Database queries for session photos.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::entity::photo::{self, ActiveModel, Entity as Photo};
use crate::error::{AppError, AppResult};
use crate::models::{NewPhoto, UploadStatus};

use super::DbPool;

/// Count valid photos of a session on any connection or transaction.
pub(super) async fn count_valid_photos_on<C: ConnectionTrait>(
    db: &C,
    session_id: &str,
) -> AppResult<u64> {
    Photo::find()
        .filter(photo::Column::SessionId.eq(session_id))
        .filter(photo::Column::IsValid.eq(true))
        .count(db)
        .await
        .map_err(|e| AppError::Database(format!("Failed to count photos: {}", e)))
}

impl DbPool {
    /// Persist an accepted upload. Only photos that passed validation get here.
    pub async fn insert_photo(&self, photo: NewPhoto) -> AppResult<photo::Model> {
        let active = ActiveModel {
            id: Set(photo.id),
            session_id: Set(photo.session_id),
            angle_index: Set(photo.angle_index),
            angle_label: Set(photo.angle_label),
            file_path: Set(photo.file_path),
            captured_at: Set(Utc::now()),
            is_valid: Set(true),
            validation_message: Set(photo.validation_message),
            upload_status: Set(UploadStatus::Uploaded.as_str().to_string()),
        };

        let result = active
            .insert(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert photo: {}", e)))?;

        Ok(result)
    }

    /// Photos of a session ordered by angle, then capture time.
    pub async fn get_photos_for_session(&self, session_id: &str) -> AppResult<Vec<photo::Model>> {
        let result = Photo::find()
            .filter(photo::Column::SessionId.eq(session_id))
            .order_by_asc(photo::Column::AngleIndex)
            .order_by_asc(photo::Column::CapturedAt)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get photos: {}", e)))?;

        Ok(result)
    }
}
