//! Database operations for users.

use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};

use crate::entity::user::{self, ActiveModel, Entity as User};
use crate::error::{AppError, AppResult};

use super::DbPool;

impl DbPool {
    /// Find a user by ID.
    pub async fn get_user(&self, id: &str) -> AppResult<Option<user::Model>> {
        let result = User::find_by_id(id.to_string())
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get user: {}", e)))?;

        Ok(result)
    }

    /// Find a user by username.
    pub async fn find_user_by_username(&self, username: &str) -> AppResult<Option<user::Model>> {
        let result = User::find()
            .filter(user::Column::Username.eq(username))
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to find user: {}", e)))?;

        Ok(result)
    }

    pub async fn insert_user(
        &self,
        id: &str,
        username: &str,
        password_hash: &str,
    ) -> AppResult<user::Model> {
        let active = ActiveModel {
            id: Set(id.to_string()),
            username: Set(username.to_string()),
            password_hash: Set(password_hash.to_string()),
        };

        let result = active
            .insert(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert user: {}", e)))?;

        Ok(result)
    }
}
