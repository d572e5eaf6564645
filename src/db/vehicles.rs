//! Database queries for vehicles.

use sea_orm::{ActiveModelTrait, EntityTrait, PaginatorTrait, QueryOrder, Set};

use crate::entity::vehicle::{self, ActiveModel, Entity as Vehicle};
use crate::error::{AppError, AppResult};

use super::DbPool;

impl DbPool {
    /// List every vehicle ordered by plate.
    pub async fn list_vehicles(&self) -> AppResult<Vec<vehicle::Model>> {
        let result = Vehicle::find()
            .order_by_asc(vehicle::Column::Plate)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list vehicles: {}", e)))?;

        Ok(result)
    }

    pub async fn get_vehicle(&self, id: &str) -> AppResult<Option<vehicle::Model>> {
        let result = Vehicle::find_by_id(id.to_string())
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get vehicle: {}", e)))?;

        Ok(result)
    }

    pub async fn count_vehicles(&self) -> AppResult<u64> {
        let count = Vehicle::find()
            .count(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to count vehicles: {}", e)))?;

        Ok(count)
    }

    pub async fn insert_vehicle(
        &self,
        id: &str,
        model: &str,
        plate: &str,
        vehicle_type: &str,
    ) -> AppResult<vehicle::Model> {
        let active = ActiveModel {
            id: Set(id.to_string()),
            model: Set(model.to_string()),
            plate: Set(plate.to_string()),
            vehicle_type: Set(vehicle_type.to_string()),
        };

        let result = active
            .insert(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert vehicle: {}", e)))?;

        Ok(result)
    }
}
