//! Vehicle models.

use serde::Serialize;
use utoipa::ToSchema;

use crate::entity::vehicle;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct VehicleResponse {
    pub id: String,
    pub model: String,
    pub plate: String,
    #[serde(rename = "type")]
    pub vehicle_type: String,
}

impl From<vehicle::Model> for VehicleResponse {
    fn from(m: vehicle::Model) -> Self {
        Self {
            id: m.id,
            model: m.model,
            plate: m.plate,
            vehicle_type: m.vehicle_type,
        }
    }
}
