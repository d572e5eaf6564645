//! Seed data for a fresh database.
//!
//! Identifiers are UUIDv5 in the DNS namespace so every install gets the
//! same vehicle and user ids.

use tracing::info;
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::password::hash_password;

use super::DbPool;

struct SeedVehicle {
    key: &'static str,
    model: &'static str,
    plate: &'static str,
    vehicle_type: &'static str,
}

const SEED_VEHICLES: [SeedVehicle; 4] = [
    SeedVehicle {
        key: "vehicle-pulse-001",
        model: "Piaggio Ape Pulse",
        plate: "AB12345",
        vehicle_type: "pulse",
    },
    SeedVehicle {
        key: "vehicle-pulse-002",
        model: "Piaggio Ape Pulse",
        plate: "CD67890",
        vehicle_type: "pulse",
    },
    SeedVehicle {
        key: "vehicle-hurba-001",
        model: "Hurba",
        plate: "EF11223",
        vehicle_type: "hurba",
    },
    SeedVehicle {
        key: "vehicle-hurba-002",
        model: "Hurba",
        plate: "GH44556",
        vehicle_type: "hurba",
    },
];

const SEED_USER_KEY: &str = "user-operatore";
pub const SEED_USERNAME: &str = "operatore";
pub const SEED_PASSWORD: &str = "operatore123";

/// Stable identifier derived from a seed key.
pub fn seed_id(key: &str) -> String {
    Uuid::new_v5(&Uuid::NAMESPACE_DNS, key.as_bytes()).to_string()
}

pub fn seed_user_id() -> String {
    seed_id(SEED_USER_KEY)
}

impl DbPool {
    /// Insert seed vehicles and the operator account if no vehicle exists yet.
    ///
    /// Returns whether anything was inserted.
    pub async fn seed_if_empty(&self) -> AppResult<bool> {
        if self.count_vehicles().await? > 0 {
            return Ok(false);
        }

        for vehicle in &SEED_VEHICLES {
            self.insert_vehicle(
                &seed_id(vehicle.key),
                vehicle.model,
                vehicle.plate,
                vehicle.vehicle_type,
            )
            .await?;
        }

        if self.find_user_by_username(SEED_USERNAME).await?.is_none() {
            let password_hash = hash_password(SEED_PASSWORD)?;
            self.insert_user(&seed_user_id(), SEED_USERNAME, &password_hash)
                .await?;
        }

        info!(
            vehicles = SEED_VEHICLES.len(),
            user = SEED_USERNAME,
            "Seeded empty database"
        );
        Ok(true)
    }
}
