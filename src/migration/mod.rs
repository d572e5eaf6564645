//! SeaORM database migrations.
//!
//! Built with the schema builder so the same steps run on SQLite and PostgreSQL.

pub use sea_orm_migration::prelude::*;

mod m20260301_000001_create_vehicles;
mod m20260301_000002_create_users;
mod m20260301_000003_create_sessions;
mod m20260301_000004_create_photos;
mod m20260301_000005_create_analysis_results;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_000001_create_vehicles::Migration),
            Box::new(m20260301_000002_create_users::Migration),
            Box::new(m20260301_000003_create_sessions::Migration),
            Box::new(m20260301_000004_create_photos::Migration),
            Box::new(m20260301_000005_create_analysis_results::Migration),
        ]
    }
}
