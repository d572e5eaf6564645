//! SeaORM entity definitions.

pub mod analysis_result;
pub mod damage;
pub mod photo;
pub mod session;
pub mod user;
pub mod vehicle;
