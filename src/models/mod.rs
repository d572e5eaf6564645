//! Domain models for the inspection server.

pub mod analysis;
pub mod auth;
pub mod envelope;
pub mod photo;
pub mod session;
pub mod vehicle;

// Re-export commonly used types
pub use analysis::{
    AnalysisStatus, DamageRecord, DamageType, DamageView, SessionResultsResponse, Severity, Zone,
};
pub use auth::{LoginRequest, LoginResponse};
pub use envelope::{Envelope, ErrorEnvelope};
pub use photo::{NewPhoto, PhotoSummary, PhotoUploadResponse, UploadStatus};
pub use session::{
    CreateSessionRequest, PHOTOS_PER_SESSION, SessionDetailResponse, SessionListItem,
    SessionResponse, SessionStatus,
};
pub use vehicle::VehicleResponse;
