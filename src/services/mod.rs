//! Business logic services.

pub mod analysis;
pub mod analysis_queue;
pub mod damage_analyzer;
pub mod inspection;
pub mod password;
pub mod photo_store;
pub mod photo_validator;
pub mod redact;
pub mod vision;

pub use analysis::AnalysisRunner;
pub use analysis_queue::{AnalysisJob, AnalysisQueue, start_analysis_worker};
pub use damage_analyzer::{
    DamageAnalyzer, StubDamageAnalyzer, VisionDamageAnalyzer, analyzer_for,
};
pub use photo_store::PhotoStore;
pub use photo_validator::{PhotoValidator, ValidationOutcome, VisionPhotoValidator};
pub use vision::VisionClient;
