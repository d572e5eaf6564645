//! Photo models.

use serde::Serialize;
use utoipa::ToSchema;

use crate::entity::photo;

/// Photo upload state. Accepted uploads are stored as `Uploaded`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStatus {
    Pending,
    Uploaded,
}

impl UploadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Uploaded => "uploaded",
        }
    }
}

/// Metadata for one accepted upload, before it is persisted.
#[derive(Debug, Clone)]
pub struct NewPhoto {
    pub id: String,
    pub session_id: String,
    pub angle_index: i32,
    pub angle_label: String,
    pub file_path: String,
    pub validation_message: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PhotoUploadResponse {
    pub photo_id: String,
}

/// Photo as listed in session details.
#[derive(Debug, Serialize, ToSchema)]
pub struct PhotoSummary {
    pub id: String,
    pub angle_index: i32,
    pub angle_label: String,
    pub upload_status: String,
    pub is_valid: bool,
    pub validation_message: Option<String>,
}

impl From<photo::Model> for PhotoSummary {
    fn from(m: photo::Model) -> Self {
        Self {
            id: m.id,
            angle_index: m.angle_index,
            angle_label: m.angle_label,
            upload_status: m.upload_status,
            is_valid: m.is_valid,
            validation_message: m.validation_message,
        }
    }
}
