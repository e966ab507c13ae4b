//! API models for image uploads.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Response after a successful image upload
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ImageUploadResponse {
    /// Public URL where the uploaded image is served
    pub url: String,
}
