//! API models for the nursery lookup proxy.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A nursery or garden centre near the query point
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NurseryResponse {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
}
