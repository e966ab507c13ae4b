//! API models for plant records.

use crate::db::models::plants::{PlantCreateDBRequest, PlantDBResponse, PlantUpdateDBRequest};
use crate::types::{PlantId, UserId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

fn default_is_indoor() -> bool {
    true
}

/// Request to create a plant.
///
/// `next_watering_date` cannot be supplied; it is derived server-side.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct PlantCreate {
    /// Owner of the plant
    #[schema(value_type = Uuid)]
    pub user_id: UserId,
    pub name: String,
    pub species: String,
    /// How often the plant needs water, in days (>= 1)
    pub watering_frequency_days: i32,
    pub last_watered_date: NaiveDate,
    #[serde(default = "default_is_indoor")]
    pub is_indoor: bool,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Partial update for a plant. Absent fields are left unchanged.
///
/// For the nullable fields (`location`, `image_url`) an explicit `null`
/// clears the value, while leaving the field out keeps it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct PlantUpdate {
    pub name: Option<String>,
    pub species: Option<String>,
    pub watering_frequency_days: Option<i32>,
    pub last_watered_date: Option<NaiveDate>,
    pub is_indoor: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "::serde_with::rust::double_option")]
    pub location: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "::serde_with::rust::double_option")]
    pub image_url: Option<Option<String>>,
}

/// Plant representation returned by the API
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PlantResponse {
    #[schema(value_type = Uuid)]
    pub id: PlantId,
    #[schema(value_type = Uuid)]
    pub user_id: UserId,
    pub name: String,
    pub species: String,
    pub watering_frequency_days: i32,
    pub last_watered_date: NaiveDate,
    /// Derived: `last_watered_date + watering_frequency_days` days
    pub next_watering_date: NaiveDate,
    pub is_indoor: bool,
    pub location: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PlantDBResponse> for PlantResponse {
    fn from(plant: PlantDBResponse) -> Self {
        Self {
            id: plant.id,
            user_id: plant.user_id,
            name: plant.name,
            species: plant.species,
            watering_frequency_days: plant.watering_frequency_days,
            last_watered_date: plant.last_watered_date,
            next_watering_date: plant.next_watering_date,
            is_indoor: plant.is_indoor,
            location: plant.location,
            image_url: plant.image_url,
            created_at: plant.created_at,
            updated_at: plant.updated_at,
        }
    }
}

impl From<PlantCreate> for PlantCreateDBRequest {
    fn from(request: PlantCreate) -> Self {
        Self {
            user_id: request.user_id,
            name: request.name.trim().to_string(),
            species: request.species.trim().to_string(),
            watering_frequency_days: request.watering_frequency_days,
            last_watered_date: request.last_watered_date,
            is_indoor: request.is_indoor,
            location: request.location,
            image_url: request.image_url,
        }
    }
}

impl From<PlantUpdate> for PlantUpdateDBRequest {
    fn from(request: PlantUpdate) -> Self {
        Self {
            name: request.name.map(|n| n.trim().to_string()),
            species: request.species.map(|s| s.trim().to_string()),
            watering_frequency_days: request.watering_frequency_days,
            last_watered_date: request.last_watered_date,
            is_indoor: request.is_indoor,
            location: request.location,
            image_url: request.image_url,
        }
    }
}
