//! Database models for plant records.

use crate::types::{PlantId, UserId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Request to create a plant in the database.
///
/// `next_watering_date` is intentionally absent: the repository derives it
/// from `last_watered_date` and `watering_frequency_days`.
#[derive(Debug, Clone)]
pub struct PlantCreateDBRequest {
    pub user_id: UserId,
    pub name: String,
    pub species: String,
    pub watering_frequency_days: i32,
    pub last_watered_date: NaiveDate,
    pub is_indoor: bool,
    pub location: Option<String>,
    pub image_url: Option<String>,
}

/// Request to partially update a plant.
///
/// Outer `None` means "leave unchanged". For nullable columns the inner
/// option distinguishes "set to NULL" (`Some(None)`) from a new value.
#[derive(Debug, Clone, Default)]
pub struct PlantUpdateDBRequest {
    pub name: Option<String>,
    pub species: Option<String>,
    pub watering_frequency_days: Option<i32>,
    pub last_watered_date: Option<NaiveDate>,
    pub is_indoor: Option<bool>,
    pub location: Option<Option<String>>,
    pub image_url: Option<Option<String>>,
}

/// Plant row as stored in the database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PlantDBResponse {
    pub id: PlantId,
    pub user_id: UserId,
    pub name: String,
    pub species: String,
    pub watering_frequency_days: i32,
    pub last_watered_date: NaiveDate,
    pub next_watering_date: NaiveDate,
    pub is_indoor: bool,
    pub location: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
