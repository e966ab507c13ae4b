//! Database models for users.

use crate::types::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Avatar used when a user has not uploaded a profile picture
pub const DEFAULT_PROFILE_PIC_URL: &str = "https://cdn-icons-png.flaticon.com/512/149/149071.png";

/// Request to create a user in the database
#[derive(Debug, Clone)]
pub struct UserCreateDBRequest {
    pub name: String,
    pub email: String,
    /// None for users created without a password (e.g. the bootstrap admin)
    pub password_hash: Option<String>,
    pub profile_pic_url: Option<String>,
    pub is_admin: bool,
}

/// Request to update a user in the database. `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct UserUpdateDBRequest {
    pub name: Option<String>,
    pub profile_pic_url: Option<String>,
    pub password_hash: Option<String>,
}

/// User row as stored in the database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserDBResponse {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub profile_pic_url: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
