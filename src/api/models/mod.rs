//! API request and response data models.
//!
//! These models define the public API contract. They are distinct from the
//! database models in [`crate::db::models`], allowing the API and storage
//! representations to evolve independently, and are annotated with `utoipa`
//! for the generated OpenAPI document.

pub mod auth;
pub mod images;
pub mod nurseries;
pub mod plants;
pub mod users;
