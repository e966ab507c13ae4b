//! Database layer: error categorization, domain models, and repositories.

pub mod errors;
pub mod handlers;
pub mod models;
