//! HTTP route handlers.
//!
//! This module contains Axum route handlers organized by resource type:
//!
//! - [`auth`]: Registration, login, and logout with session cookies
//! - [`plants`]: Plant record CRUD and per-user listings
//! - [`nurseries`]: Nearby nursery lookup via the Overpass proxy
//! - [`images`]: Multipart image uploads
//!
//! Handlers take the shared [`crate::AppState`] and authenticate requests
//! through the [`crate::api::models::users::CurrentUser`] extractor.

pub mod auth;
pub mod images;
pub mod nurseries;
pub mod plants;
