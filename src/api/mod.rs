//! API layer for HTTP request handling and data models.
//!
//! This module contains the REST API implementation, organized into:
//!
//! - **[`handlers`]**: Axum route handlers for all API endpoints
//! - **[`models`]**: Request/response data structures for API communication
//!
//! # API Structure
//!
//! - **Authentication** (`/authentication/*`): Registration, login, logout
//! - **Plants** (`/api/v1/plants/*`, `/api/v1/users/{id}/plants`): Plant records
//! - **Nurseries** (`/api/v1/nurseries/nearby`): Nearby nursery lookup
//! - **Images** (`/api/v1/images`): Image uploads, served back at `/uploads/*`
//!
//! All endpoints are documented with OpenAPI annotations using `utoipa`; the
//! generated documentation is served at `/docs` when the server is running.

pub mod handlers;
pub mod models;
