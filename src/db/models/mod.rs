//! Database request and response models.
//!
//! These types define the contract between the repositories and the rest of
//! the application. They are distinct from the API models so that the HTTP
//! surface and the storage representation can evolve independently.

pub mod plants;
pub mod users;
