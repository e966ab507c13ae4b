//! Repository implementations for database access.
//!
//! Each repository wraps a SQLx connection, provides strongly-typed CRUD
//! operations, and returns domain models from [`crate::db::models`]. All
//! repositories implement the [`Repository`] trait.
//!
//! ```ignore
//! use verdant::db::handlers::{Plants, Repository, plants::PlantFilter};
//!
//! async fn example(pool: &sqlx::PgPool) -> Result<(), Box<dyn std::error::Error>> {
//!     let mut conn = pool.acquire().await?;
//!     let mut repo = Plants::new(&mut conn);
//!     let plants = repo.list(&PlantFilter::new(0, 100)).await?;
//!     Ok(())
//! }
//! ```

pub mod plants;
pub mod repository;
pub mod users;

pub use plants::Plants;
pub use repository::Repository;
pub use users::Users;
