//! PostgreSQL adapters for the profile, lesson, and progress ports.
//!
//! Repositories translate between Diesel rows and domain types and nothing
//! more. Row structs (`models.rs`) and the table definitions (`schema.rs`)
//! stay private to this module.
//!
//! ```ignore
//! use cadence::outbound::persistence::{DbPool, DieselLessonRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/cadence")).await?;
//! let lessons = DieselLessonRepository::new(pool);
//! ```

mod diesel_basic_error_mapping;
mod diesel_lesson_repository;
mod diesel_profile_repository;
mod diesel_progress_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_lesson_repository::DieselLessonRepository;
pub use diesel_profile_repository::DieselProfileRepository;
pub use diesel_progress_repository::DieselProgressRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
