//! Fleet Rental Database Layer
//!
//! This crate provides persistence for the fleet rental backend. It includes:
//!
//! - Connection pool management and embedded migrations
//! - PostgreSQL repositories for the rate table and fleet inventory
//! - A transactional `RentalStore` over PostgreSQL for the booking lifecycle
//! - An in-memory `RentalStore` with the same contract, for tests

pub mod memory;
pub mod pool;
pub mod repositories;
pub mod rows;
pub mod store;

pub use memory::{FleetTables, InMemoryRentalStore, InMemoryTransaction};
pub use pool::{create_pool, run_migrations};
pub use repositories::*;
pub use store::{PgRentalStore, PgRentalTransaction};

// Re-export commonly used types
pub use fleet_core::{AppError, AppResult};
pub use sqlx::{PgPool, Postgres, Transaction};
