//! Fleet Rental Core Library
//!
//! This crate provides the foundational types, traits, and error handling
//! for the fleet rental backend. It includes:
//!
//! - Domain models (Booking, Car, CarType, Invoice, etc.)
//! - Persistence and collaborator traits used by the services
//! - Unified error handling with HTTP response mapping
//! - Application configuration

pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod traits;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::AppConfig;
pub use error::{AppError, EntityKind};

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;
