//! HTTP request handlers

pub mod availability;
pub mod booking;
pub mod catalog;
pub mod fleet;
pub mod health;
pub mod invoice;

pub use availability::configure as configure_availability;
pub use booking::configure as configure_bookings;
pub use catalog::configure as configure_catalog;
pub use fleet::configure as configure_fleet;
pub use health::health_check;
