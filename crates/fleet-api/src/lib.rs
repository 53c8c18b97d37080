//! API layer for the fleet rental backend
//!
//! HTTP handlers for bookings, car availability and the fleet overview,
//! invoices, the hub and add-on catalog, and the fleet reference data
//! (rate table and car registration).

#![forbid(unsafe_code)]

pub mod dto;
pub mod handlers;

// Re-export DTOs (common types)
pub use dto::{ApiResponse, PaginationParams};

// Re-export handler configuration functions
pub use handlers::{
    configure_availability, configure_bookings, configure_catalog, configure_fleet, health_check,
};
