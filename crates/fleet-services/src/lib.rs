//! Business logic services for the fleet rental backend
//!
//! This crate orchestrates the booking lifecycle on top of the persistence
//! traits defined in fleet-core.
//!
//! # Architecture
//!
//! Services are generic over a [`RentalStore`](fleet_core::traits::RentalStore):
//! - every lifecycle call runs in exactly one store transaction
//! - collaborators (notifier, renderer, clock) are injected as trait objects
//! - all operations are instrumented with tracing
//!
//! # Services
//!
//! - `BookingService` - create, handover, return, cancel, modify and lookups
//! - `FleetAvailability` - free-car search, car claims and the fleet overview
//! - `Catalog` - hubs and the add-on catalog
//! - `InvoiceEmitter` - invoice statements and rendered documents
//! - `billing` - the pure pricing formula

pub mod availability;
pub mod billing;
pub mod booking_lifecycle;
pub mod catalog;
pub mod confirmation;
pub mod invoice;
pub mod notification;

pub use availability::{
    CarStatus, CarStatusEntry, FleetAvailability, FleetOverview, FleetStatistics, HubFleet,
    RentalInfo,
};
pub use billing::BillingBreakdown;
pub use booking_lifecycle::{BookingService, BookingView, ReturnReceipt};
pub use catalog::Catalog;
pub use confirmation::ConfirmationCodeGenerator;
pub use invoice::{InvoiceEmitter, InvoiceLine, InvoiceRenderer, InvoiceStatement, PlainTextRenderer};
pub use notification::LoggingNotifier;
