//! Domain models for the fleet rental backend
//!
//! Entities reference each other by id only; repositories and transactions
//! resolve the references.

pub mod add_on;
pub mod booking;
pub mod car;
pub mod car_type;
pub mod customer;
pub mod hub;
pub mod invoice;

pub use add_on::{AddOn, CreateAddOn};
pub use booking::{
    Booking, BookingDetail, BookingStatus, CreateBooking, CustomerSnapshot, HandoverRequest,
    ModifyBooking, RateSnapshot, ReturnRequest,
};
pub use car::{Availability, Car, CreateCar};
pub use car_type::{CarType, CreateCarType, UpdateCarTypeRates};
pub use customer::Customer;
pub use hub::Hub;
pub use invoice::Invoice;
