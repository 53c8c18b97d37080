//! Common traits for repositories and collaborators
//!
//! Defines abstractions for database access and the side channels the
//! booking lifecycle talks to.

use crate::error::AppError;
use crate::models::{
    AddOn, Booking, BookingDetail, Car, CarType, Customer, Hub, Invoice, UpdateCarTypeRates,
};
use async_trait::async_trait;
use chrono::NaiveDate;

/// Generic repository trait for CRUD operations
#[async_trait]
pub trait Repository<T, ID>: Send + Sync {
    /// Find entity by ID
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, AppError>;

    /// Find all entities with pagination
    async fn find_all(&self, limit: i64, offset: i64) -> Result<Vec<T>, AppError>;

    /// Count total entities
    async fn count(&self) -> Result<i64, AppError>;

    /// Create a new entity
    async fn create(&self, entity: &T) -> Result<T, AppError>;

    /// Update an existing entity
    async fn update(&self, entity: &T) -> Result<T, AppError>;

    /// Delete entity by ID
    async fn delete(&self, id: ID) -> Result<bool, AppError>;
}

/// Rate table repository
#[async_trait]
pub trait CarTypeRepository: Repository<CarType, i32> {
    /// Replace the rates of a car type, returning the updated entry
    async fn update_rates(
        &self,
        id: i32,
        rates: &UpdateCarTypeRates,
    ) -> Result<Option<CarType>, AppError>;
}

/// Fleet inventory repository
#[async_trait]
pub trait CarRepository: Repository<Car, i32> {
    /// Find car by number plate
    async fn find_by_plate(&self, number_plate: &str) -> Result<Option<Car>, AppError>;

    /// List all cars stationed at a hub
    async fn list_by_hub(&self, hub_id: i32) -> Result<Vec<Car>, AppError>;
}

/// Opens units of work over the rental tables
#[async_trait]
pub trait RentalStore: Send + Sync + 'static {
    type Tx: RentalTransaction;

    /// Start a transaction; dropping it without `commit` rolls back
    async fn begin(&self) -> Result<Self::Tx, AppError>;
}

/// One atomic unit of work over bookings, details, cars and invoices
#[async_trait]
pub trait RentalTransaction: Send {
    // ==================== Reference data ====================

    async fn find_customer(&mut self, id: i32) -> Result<Option<Customer>, AppError>;

    async fn find_hub(&mut self, id: i32) -> Result<Option<Hub>, AppError>;

    async fn find_car(&mut self, id: i32) -> Result<Option<Car>, AppError>;

    async fn find_car_type(&mut self, id: i32) -> Result<Option<CarType>, AppError>;

    async fn find_add_on(&mut self, id: i32) -> Result<Option<AddOn>, AppError>;

    /// All hubs, ordered by id
    async fn list_hubs(&mut self) -> Result<Vec<Hub>, AppError>;

    /// Every car in the fleet regardless of availability, ordered by id
    async fn list_cars(&mut self) -> Result<Vec<Car>, AppError>;

    /// The add-on catalog, ordered by id
    async fn list_add_ons(&mut self) -> Result<Vec<AddOn>, AppError>;

    async fn insert_add_on(&mut self, add_on: &AddOn) -> Result<AddOn, AppError>;

    // ==================== Bookings ====================

    /// Read a booking without locking it
    async fn find_booking(&mut self, id: i64) -> Result<Option<Booking>, AppError>;

    /// Read a booking and lock its row until the transaction ends
    async fn lock_booking(&mut self, id: i64) -> Result<Option<Booking>, AppError>;

    async fn find_booking_by_code(&mut self, code: &str) -> Result<Option<Booking>, AppError>;

    /// Every booking, newest first
    async fn list_bookings(&mut self) -> Result<Vec<Booking>, AppError>;

    /// Bookings made with the given (normalized) email, newest first
    async fn list_bookings_by_email(&mut self, email: &str) -> Result<Vec<Booking>, AppError>;

    /// Bookings picked up or returned at a hub, newest first
    async fn list_bookings_by_hub(&mut self, hub_id: i32) -> Result<Vec<Booking>, AppError>;

    /// Insert a booking; `None` when the confirmation code is already taken
    async fn insert_booking(&mut self, booking: &Booking) -> Result<Option<Booking>, AppError>;

    async fn update_booking(&mut self, booking: &Booking) -> Result<Booking, AppError>;

    async fn insert_booking_detail(
        &mut self,
        detail: &BookingDetail,
    ) -> Result<BookingDetail, AppError>;

    async fn list_booking_details(
        &mut self,
        booking_id: i64,
    ) -> Result<Vec<BookingDetail>, AppError>;

    // ==================== Availability ====================

    /// Mark a car unavailable on behalf of a booking.
    ///
    /// Succeeds only if the car is available or already held by the same
    /// booking; returns `false` when the claim lost.
    async fn claim_car(&mut self, car_id: i32, booking_id: i64) -> Result<bool, AppError>;

    /// Make a car available again if it is held by `booking_id` or by nobody
    async fn release_car(&mut self, car_id: i32, booking_id: i64) -> Result<(), AppError>;

    /// Whether a non-cancelled booking other than `exclude` uses the car within `[start, end]`
    async fn car_has_overlap(
        &mut self,
        car_id: i32,
        start: NaiveDate,
        end: NaiveDate,
        exclude: Option<i64>,
    ) -> Result<bool, AppError>;

    /// Available cars at a hub with no overlapping non-cancelled booking, ordered by id
    async fn list_available_cars(
        &mut self,
        hub_id: i32,
        start: NaiveDate,
        end: NaiveDate,
        car_type_id: Option<i32>,
    ) -> Result<Vec<Car>, AppError>;

    // ==================== Invoices ====================

    async fn find_invoice_by_booking(
        &mut self,
        booking_id: i64,
    ) -> Result<Option<Invoice>, AppError>;

    async fn insert_invoice(&mut self, invoice: &Invoice) -> Result<Invoice, AppError>;

    async fn update_invoice(&mut self, invoice: &Invoice) -> Result<Invoice, AppError>;

    /// Make every change in this transaction visible atomically
    async fn commit(self) -> Result<(), AppError>;
}

/// Delivers the finalized invoice to the customer
#[async_trait]
pub trait InvoiceNotifier: Send + Sync {
    async fn send_invoice_email(&self, booking_id: i64, email: &str) -> Result<(), AppError>;
}
