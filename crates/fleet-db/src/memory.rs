//! In-memory rental store
//!
//! Holds every table behind one async mutex. A transaction takes the lock,
//! works on a private copy of the tables, and swaps the copy in on commit.
//! Dropping the transaction discards the copy, which gives the same
//! all-or-nothing behaviour as the PostgreSQL store.

use async_trait::async_trait;
use chrono::NaiveDate;
use fleet_core::{
    models::{
        AddOn, Availability, Booking, BookingDetail, Car, CarType, Customer, Hub, Invoice,
    },
    traits::{RentalStore, RentalTransaction},
    AppError, AppResult,
};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

/// All rental tables, keyed by primary key
#[derive(Debug, Clone, Default)]
pub struct FleetTables {
    pub customers: BTreeMap<i32, Customer>,
    pub hubs: BTreeMap<i32, Hub>,
    pub car_types: BTreeMap<i32, CarType>,
    pub cars: BTreeMap<i32, Car>,
    pub add_ons: BTreeMap<i32, AddOn>,
    pub bookings: BTreeMap<i64, Booking>,
    pub booking_details: BTreeMap<i64, BookingDetail>,
    pub invoices: BTreeMap<i64, Invoice>,
    last_booking_id: i64,
    last_detail_id: i64,
    last_invoice_id: i64,
}

impl FleetTables {
    pub fn car(&self, id: i32) -> Option<&Car> {
        self.cars.get(&id)
    }

    pub fn booking(&self, id: i64) -> Option<&Booking> {
        self.bookings.get(&id)
    }

    pub fn invoice_for(&self, booking_id: i64) -> Option<&Invoice> {
        self.invoices.values().find(|i| i.booking_id == booking_id)
    }

    pub fn details_for(&self, booking_id: i64) -> Vec<&BookingDetail> {
        self.booking_details
            .values()
            .filter(|d| d.booking_id == booking_id)
            .collect()
    }

    fn overlapping_booking_exists(
        &self,
        car_id: i32,
        start: NaiveDate,
        end: NaiveDate,
        exclude: Option<i64>,
    ) -> bool {
        self.bookings.values().any(|b| {
            b.car_id == Some(car_id)
                && b.status.blocks_car()
                && b.overlaps(start, end)
                && Some(b.id) != exclude
        })
    }

    fn bookings_where(&self, keep: impl Fn(&Booking) -> bool) -> Vec<Booking> {
        self.bookings
            .values()
            .rev()
            .filter(|b| keep(b))
            .cloned()
            .collect()
    }
}

/// Rental store kept entirely in memory
#[derive(Clone, Default)]
pub struct InMemoryRentalStore {
    tables: Arc<Mutex<FleetTables>>,
    fail_commits: Arc<AtomicBool>,
}

impl InMemoryRentalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from pre-populated tables
    pub fn with_tables(tables: FleetTables) -> Self {
        Self {
            tables: Arc::new(Mutex::new(tables)),
            fail_commits: Arc::default(),
        }
    }

    /// Mutate the committed tables directly, outside any transaction
    pub async fn seed(&self, f: impl FnOnce(&mut FleetTables)) {
        let mut tables = self.tables.lock().await;
        f(&mut tables);
    }

    /// Copy of the committed tables
    pub async fn snapshot(&self) -> FleetTables {
        self.tables.lock().await.clone()
    }

    /// Make every subsequent commit fail, leaving the committed tables untouched
    pub fn fail_commits(&self, fail: bool) {
        self.fail_commits.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl RentalStore for InMemoryRentalStore {
    type Tx = InMemoryTransaction;

    async fn begin(&self) -> AppResult<InMemoryTransaction> {
        let guard = self.tables.clone().lock_owned().await;
        let working = guard.clone();

        Ok(InMemoryTransaction {
            guard,
            working,
            fail_commit: self.fail_commits.load(Ordering::SeqCst),
        })
    }
}

/// Transaction over a private copy of the tables
pub struct InMemoryTransaction {
    guard: OwnedMutexGuard<FleetTables>,
    working: FleetTables,
    fail_commit: bool,
}

#[async_trait]
impl RentalTransaction for InMemoryTransaction {
    async fn find_customer(&mut self, id: i32) -> AppResult<Option<Customer>> {
        Ok(self.working.customers.get(&id).cloned())
    }

    async fn find_hub(&mut self, id: i32) -> AppResult<Option<Hub>> {
        Ok(self.working.hubs.get(&id).cloned())
    }

    async fn find_car(&mut self, id: i32) -> AppResult<Option<Car>> {
        Ok(self.working.cars.get(&id).cloned())
    }

    async fn find_car_type(&mut self, id: i32) -> AppResult<Option<CarType>> {
        Ok(self.working.car_types.get(&id).cloned())
    }

    async fn find_add_on(&mut self, id: i32) -> AppResult<Option<AddOn>> {
        Ok(self.working.add_ons.get(&id).cloned())
    }

    async fn list_hubs(&mut self) -> AppResult<Vec<Hub>> {
        Ok(self.working.hubs.values().cloned().collect())
    }

    async fn list_cars(&mut self) -> AppResult<Vec<Car>> {
        Ok(self.working.cars.values().cloned().collect())
    }

    async fn list_add_ons(&mut self) -> AppResult<Vec<AddOn>> {
        Ok(self.working.add_ons.values().cloned().collect())
    }

    async fn insert_add_on(&mut self, add_on: &AddOn) -> AppResult<AddOn> {
        let id = self.working.add_ons.keys().next_back().map_or(1, |last| last + 1);
        let mut stored = add_on.clone();
        stored.id = id;
        self.working.add_ons.insert(id, stored.clone());

        Ok(stored)
    }

    async fn find_booking(&mut self, id: i64) -> AppResult<Option<Booking>> {
        Ok(self.working.bookings.get(&id).cloned())
    }

    async fn lock_booking(&mut self, id: i64) -> AppResult<Option<Booking>> {
        // The whole store is already locked for this transaction.
        self.find_booking(id).await
    }

    async fn find_booking_by_code(&mut self, code: &str) -> AppResult<Option<Booking>> {
        Ok(self
            .working
            .bookings
            .values()
            .find(|b| b.confirmation_code == code)
            .cloned())
    }

    async fn list_bookings(&mut self) -> AppResult<Vec<Booking>> {
        Ok(self.working.bookings_where(|_| true))
    }

    async fn list_bookings_by_email(&mut self, email: &str) -> AppResult<Vec<Booking>> {
        Ok(self.working.bookings_where(|b| b.customer.email == email))
    }

    async fn list_bookings_by_hub(&mut self, hub_id: i32) -> AppResult<Vec<Booking>> {
        Ok(self.working.bookings_where(|b| b.touches_hub(hub_id)))
    }

    async fn insert_booking(&mut self, booking: &Booking) -> AppResult<Option<Booking>> {
        let taken = self
            .working
            .bookings
            .values()
            .any(|b| b.confirmation_code == booking.confirmation_code);
        if taken {
            debug!("Confirmation code already taken");
            return Ok(None);
        }

        self.working.last_booking_id += 1;
        let mut stored = booking.clone();
        stored.id = self.working.last_booking_id;
        self.working.bookings.insert(stored.id, stored.clone());

        Ok(Some(stored))
    }

    async fn update_booking(&mut self, booking: &Booking) -> AppResult<Booking> {
        match self.working.bookings.get_mut(&booking.id) {
            Some(existing) => {
                *existing = booking.clone();
                Ok(booking.clone())
            }
            None => Err(AppError::Database(format!(
                "Failed to update booking: no row with id {}",
                booking.id
            ))),
        }
    }

    async fn insert_booking_detail(&mut self, detail: &BookingDetail) -> AppResult<BookingDetail> {
        if !self.working.bookings.contains_key(&detail.booking_id) {
            return Err(AppError::Database(format!(
                "Failed to insert booking detail: booking {} does not exist",
                detail.booking_id
            )));
        }

        self.working.last_detail_id += 1;
        let mut stored = detail.clone();
        stored.id = self.working.last_detail_id;
        self.working.booking_details.insert(stored.id, stored.clone());

        Ok(stored)
    }

    async fn list_booking_details(&mut self, booking_id: i64) -> AppResult<Vec<BookingDetail>> {
        Ok(self
            .working
            .details_for(booking_id)
            .into_iter()
            .cloned()
            .collect())
    }

    async fn claim_car(&mut self, car_id: i32, booking_id: i64) -> AppResult<bool> {
        match self.working.cars.get_mut(&car_id) {
            Some(car) if car.claimable_by(booking_id) => {
                car.availability = Availability::Unavailable;
                car.held_by_booking_id = Some(booking_id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn release_car(&mut self, car_id: i32, booking_id: i64) -> AppResult<()> {
        if let Some(car) = self.working.cars.get_mut(&car_id) {
            match car.held_by_booking_id {
                Some(holder) if holder != booking_id => {
                    debug!("Car {} is held by another booking, left untouched", car_id);
                }
                _ => {
                    car.availability = Availability::Available;
                    car.held_by_booking_id = None;
                }
            }
        }
        Ok(())
    }

    async fn car_has_overlap(
        &mut self,
        car_id: i32,
        start: NaiveDate,
        end: NaiveDate,
        exclude: Option<i64>,
    ) -> AppResult<bool> {
        Ok(self
            .working
            .overlapping_booking_exists(car_id, start, end, exclude))
    }

    async fn list_available_cars(
        &mut self,
        hub_id: i32,
        start: NaiveDate,
        end: NaiveDate,
        car_type_id: Option<i32>,
    ) -> AppResult<Vec<Car>> {
        let tables = &self.working;
        Ok(tables
            .cars
            .values()
            .filter(|c| c.hub_id == hub_id)
            .filter(|c| c.availability == Availability::Available)
            .filter(|c| car_type_id.map_or(true, |t| c.car_type_id == t))
            .filter(|c| !tables.overlapping_booking_exists(c.id, start, end, None))
            .cloned()
            .collect())
    }

    async fn find_invoice_by_booking(&mut self, booking_id: i64) -> AppResult<Option<Invoice>> {
        Ok(self.working.invoice_for(booking_id).cloned())
    }

    async fn insert_invoice(&mut self, invoice: &Invoice) -> AppResult<Invoice> {
        if self.working.invoice_for(invoice.booking_id).is_some() {
            return Err(AppError::AlreadyExists(format!(
                "invoice for booking {}",
                invoice.booking_id
            )));
        }

        self.working.last_invoice_id += 1;
        let mut stored = invoice.clone();
        stored.id = self.working.last_invoice_id;
        self.working.invoices.insert(stored.id, stored.clone());

        Ok(stored)
    }

    async fn update_invoice(&mut self, invoice: &Invoice) -> AppResult<Invoice> {
        match self.working.invoices.get_mut(&invoice.id) {
            Some(existing) => {
                *existing = invoice.clone();
                Ok(invoice.clone())
            }
            None => Err(AppError::Database(format!(
                "Failed to update invoice: no row with id {}",
                invoice.id
            ))),
        }
    }

    async fn commit(self) -> AppResult<()> {
        if self.fail_commit {
            return Err(AppError::Transaction(
                "Failed to commit transaction: commits disabled".to_string(),
            ));
        }

        let mut guard = self.guard;
        *guard = self.working;
        Ok(())
    }
}
