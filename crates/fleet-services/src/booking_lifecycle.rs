//! Booking lifecycle service
//!
//! Drives a booking through its states:
//! - `create`: CONFIRMED booking with customer and rate snapshots
//! - `handover`: CONFIRMED -> ACTIVE, car claimed, skeleton invoice opened
//! - `return_car`: ACTIVE -> COMPLETED, car released, invoice finalized
//! - `cancel`: CONFIRMED/ACTIVE -> CANCELLED, car released
//! - `modify`: dates or car of a CONFIRMED booking
//!
//! Each call runs in one store transaction. The invoice email is sent only
//! after the return has been committed, and its failure never undoes the return.

use crate::availability::{claim, ensure_no_overlap, ensure_valid_range};
use crate::billing::{self, BillingBreakdown};
use crate::confirmation::{normalize_reference, ConfirmationCodeGenerator};
use chrono::{DateTime, NaiveDate, Utc};
use fleet_core::{
    config::RentalConfig,
    models::{
        Booking, BookingDetail, BookingStatus, Car, CreateBooking, HandoverRequest, Invoice,
        ModifyBooking, ReturnRequest,
    },
    traits::{InvoiceNotifier, RentalStore, RentalTransaction},
    AppError, AppResult, Clock, EntityKind,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

/// Booking with its add-on lines and current price
#[derive(Debug, Clone, Serialize)]
pub struct BookingView {
    #[serde(flatten)]
    pub booking: Booking,
    pub add_ons: Vec<BookingDetail>,
    pub quote: BillingBreakdown,
}

impl BookingView {
    fn new(booking: Booking, add_ons: Vec<BookingDetail>) -> Self {
        let quote = billing::quote(&booking, &add_ons);
        Self {
            booking,
            add_ons,
            quote,
        }
    }
}

/// Result of a completed return
#[derive(Debug, Clone, Serialize)]
pub struct ReturnReceipt {
    pub booking: BookingView,
    pub invoice: Invoice,
}

/// Lowercased, trimmed email as stored on bookings
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Booking lifecycle state machine
pub struct BookingService<S: RentalStore> {
    store: Arc<S>,
    notifier: Arc<dyn InvoiceNotifier>,
    clock: Arc<dyn Clock>,
    codes: ConfirmationCodeGenerator,
    config: RentalConfig,
}

impl<S: RentalStore> BookingService<S> {
    /// Create a new booking service
    pub fn new(
        store: Arc<S>,
        notifier: Arc<dyn InvoiceNotifier>,
        clock: Arc<dyn Clock>,
        config: RentalConfig,
    ) -> Self {
        Self {
            store,
            notifier,
            clock,
            codes: ConfirmationCodeGenerator::from_config(&config),
            config,
        }
    }

    // ==================== Commands ====================

    /// Create a CONFIRMED booking
    ///
    /// # Errors
    ///
    /// - `NotFound` if the customer, car, either hub or the car's type does not exist
    /// - `InvalidInput` if the end date is before the start date
    /// - `CarUnavailable` if another live booking uses the car within the dates
    #[instrument(skip(self, request), fields(customer_id = request.customer_id, car_id = request.car_id))]
    pub async fn create(&self, mut request: CreateBooking) -> AppResult<BookingView> {
        request.email = normalize_email(&request.email);
        request.validate()?;
        ensure_valid_range(request.start_date, request.end_date)?;

        let mut tx = self.store.begin().await?;

        let customer = tx
            .find_customer(request.customer_id)
            .await?
            .ok_or_else(|| AppError::not_found(EntityKind::Customer, request.customer_id))?;
        let car = find_car(&mut tx, request.car_id).await?;
        for hub_id in [request.pickup_hub_id, request.return_hub_id] {
            if tx.find_hub(hub_id).await?.is_none() {
                return Err(AppError::not_found(EntityKind::Hub, hub_id));
            }
        }
        let car_type = tx
            .find_car_type(car.car_type_id)
            .await?
            .ok_or_else(|| AppError::not_found(EntityKind::CarType, car.car_type_id))?;

        ensure_no_overlap(&mut tx, car.id, request.start_date, request.end_date, None).await?;

        let now = self.clock.now();
        let draft = Booking {
            id: 0,
            confirmation_code: String::new(),
            status: BookingStatus::Confirmed,
            customer_id: customer.id,
            car_id: Some(car.id),
            car_type_id: car_type.id,
            pickup_hub_id: request.pickup_hub_id,
            return_hub_id: request.return_hub_id,
            start_date: request.start_date,
            end_date: request.end_date,
            booking_date: now.date_naive(),
            customer: customer.snapshot(&request.email),
            rates: car_type.rate_snapshot(),
            car_name: Some(car.name.clone()),
            pickup_at: None,
            pickup_fuel_level: None,
            pickup_notes: None,
            returned_at: None,
            return_fuel_level: None,
            return_notes: None,
            created_at: now,
            updated_at: now,
        };

        let booking = self.insert_with_fresh_code(&mut tx, draft).await?;

        let mut details = Vec::with_capacity(request.add_on_ids.len());
        for add_on_id in &request.add_on_ids {
            let Some(add_on) = tx.find_add_on(*add_on_id).await? else {
                debug!("Skipping unknown add-on {}", add_on_id);
                continue;
            };

            let detail = BookingDetail {
                id: 0,
                booking_id: booking.id,
                add_on_id: add_on.id,
                add_on_name: add_on.name,
                add_on_daily_rate: add_on.daily_rate,
            };
            details.push(tx.insert_booking_detail(&detail).await?);
        }

        tx.commit().await?;

        info!(
            "Booking {} ({}) confirmed for customer {} with car {}",
            booking.id, booking.confirmation_code, booking.customer_id, car.id
        );

        Ok(BookingView::new(booking, details))
    }

    /// Hand the car over: CONFIRMED -> ACTIVE
    ///
    /// A `new_car_id` different from the assigned car swaps cars and re-snapshots
    /// the rates from the new car's type. The rental starts today; a pickup after
    /// the booked end date moves the end date up to today.
    #[instrument(skip(self, request))]
    pub async fn handover(&self, booking_id: i64, request: HandoverRequest) -> AppResult<BookingView> {
        request.validate()?;

        let mut tx = self.store.begin().await?;
        let mut booking = lock_booking(&mut tx, booking_id).await?;
        require_status(&booking, BookingStatus::Confirmed)?;

        let now = self.clock.now();
        let today = now.date_naive();
        // A late pickup still keeps the car for at least the pickup day
        let end = booking.end_date.max(today);

        match request.new_car_id.filter(|id| Some(*id) != booking.car_id) {
            Some(new_car_id) => {
                self.swap_car(&mut tx, &mut booking, new_car_id, today, end)
                    .await?;
            }
            None => {
                if let Some(car_id) = booking.car_id {
                    claim(&mut tx, car_id, booking.id).await?;
                } else {
                    warn!("Booking {} handed over without an assigned car", booking.id);
                }
            }
        }

        booking.pickup_at = Some(now);
        if request.fuel_status.is_some() {
            booking.pickup_fuel_level = request.fuel_status;
        }
        if request.notes.is_some() {
            booking.pickup_notes = request.notes;
        }
        booking.start_date = today;
        booking.end_date = end;
        booking.status = BookingStatus::Active;
        booking.updated_at = now;

        let booking = tx.update_booking(&booking).await?;

        match tx.find_invoice_by_booking(booking.id).await? {
            Some(mut invoice) => {
                warn!("Booking {} already had an invoice, reopening it", booking.id);
                invoice.handover_date = today;
                invoice.updated_at = now;
                tx.update_invoice(&invoice).await?;
            }
            None => {
                tx.insert_invoice(&Invoice::skeleton(booking.id, today, now))
                    .await?;
            }
        }

        let details = tx.list_booking_details(booking.id).await?;
        tx.commit().await?;

        info!(
            "Booking {} handed over with car {:?}",
            booking.id, booking.car_id
        );

        Ok(BookingView::new(booking, details))
    }

    /// Take the car back: ACTIVE -> COMPLETED, invoice finalized
    ///
    /// The invoice email goes out after the commit; a failed send is logged only.
    /// A `return_date` before the pickup date is rejected with `InvalidInput`.
    #[instrument(skip(self, request))]
    pub async fn return_car(&self, booking_id: i64, request: ReturnRequest) -> AppResult<ReturnReceipt> {
        request.validate()?;

        let mut tx = self.store.begin().await?;
        let mut booking = lock_booking(&mut tx, booking_id).await?;
        require_status(&booking, BookingStatus::Active)?;

        let now = self.clock.now();
        let return_date = request.return_date.unwrap_or_else(|| now.date_naive());
        if return_date < booking.start_date {
            return Err(AppError::InvalidInput(format!(
                "return date {} is before pickup date {}",
                return_date, booking.start_date
            )));
        }

        booking.status = BookingStatus::Completed;
        booking.returned_at = Some(now);
        if request.fuel_status.is_some() {
            booking.return_fuel_level = request.fuel_status;
        }
        if request.notes.is_some() {
            booking.return_notes = request.notes;
        }
        booking.end_date = return_date;
        booking.updated_at = now;

        if let Some(car_id) = booking.car_id {
            tx.release_car(car_id, booking.id).await?;
        }

        let details = tx.list_booking_details(booking.id).await?;
        let bill = billing::price_booking(&booking, &details, return_date);

        let mut invoice = match tx.find_invoice_by_booking(booking.id).await? {
            Some(invoice) => invoice,
            None => {
                warn!(
                    "Booking {} has no invoice from handover, opening one at return",
                    booking.id
                );
                let handover_date = booking
                    .pickup_at
                    .map(|at| at.date_naive())
                    .unwrap_or(booking.start_date);
                tx.insert_invoice(&Invoice::skeleton(booking.id, handover_date, now))
                    .await?
            }
        };
        apply_bill(&mut invoice, &bill, return_date, now);
        let invoice = tx.update_invoice(&invoice).await?;

        let booking = tx.update_booking(&booking).await?;
        tx.commit().await?;

        info!(
            "Booking {} completed: {} days, total {}",
            booking.id, bill.days, bill.total_amount
        );

        if self.config.send_invoice_emails {
            if let Err(e) = self
                .notifier
                .send_invoice_email(booking.id, &booking.customer.email)
                .await
            {
                warn!("Invoice email for booking {} failed: {}", booking.id, e);
            }
        }

        Ok(ReturnReceipt {
            booking: BookingView::new(booking, details),
            invoice,
        })
    }

    /// Cancel a booking that is not yet terminal
    #[instrument(skip(self))]
    pub async fn cancel(&self, booking_id: i64) -> AppResult<BookingView> {
        let mut tx = self.store.begin().await?;
        let mut booking = lock_booking(&mut tx, booking_id).await?;

        if booking.status.is_terminal() {
            warn!("Booking {} is already {}", booking.id, booking.status);
            return Err(AppError::AlreadyTerminal {
                status: booking.status,
            });
        }

        let previous = booking.status;
        booking.status = BookingStatus::Cancelled;
        booking.updated_at = self.clock.now();

        if let Some(car_id) = booking.car_id {
            tx.release_car(car_id, booking.id).await?;
        }

        let booking = tx.update_booking(&booking).await?;
        let details = tx.list_booking_details(booking.id).await?;
        tx.commit().await?;

        info!("Booking {} cancelled (was {})", booking.id, previous);

        Ok(BookingView::new(booking, details))
    }

    /// Change dates and/or car of a CONFIRMED booking
    ///
    /// Only the supplied fields change.
    #[instrument(skip(self, request))]
    pub async fn modify(&self, booking_id: i64, request: ModifyBooking) -> AppResult<BookingView> {
        request.validate()?;

        let mut tx = self.store.begin().await?;
        let mut booking = lock_booking(&mut tx, booking_id).await?;
        require_status(&booking, BookingStatus::Confirmed)?;

        let start = request.start_date.unwrap_or(booking.start_date);
        let end = request.end_date.unwrap_or(booking.end_date);
        ensure_valid_range(start, end)?;

        let dates_changed = start != booking.start_date || end != booking.end_date;

        match request.car_id.filter(|id| Some(*id) != booking.car_id) {
            Some(new_car_id) => {
                self.swap_car(&mut tx, &mut booking, new_car_id, start, end)
                    .await?;
            }
            None if dates_changed => {
                if let Some(car_id) = booking.car_id {
                    ensure_no_overlap(&mut tx, car_id, start, end, Some(booking.id)).await?;
                }
            }
            None => {}
        }

        booking.start_date = start;
        booking.end_date = end;
        booking.updated_at = self.clock.now();

        let booking = tx.update_booking(&booking).await?;
        let details = tx.list_booking_details(booking.id).await?;
        tx.commit().await?;

        info!(
            "Booking {} modified: {} to {}, car {:?}",
            booking.id, booking.start_date, booking.end_date, booking.car_id
        );

        Ok(BookingView::new(booking, details))
    }

    // ==================== Queries ====================

    /// Booking by id
    #[instrument(skip(self))]
    pub async fn get(&self, booking_id: i64) -> AppResult<BookingView> {
        let mut tx = self.store.begin().await?;
        let booking = tx
            .find_booking(booking_id)
            .await?
            .ok_or_else(|| AppError::not_found(EntityKind::Booking, booking_id))?;

        load_view(&mut tx, booking).await
    }

    /// Booking by numeric id or confirmation code, with an optional leading `#`
    #[instrument(skip(self))]
    pub async fn find_by_reference(&self, reference: &str) -> AppResult<BookingView> {
        let normalized = normalize_reference(reference);
        if normalized.is_empty() {
            return Err(AppError::InvalidInput("empty booking reference".to_string()));
        }

        let mut tx = self.store.begin().await?;
        let booking = match normalized.parse::<i64>() {
            Ok(id) => tx.find_booking(id).await?,
            Err(_) => tx.find_booking_by_code(&normalized).await?,
        };

        match booking {
            Some(booking) => load_view(&mut tx, booking).await,
            None => Err(AppError::not_found(EntityKind::Booking, normalized)),
        }
    }

    /// Every booking, newest first
    #[instrument(skip(self))]
    pub async fn list_all(&self) -> AppResult<Vec<BookingView>> {
        let mut tx = self.store.begin().await?;
        let bookings = tx.list_bookings().await?;

        load_views(&mut tx, bookings).await
    }

    /// Bookings made with an email address, newest first
    #[instrument(skip(self))]
    pub async fn list_by_email(&self, email: &str) -> AppResult<Vec<BookingView>> {
        let email = normalize_email(email);
        let mut tx = self.store.begin().await?;
        let bookings = tx.list_bookings_by_email(&email).await?;

        load_views(&mut tx, bookings).await
    }

    /// Bookings picked up or returned at a hub, newest first
    #[instrument(skip(self))]
    pub async fn list_by_hub(&self, hub_id: i32) -> AppResult<Vec<BookingView>> {
        let mut tx = self.store.begin().await?;
        if tx.find_hub(hub_id).await?.is_none() {
            return Err(AppError::not_found(EntityKind::Hub, hub_id));
        }
        let bookings = tx.list_bookings_by_hub(hub_id).await?;

        load_views(&mut tx, bookings).await
    }

    // ==================== Helpers ====================

    /// Insert the booking, drawing a new confirmation code on every collision
    async fn insert_with_fresh_code(&self, tx: &mut S::Tx, mut draft: Booking) -> AppResult<Booking> {
        let attempts = self.config.max_code_attempts.max(1);

        for attempt in 1..=attempts {
            draft.confirmation_code = self.codes.generate();
            if let Some(booking) = tx.insert_booking(&draft).await? {
                return Ok(booking);
            }
            warn!(
                "Confirmation code {} collided (attempt {}/{})",
                draft.confirmation_code, attempt, attempts
            );
        }

        Err(AppError::Conflict(format!(
            "could not allocate a unique confirmation code after {} attempts",
            attempts
        )))
    }

    /// Move the booking to another car and take that car's type rates
    async fn swap_car(
        &self,
        tx: &mut S::Tx,
        booking: &mut Booking,
        new_car_id: i32,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<()> {
        let new_car = find_car(tx, new_car_id).await?;
        let car_type = tx
            .find_car_type(new_car.car_type_id)
            .await?
            .ok_or_else(|| AppError::not_found(EntityKind::CarType, new_car.car_type_id))?;

        ensure_no_overlap(tx, new_car.id, start, end, Some(booking.id)).await?;
        claim(tx, new_car.id, booking.id).await?;

        if let Some(old_car_id) = booking.car_id {
            tx.release_car(old_car_id, booking.id).await?;
        }

        info!(
            "Booking {} moved from car {:?} to car {}",
            booking.id, booking.car_id, new_car.id
        );

        booking.car_id = Some(new_car.id);
        booking.car_name = Some(new_car.name);
        booking.car_type_id = car_type.id;
        booking.rates = car_type.rate_snapshot();
        Ok(())
    }
}

fn require_status(booking: &Booking, required: BookingStatus) -> AppResult<()> {
    if booking.status != required {
        warn!(
            "Booking {} is {}, operation requires {}",
            booking.id, booking.status, required
        );
        return Err(AppError::InvalidState {
            current: booking.status,
            required,
        });
    }
    Ok(())
}

fn apply_bill(
    invoice: &mut Invoice,
    bill: &BillingBreakdown,
    return_date: NaiveDate,
    now: DateTime<Utc>,
) {
    invoice.return_date = Some(return_date);
    invoice.rental_amount = Some(bill.rental_amount);
    invoice.add_on_amount = Some(bill.add_on_amount);
    invoice.total_amount = Some(bill.total_amount);
    invoice.rate_description = Some(bill.rate_description());
    invoice.updated_at = now;
}

async fn lock_booking<T: RentalTransaction>(tx: &mut T, booking_id: i64) -> AppResult<Booking> {
    tx.lock_booking(booking_id)
        .await?
        .ok_or_else(|| AppError::not_found(EntityKind::Booking, booking_id))
}

async fn find_car<T: RentalTransaction>(tx: &mut T, car_id: i32) -> AppResult<Car> {
    tx.find_car(car_id)
        .await?
        .ok_or_else(|| AppError::not_found(EntityKind::Car, car_id))
}

async fn load_view<T: RentalTransaction>(tx: &mut T, booking: Booking) -> AppResult<BookingView> {
    let details = tx.list_booking_details(booking.id).await?;
    Ok(BookingView::new(booking, details))
}

async fn load_views<T: RentalTransaction>(
    tx: &mut T,
    bookings: Vec<Booking>,
) -> AppResult<Vec<BookingView>> {
    let mut views = Vec::with_capacity(bookings.len());
    for booking in bookings {
        views.push(load_view(tx, booking).await?);
    }
    Ok(views)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Asha.Rao@Example.COM "), "asha.rao@example.com");
    }
}
