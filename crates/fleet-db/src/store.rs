//! PostgreSQL implementation of the rental unit of work
//!
//! Every lifecycle operation runs in one `sqlx` transaction. Booking rows are
//! locked with `FOR UPDATE` and cars are claimed with a conditional update, so
//! two concurrent handovers of the same car cannot both succeed.

use crate::rows::{
    AddOnRow, BookingDetailRow, BookingRow, CarRow, CarTypeRow, CustomerRow, HubRow, InvoiceRow,
    BOOKING_COLUMNS, CAR_COLUMNS, CAR_TYPE_COLUMNS, INVOICE_COLUMNS,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use fleet_core::{
    models::{AddOn, Booking, BookingDetail, Car, CarType, Customer, Hub, Invoice},
    traits::{RentalStore, RentalTransaction},
    AppError, AppResult,
};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{debug, error, instrument};

/// Opens PostgreSQL transactions for the booking lifecycle
#[derive(Clone)]
pub struct PgRentalStore {
    pool: PgPool,
}

impl PgRentalStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RentalStore for PgRentalStore {
    type Tx = PgRentalTransaction;

    async fn begin(&self) -> AppResult<PgRentalTransaction> {
        let tx = self.pool.begin().await.map_err(|e| {
            error!("Failed to start transaction: {}", e);
            AppError::Transaction(format!("Failed to start transaction: {}", e))
        })?;

        Ok(PgRentalTransaction { tx })
    }
}

/// A live PostgreSQL transaction; dropped without commit it rolls back
pub struct PgRentalTransaction {
    tx: Transaction<'static, Postgres>,
}

fn db_error(context: &str, e: sqlx::Error) -> AppError {
    error!("Database error {}: {}", context, e);
    AppError::Database(format!("Failed to {}: {}", context, e))
}

impl PgRentalTransaction {
    async fn fetch_bookings(&mut self, sql: &str, bind: BookingFilter<'_>) -> AppResult<Vec<Booking>> {
        let query = sqlx::query_as::<Postgres, BookingRow>(sql);
        let query = match bind {
            BookingFilter::All => query,
            BookingFilter::Email(email) => query.bind(email),
            BookingFilter::Hub(hub_id) => query.bind(hub_id),
        };

        let rows = query
            .fetch_all(&mut *self.tx)
            .await
            .map_err(|e| db_error("list bookings", e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

enum BookingFilter<'a> {
    All,
    Email(&'a str),
    Hub(i32),
}

#[async_trait]
impl RentalTransaction for PgRentalTransaction {
    #[instrument(skip(self))]
    async fn find_customer(&mut self, id: i32) -> AppResult<Option<Customer>> {
        let row = sqlx::query_as::<Postgres, CustomerRow>(
            r#"
            SELECT
                id, first_name, last_name, address_line1, address_line2,
                city, state, pincode, email, phone, mobile, driving_licence_number
            FROM customers
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| db_error("find customer", e))?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn find_hub(&mut self, id: i32) -> AppResult<Option<Hub>> {
        let row = sqlx::query_as::<Postgres, HubRow>(
            "SELECT id, name, address, contact_number FROM hubs WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| db_error("find hub", e))?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn find_car(&mut self, id: i32) -> AppResult<Option<Car>> {
        let sql = format!("SELECT {} FROM cars WHERE id = $1", CAR_COLUMNS);
        let row = sqlx::query_as::<Postgres, CarRow>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| db_error("find car", e))?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn find_car_type(&mut self, id: i32) -> AppResult<Option<CarType>> {
        let sql = format!("SELECT {} FROM car_types WHERE id = $1", CAR_TYPE_COLUMNS);
        let row = sqlx::query_as::<Postgres, CarTypeRow>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| db_error("find car type", e))?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn find_add_on(&mut self, id: i32) -> AppResult<Option<AddOn>> {
        let row = sqlx::query_as::<Postgres, AddOnRow>(
            "SELECT id, name, daily_rate, rate_valid_until FROM add_ons WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| db_error("find add-on", e))?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn list_hubs(&mut self) -> AppResult<Vec<Hub>> {
        let rows = sqlx::query_as::<Postgres, HubRow>(
            "SELECT id, name, address, contact_number FROM hubs ORDER BY id",
        )
        .fetch_all(&mut *self.tx)
        .await
        .map_err(|e| db_error("list hubs", e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn list_cars(&mut self) -> AppResult<Vec<Car>> {
        let sql = format!("SELECT {} FROM cars ORDER BY id", CAR_COLUMNS);
        let rows = sqlx::query_as::<Postgres, CarRow>(&sql)
            .fetch_all(&mut *self.tx)
            .await
            .map_err(|e| db_error("list cars", e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn list_add_ons(&mut self) -> AppResult<Vec<AddOn>> {
        let rows = sqlx::query_as::<Postgres, AddOnRow>(
            "SELECT id, name, daily_rate, rate_valid_until FROM add_ons ORDER BY id",
        )
        .fetch_all(&mut *self.tx)
        .await
        .map_err(|e| db_error("list add-ons", e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self, add_on), fields(name = %add_on.name))]
    async fn insert_add_on(&mut self, add_on: &AddOn) -> AppResult<AddOn> {
        let row = sqlx::query_as::<Postgres, AddOnRow>(
            r#"
            INSERT INTO add_ons (name, daily_rate, rate_valid_until)
            VALUES ($1, $2, $3)
            RETURNING id, name, daily_rate, rate_valid_until
            "#,
        )
        .bind(&add_on.name)
        .bind(add_on.daily_rate)
        .bind(add_on.rate_valid_until)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| db_error("insert add-on", e))?;

        Ok(row.into())
    }

    #[instrument(skip(self))]
    async fn find_booking(&mut self, id: i64) -> AppResult<Option<Booking>> {
        let sql = format!("SELECT {} FROM bookings WHERE id = $1", BOOKING_COLUMNS);
        let row = sqlx::query_as::<Postgres, BookingRow>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| db_error("find booking", e))?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn lock_booking(&mut self, id: i64) -> AppResult<Option<Booking>> {
        let sql = format!(
            "SELECT {} FROM bookings WHERE id = $1 FOR UPDATE",
            BOOKING_COLUMNS
        );
        let row = sqlx::query_as::<Postgres, BookingRow>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| db_error("lock booking", e))?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn find_booking_by_code(&mut self, code: &str) -> AppResult<Option<Booking>> {
        let sql = format!(
            "SELECT {} FROM bookings WHERE confirmation_code = $1",
            BOOKING_COLUMNS
        );
        let row = sqlx::query_as::<Postgres, BookingRow>(&sql)
            .bind(code)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| db_error("find booking by code", e))?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn list_bookings(&mut self) -> AppResult<Vec<Booking>> {
        let sql = format!("SELECT {} FROM bookings ORDER BY id DESC", BOOKING_COLUMNS);
        self.fetch_bookings(&sql, BookingFilter::All).await
    }

    #[instrument(skip(self))]
    async fn list_bookings_by_email(&mut self, email: &str) -> AppResult<Vec<Booking>> {
        let sql = format!(
            "SELECT {} FROM bookings WHERE email = $1 ORDER BY id DESC",
            BOOKING_COLUMNS
        );
        self.fetch_bookings(&sql, BookingFilter::Email(email)).await
    }

    #[instrument(skip(self))]
    async fn list_bookings_by_hub(&mut self, hub_id: i32) -> AppResult<Vec<Booking>> {
        let sql = format!(
            "SELECT {} FROM bookings WHERE pickup_hub_id = $1 OR return_hub_id = $1 ORDER BY id DESC",
            BOOKING_COLUMNS
        );
        self.fetch_bookings(&sql, BookingFilter::Hub(hub_id)).await
    }

    #[instrument(skip(self, booking), fields(code = %booking.confirmation_code))]
    async fn insert_booking(&mut self, booking: &Booking) -> AppResult<Option<Booking>> {
        let sql = format!(
            r#"
            INSERT INTO bookings (
                confirmation_code, status, customer_id, car_id, car_type_id,
                pickup_hub_id, return_hub_id, start_date, end_date, booking_date,
                first_name, last_name, address, pin, state, email,
                daily_rate, weekly_rate, monthly_rate, car_name,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16,
                    $17, $18, $19, $20, $21, $22)
            ON CONFLICT (confirmation_code) DO NOTHING
            RETURNING {}
            "#,
            BOOKING_COLUMNS
        );

        let row = sqlx::query_as::<Postgres, BookingRow>(&sql)
            .bind(&booking.confirmation_code)
            .bind(booking.status.to_string())
            .bind(booking.customer_id)
            .bind(booking.car_id)
            .bind(booking.car_type_id)
            .bind(booking.pickup_hub_id)
            .bind(booking.return_hub_id)
            .bind(booking.start_date)
            .bind(booking.end_date)
            .bind(booking.booking_date)
            .bind(&booking.customer.first_name)
            .bind(&booking.customer.last_name)
            .bind(&booking.customer.address)
            .bind(&booking.customer.pin)
            .bind(&booking.customer.state)
            .bind(&booking.customer.email)
            .bind(booking.rates.daily_rate)
            .bind(booking.rates.weekly_rate)
            .bind(booking.rates.monthly_rate)
            .bind(&booking.car_name)
            .bind(booking.created_at)
            .bind(booking.updated_at)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| db_error("insert booking", e))?;

        if row.is_none() {
            debug!("Confirmation code already taken");
        }

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self, booking), fields(booking_id = booking.id))]
    async fn update_booking(&mut self, booking: &Booking) -> AppResult<Booking> {
        let sql = format!(
            r#"
            UPDATE bookings
            SET status = $2,
                car_id = $3,
                car_type_id = $4,
                start_date = $5,
                end_date = $6,
                daily_rate = $7,
                weekly_rate = $8,
                monthly_rate = $9,
                car_name = $10,
                pickup_at = $11,
                pickup_fuel_level = $12,
                pickup_notes = $13,
                returned_at = $14,
                return_fuel_level = $15,
                return_notes = $16,
                updated_at = $17
            WHERE id = $1
            RETURNING {}
            "#,
            BOOKING_COLUMNS
        );

        let row = sqlx::query_as::<Postgres, BookingRow>(&sql)
            .bind(booking.id)
            .bind(booking.status.to_string())
            .bind(booking.car_id)
            .bind(booking.car_type_id)
            .bind(booking.start_date)
            .bind(booking.end_date)
            .bind(booking.rates.daily_rate)
            .bind(booking.rates.weekly_rate)
            .bind(booking.rates.monthly_rate)
            .bind(&booking.car_name)
            .bind(booking.pickup_at)
            .bind(&booking.pickup_fuel_level)
            .bind(&booking.pickup_notes)
            .bind(booking.returned_at)
            .bind(&booking.return_fuel_level)
            .bind(&booking.return_notes)
            .bind(booking.updated_at)
            .fetch_one(&mut *self.tx)
            .await
            .map_err(|e| db_error("update booking", e))?;

        Ok(row.into())
    }

    #[instrument(skip(self, detail), fields(booking_id = detail.booking_id))]
    async fn insert_booking_detail(&mut self, detail: &BookingDetail) -> AppResult<BookingDetail> {
        let row = sqlx::query_as::<Postgres, BookingDetailRow>(
            r#"
            INSERT INTO booking_details (booking_id, add_on_id, add_on_name, add_on_daily_rate)
            VALUES ($1, $2, $3, $4)
            RETURNING id, booking_id, add_on_id, add_on_name, add_on_daily_rate
            "#,
        )
        .bind(detail.booking_id)
        .bind(detail.add_on_id)
        .bind(&detail.add_on_name)
        .bind(detail.add_on_daily_rate)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| db_error("insert booking detail", e))?;

        Ok(row.into())
    }

    #[instrument(skip(self))]
    async fn list_booking_details(&mut self, booking_id: i64) -> AppResult<Vec<BookingDetail>> {
        let rows = sqlx::query_as::<Postgres, BookingDetailRow>(
            r#"
            SELECT id, booking_id, add_on_id, add_on_name, add_on_daily_rate
            FROM booking_details
            WHERE booking_id = $1
            ORDER BY id
            "#,
        )
        .bind(booking_id)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(|e| db_error("list booking details", e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn claim_car(&mut self, car_id: i32, booking_id: i64) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE cars
            SET availability = 'N', held_by_booking_id = $2
            WHERE id = $1
              AND (availability = 'Y' OR held_by_booking_id = $2)
            "#,
        )
        .bind(car_id)
        .bind(booking_id)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| db_error("claim car", e))?;

        Ok(result.rows_affected() == 1)
    }

    #[instrument(skip(self))]
    async fn release_car(&mut self, car_id: i32, booking_id: i64) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE cars
            SET availability = 'Y', held_by_booking_id = NULL
            WHERE id = $1
              AND (held_by_booking_id = $2 OR held_by_booking_id IS NULL)
            "#,
        )
        .bind(car_id)
        .bind(booking_id)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| db_error("release car", e))?;

        if result.rows_affected() == 0 {
            debug!("Car {} is held by another booking, left untouched", car_id);
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn car_has_overlap(
        &mut self,
        car_id: i32,
        start: NaiveDate,
        end: NaiveDate,
        exclude: Option<i64>,
    ) -> AppResult<bool> {
        let (exists,): (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM bookings
                WHERE car_id = $1
                  AND status <> 'CANCELLED'
                  AND NOT (end_date < $2 OR start_date > $3)
                  AND ($4::BIGINT IS NULL OR id <> $4)
            )
            "#,
        )
        .bind(car_id)
        .bind(start)
        .bind(end)
        .bind(exclude)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| db_error("check booking overlap", e))?;

        Ok(exists)
    }

    #[instrument(skip(self))]
    async fn list_available_cars(
        &mut self,
        hub_id: i32,
        start: NaiveDate,
        end: NaiveDate,
        car_type_id: Option<i32>,
    ) -> AppResult<Vec<Car>> {
        let sql = format!(
            r#"
            SELECT {} FROM cars c
            WHERE c.hub_id = $1
              AND c.availability = 'Y'
              AND ($4::INTEGER IS NULL OR c.car_type_id = $4)
              AND NOT EXISTS (
                  SELECT 1 FROM bookings b
                  WHERE b.car_id = c.id
                    AND b.status <> 'CANCELLED'
                    AND NOT (b.end_date < $2 OR b.start_date > $3)
              )
            ORDER BY c.id
            "#,
            CAR_COLUMNS
        );

        let rows = sqlx::query_as::<Postgres, CarRow>(&sql)
            .bind(hub_id)
            .bind(start)
            .bind(end)
            .bind(car_type_id)
            .fetch_all(&mut *self.tx)
            .await
            .map_err(|e| db_error("list available cars", e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn find_invoice_by_booking(&mut self, booking_id: i64) -> AppResult<Option<Invoice>> {
        let sql = format!(
            "SELECT {} FROM invoices WHERE booking_id = $1",
            INVOICE_COLUMNS
        );
        let row = sqlx::query_as::<Postgres, InvoiceRow>(&sql)
            .bind(booking_id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| db_error("find invoice", e))?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self, invoice), fields(booking_id = invoice.booking_id))]
    async fn insert_invoice(&mut self, invoice: &Invoice) -> AppResult<Invoice> {
        let sql = format!(
            r#"
            INSERT INTO invoices (
                booking_id, handover_date, return_date, rental_amount,
                add_on_amount, total_amount, rate_description, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {}
            "#,
            INVOICE_COLUMNS
        );

        let row = sqlx::query_as::<Postgres, InvoiceRow>(&sql)
            .bind(invoice.booking_id)
            .bind(invoice.handover_date)
            .bind(invoice.return_date)
            .bind(invoice.rental_amount)
            .bind(invoice.add_on_amount)
            .bind(invoice.total_amount)
            .bind(&invoice.rate_description)
            .bind(invoice.created_at)
            .bind(invoice.updated_at)
            .fetch_one(&mut *self.tx)
            .await
            .map_err(AppError::from)?;

        Ok(row.into())
    }

    #[instrument(skip(self, invoice), fields(booking_id = invoice.booking_id))]
    async fn update_invoice(&mut self, invoice: &Invoice) -> AppResult<Invoice> {
        let sql = format!(
            r#"
            UPDATE invoices
            SET handover_date = $2,
                return_date = $3,
                rental_amount = $4,
                add_on_amount = $5,
                total_amount = $6,
                rate_description = $7,
                updated_at = $8
            WHERE id = $1
            RETURNING {}
            "#,
            INVOICE_COLUMNS
        );

        let row = sqlx::query_as::<Postgres, InvoiceRow>(&sql)
            .bind(invoice.id)
            .bind(invoice.handover_date)
            .bind(invoice.return_date)
            .bind(invoice.rental_amount)
            .bind(invoice.add_on_amount)
            .bind(invoice.total_amount)
            .bind(&invoice.rate_description)
            .bind(invoice.updated_at)
            .fetch_one(&mut *self.tx)
            .await
            .map_err(|e| db_error("update invoice", e))?;

        Ok(row.into())
    }

    async fn commit(self) -> AppResult<()> {
        self.tx.commit().await.map_err(|e| {
            error!("Failed to commit transaction: {}", e);
            AppError::Transaction(format!("Failed to commit transaction: {}", e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::MIGRATOR;
    use chrono::Utc;
    use fleet_core::models::{BookingStatus, CustomerSnapshot, RateSnapshot};

    async fn test_pool() -> PgPool {
        let url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "postgresql://localhost/fleet_rental".to_string());
        let pool = PgPool::connect(&url).await.unwrap();
        MIGRATOR.run(&pool).await.unwrap();
        pool
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2030, 1, d).unwrap()
    }

    /// Hub, car type and one free car, inside the open transaction
    async fn seed_car(tx: &mut PgRentalTransaction, plate: &str) -> (i32, i32) {
        let (hub_id,): (i32,) =
            sqlx::query_as("INSERT INTO hubs (name) VALUES ('Test hub') RETURNING id")
                .fetch_one(&mut *tx.tx)
                .await
                .unwrap();
        let (car_type_id,): (i32,) = sqlx::query_as(
            "INSERT INTO car_types (name, daily_rate) VALUES ('Test class', 1000) RETURNING id",
        )
        .fetch_one(&mut *tx.tx)
        .await
        .unwrap();
        let (car_id,): (i32,) = sqlx::query_as(
            "INSERT INTO cars (car_type_id, hub_id, name, number_plate) VALUES ($1, $2, 'Test car', $3) RETURNING id",
        )
        .bind(car_type_id)
        .bind(hub_id)
        .bind(plate)
        .fetch_one(&mut *tx.tx)
        .await
        .unwrap();

        (hub_id, car_id)
    }

    async fn seed_booking(
        tx: &mut PgRentalTransaction,
        hub_id: i32,
        car_id: i32,
        code: &str,
        status: BookingStatus,
    ) -> Booking {
        let (customer_id,): (i32,) = sqlx::query_as(
            "INSERT INTO customers (first_name, last_name, email) VALUES ('Test', 'Customer', 'test@example.com') RETURNING id",
        )
        .fetch_one(&mut *tx.tx)
        .await
        .unwrap();
        let car = tx.find_car(car_id).await.unwrap().unwrap();

        let now = Utc::now();
        let draft = Booking {
            id: 0,
            confirmation_code: code.to_string(),
            status,
            customer_id,
            car_id: Some(car_id),
            car_type_id: car.car_type_id,
            pickup_hub_id: hub_id,
            return_hub_id: hub_id,
            start_date: day(10),
            end_date: day(12),
            booking_date: day(1),
            customer: CustomerSnapshot {
                first_name: "Test".to_string(),
                last_name: "Customer".to_string(),
                address: None,
                pin: None,
                state: None,
                email: "test@example.com".to_string(),
            },
            rates: RateSnapshot {
                daily_rate: None,
                weekly_rate: None,
                monthly_rate: None,
            },
            car_name: Some(car.name),
            pickup_at: None,
            pickup_fuel_level: None,
            pickup_notes: None,
            returned_at: None,
            return_fuel_level: None,
            return_notes: None,
            created_at: now,
            updated_at: now,
        };

        tx.insert_booking(&draft).await.unwrap().unwrap()
    }

    #[tokio::test]
    #[ignore] // Requires database
    async fn test_claim_and_release_are_scoped_to_holder() {
        let store = PgRentalStore::new(test_pool().await);
        let mut tx = store.begin().await.unwrap();
        let (_, car_id) = seed_car(&mut tx, "TESTCAS0001").await;

        assert!(tx.claim_car(car_id, 7).await.unwrap());
        assert!(tx.claim_car(car_id, 7).await.unwrap());
        assert!(!tx.claim_car(car_id, 8).await.unwrap());

        tx.release_car(car_id, 8).await.unwrap();
        let car = tx.find_car(car_id).await.unwrap().unwrap();
        assert_eq!(car.held_by_booking_id, Some(7));

        tx.release_car(car_id, 7).await.unwrap();
        assert!(tx.claim_car(car_id, 8).await.unwrap());
        // Dropped without commit: nothing persists
    }

    #[tokio::test]
    #[ignore] // Requires database
    async fn test_overlap_ignores_cancelled_and_excluded_bookings() {
        let store = PgRentalStore::new(test_pool().await);
        let mut tx = store.begin().await.unwrap();
        let (hub_id, car_id) = seed_car(&mut tx, "TESTOVL0001").await;
        let booking =
            seed_booking(&mut tx, hub_id, car_id, "TESTOVL-A", BookingStatus::Confirmed).await;

        // Touching the last day counts; the day after does not
        assert!(tx.car_has_overlap(car_id, day(12), day(14), None).await.unwrap());
        assert!(!tx.car_has_overlap(car_id, day(13), day(14), None).await.unwrap());
        assert!(!tx
            .car_has_overlap(car_id, day(10), day(12), Some(booking.id))
            .await
            .unwrap());

        let free = tx.list_available_cars(hub_id, day(11), day(11), None).await.unwrap();
        assert!(free.iter().all(|c| c.id != car_id));

        let mut cancelled = booking;
        cancelled.status = BookingStatus::Cancelled;
        tx.update_booking(&cancelled).await.unwrap();
        assert!(!tx.car_has_overlap(car_id, day(10), day(12), None).await.unwrap());

        let free = tx.list_available_cars(hub_id, day(11), day(11), None).await.unwrap();
        assert!(free.iter().any(|c| c.id == car_id));
    }
}
