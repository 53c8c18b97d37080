//! Row structs for mapping database results onto domain models
//!
//! Column lists are kept next to the rows so every query selects the same
//! shape.

use chrono::{DateTime, NaiveDate, Utc};
use fleet_core::models::{
    AddOn, Availability, Booking, BookingDetail, BookingStatus, Car, CarType, Customer,
    CustomerSnapshot, Hub, Invoice, RateSnapshot,
};
use rust_decimal::Decimal;
use tracing::warn;

pub const CAR_COLUMNS: &str = "id, car_type_id, hub_id, name, number_plate, mileage, \
     maintenance_due, availability, held_by_booking_id";

pub const CAR_TYPE_COLUMNS: &str = "id, name, daily_rate, weekly_rate, monthly_rate, image_ref";

pub const BOOKING_COLUMNS: &str = "id, confirmation_code, status, customer_id, car_id, \
     car_type_id, pickup_hub_id, return_hub_id, start_date, end_date, booking_date, \
     first_name, last_name, address, pin, state, email, \
     daily_rate, weekly_rate, monthly_rate, car_name, \
     pickup_at, pickup_fuel_level, pickup_notes, \
     returned_at, return_fuel_level, return_notes, created_at, updated_at";

pub const INVOICE_COLUMNS: &str = "id, booking_id, handover_date, return_date, rental_amount, \
     add_on_amount, total_amount, rate_description, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
pub struct CarRow {
    pub id: i32,
    pub car_type_id: i32,
    pub hub_id: i32,
    pub name: String,
    pub number_plate: String,
    pub mileage: Option<i32>,
    pub maintenance_due: Option<NaiveDate>,
    pub availability: String,
    pub held_by_booking_id: Option<i64>,
}

impl From<CarRow> for Car {
    fn from(row: CarRow) -> Self {
        let availability = Availability::from_str(&row.availability).unwrap_or_else(|| {
            warn!(
                "Car {} has unknown availability flag {:?}, treating as unavailable",
                row.id, row.availability
            );
            Availability::Unavailable
        });

        Self {
            id: row.id,
            car_type_id: row.car_type_id,
            hub_id: row.hub_id,
            name: row.name,
            number_plate: row.number_plate,
            mileage: row.mileage,
            maintenance_due: row.maintenance_due,
            availability,
            held_by_booking_id: row.held_by_booking_id,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct CarTypeRow {
    pub id: i32,
    pub name: String,
    pub daily_rate: Option<Decimal>,
    pub weekly_rate: Option<Decimal>,
    pub monthly_rate: Option<Decimal>,
    pub image_ref: Option<String>,
}

impl From<CarTypeRow> for CarType {
    fn from(row: CarTypeRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            daily_rate: row.daily_rate,
            weekly_rate: row.weekly_rate,
            monthly_rate: row.monthly_rate,
            image_ref: row.image_ref,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct CustomerRow {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub mobile: Option<String>,
    pub driving_licence_number: Option<String>,
}

impl From<CustomerRow> for Customer {
    fn from(row: CustomerRow) -> Self {
        Self {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            address_line1: row.address_line1,
            address_line2: row.address_line2,
            city: row.city,
            state: row.state,
            pincode: row.pincode,
            email: row.email,
            phone: row.phone,
            mobile: row.mobile,
            driving_licence_number: row.driving_licence_number,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct HubRow {
    pub id: i32,
    pub name: String,
    pub address: Option<String>,
    pub contact_number: Option<String>,
}

impl From<HubRow> for Hub {
    fn from(row: HubRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            address: row.address,
            contact_number: row.contact_number,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct AddOnRow {
    pub id: i32,
    pub name: String,
    pub daily_rate: Decimal,
    pub rate_valid_until: Option<NaiveDate>,
}

impl From<AddOnRow> for AddOn {
    fn from(row: AddOnRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            daily_rate: row.daily_rate,
            rate_valid_until: row.rate_valid_until,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct BookingRow {
    pub id: i64,
    pub confirmation_code: String,
    pub status: String,
    pub customer_id: i32,
    pub car_id: Option<i32>,
    pub car_type_id: i32,
    pub pickup_hub_id: i32,
    pub return_hub_id: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub booking_date: NaiveDate,
    pub first_name: String,
    pub last_name: String,
    pub address: Option<String>,
    pub pin: Option<String>,
    pub state: Option<String>,
    pub email: String,
    pub daily_rate: Option<Decimal>,
    pub weekly_rate: Option<Decimal>,
    pub monthly_rate: Option<Decimal>,
    pub car_name: Option<String>,
    pub pickup_at: Option<DateTime<Utc>>,
    pub pickup_fuel_level: Option<String>,
    pub pickup_notes: Option<String>,
    pub returned_at: Option<DateTime<Utc>>,
    pub return_fuel_level: Option<String>,
    pub return_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<BookingRow> for Booking {
    fn from(row: BookingRow) -> Self {
        let status = BookingStatus::from_str(&row.status).unwrap_or_else(|| {
            warn!(
                "Booking {} has unknown status {:?}, treating as cancelled",
                row.id, row.status
            );
            BookingStatus::Cancelled
        });

        Self {
            id: row.id,
            confirmation_code: row.confirmation_code,
            status,
            customer_id: row.customer_id,
            car_id: row.car_id,
            car_type_id: row.car_type_id,
            pickup_hub_id: row.pickup_hub_id,
            return_hub_id: row.return_hub_id,
            start_date: row.start_date,
            end_date: row.end_date,
            booking_date: row.booking_date,
            customer: CustomerSnapshot {
                first_name: row.first_name,
                last_name: row.last_name,
                address: row.address,
                pin: row.pin,
                state: row.state,
                email: row.email,
            },
            rates: RateSnapshot {
                daily_rate: row.daily_rate,
                weekly_rate: row.weekly_rate,
                monthly_rate: row.monthly_rate,
            },
            car_name: row.car_name,
            pickup_at: row.pickup_at,
            pickup_fuel_level: row.pickup_fuel_level,
            pickup_notes: row.pickup_notes,
            returned_at: row.returned_at,
            return_fuel_level: row.return_fuel_level,
            return_notes: row.return_notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct BookingDetailRow {
    pub id: i64,
    pub booking_id: i64,
    pub add_on_id: i32,
    pub add_on_name: String,
    pub add_on_daily_rate: Decimal,
}

impl From<BookingDetailRow> for BookingDetail {
    fn from(row: BookingDetailRow) -> Self {
        Self {
            id: row.id,
            booking_id: row.booking_id,
            add_on_id: row.add_on_id,
            add_on_name: row.add_on_name,
            add_on_daily_rate: row.add_on_daily_rate,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct InvoiceRow {
    pub id: i64,
    pub booking_id: i64,
    pub handover_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub rental_amount: Option<Decimal>,
    pub add_on_amount: Option<Decimal>,
    pub total_amount: Option<Decimal>,
    pub rate_description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<InvoiceRow> for Invoice {
    fn from(row: InvoiceRow) -> Self {
        Self {
            id: row.id,
            booking_id: row.booking_id,
            handover_date: row.handover_date,
            return_date: row.return_date,
            rental_amount: row.rental_amount,
            add_on_amount: row.add_on_amount,
            total_amount: row.total_amount,
            rate_description: row.rate_description,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
