//! Booking model
//!
//! A booking moves through `CONFIRMED -> ACTIVE -> COMPLETED`, or leaves
//! `CONFIRMED`/`ACTIVE` for the terminal `CANCELLED` state. Customer contact
//! fields and the car type's rates are copied onto the booking so that later
//! edits to the reference data do not change what the customer is billed.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

/// Booking lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum BookingStatus {
    /// Reserved, car not yet handed over
    #[default]
    Confirmed,
    /// Car is with the customer
    Active,
    /// Car returned and invoice finalized
    Completed,
    /// Cancelled before completion
    Cancelled,
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookingStatus::Confirmed => write!(f, "CONFIRMED"),
            BookingStatus::Active => write!(f, "ACTIVE"),
            BookingStatus::Completed => write!(f, "COMPLETED"),
            BookingStatus::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

impl BookingStatus {
    /// Parse from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "CONFIRMED" => Some(BookingStatus::Confirmed),
            "ACTIVE" => Some(BookingStatus::Active),
            "COMPLETED" => Some(BookingStatus::Completed),
            "CANCELLED" => Some(BookingStatus::Cancelled),
            _ => None,
        }
    }

    /// No transition leaves a terminal status
    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Completed | BookingStatus::Cancelled)
    }

    /// Whether a booking in this status still occupies its car's calendar
    pub fn blocks_car(&self) -> bool {
        !matches!(self, BookingStatus::Cancelled)
    }
}

/// Customer contact fields captured when the booking is created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CustomerSnapshot {
    pub first_name: String,
    pub last_name: String,
    pub address: Option<String>,
    pub pin: Option<String>,
    pub state: Option<String>,
    pub email: String,
}

/// Rates copied from a car type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RateSnapshot {
    pub daily_rate: Option<Decimal>,
    pub weekly_rate: Option<Decimal>,
    pub monthly_rate: Option<Decimal>,
}

impl RateSnapshot {
    /// Daily rate used for billing; an unset rate bills as zero
    pub fn billable_daily_rate(&self) -> Decimal {
        self.daily_rate.unwrap_or(Decimal::ZERO)
    }
}

/// Booking entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    /// Unique identifier (0 until persisted)
    pub id: i64,

    /// Human-shareable reference, e.g. `BOK-7K2Q9XAB`
    pub confirmation_code: String,

    pub status: BookingStatus,

    pub customer_id: i32,

    /// Assigned car; reassignable until the booking is terminal
    pub car_id: Option<i32>,

    /// Car type whose rates are snapshotted below
    pub car_type_id: i32,

    pub pickup_hub_id: i32,
    pub return_hub_id: i32,

    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub booking_date: NaiveDate,

    pub customer: CustomerSnapshot,
    pub rates: RateSnapshot,

    /// Name of the assigned car at the time it was assigned
    pub car_name: Option<String>,

    // Handover metadata
    pub pickup_at: Option<DateTime<Utc>>,
    pub pickup_fuel_level: Option<String>,
    pub pickup_notes: Option<String>,

    // Return metadata
    pub returned_at: Option<DateTime<Utc>>,
    pub return_fuel_level: Option<String>,
    pub return_notes: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// Whether the booking's date range intersects `[start, end]`
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        !(self.end_date < start || self.start_date > end)
    }

    /// Whether the booking was picked up or returned at `hub_id`
    pub fn touches_hub(&self, hub_id: i32) -> bool {
        self.pickup_hub_id == hub_id || self.return_hub_id == hub_id
    }
}

/// Add-on line item attached to a booking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingDetail {
    pub id: i64,
    pub booking_id: i64,
    pub add_on_id: i32,
    pub add_on_name: String,
    /// Daily rate of the add-on when it was attached
    pub add_on_daily_rate: Decimal,
}

// ==================== Commands ====================

/// Request to create a booking
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateBooking {
    pub customer_id: i32,
    pub car_id: i32,
    pub pickup_hub_id: i32,
    pub return_hub_id: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,

    #[validate(email)]
    pub email: String,

    /// Unknown add-on ids are skipped
    #[serde(default)]
    pub add_on_ids: Vec<i32>,
}

/// Request to hand a car over to the customer
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct HandoverRequest {
    /// Replacement car; omitted or equal to the assigned car means no swap
    pub new_car_id: Option<i32>,

    #[validate(length(max = 50))]
    pub fuel_status: Option<String>,

    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

/// Request to return a car
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ReturnRequest {
    /// Actual return date; defaults to today
    pub return_date: Option<NaiveDate>,

    #[validate(length(max = 50))]
    pub fuel_status: Option<String>,

    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

/// Request to change dates or car of a confirmed booking
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ModifyBooking {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub car_id: Option<i32>,
}

impl ModifyBooking {
    pub fn is_empty(&self) -> bool {
        self.start_date.is_none() && self.end_date.is_none() && self.car_id.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn booking(start: NaiveDate, end: NaiveDate) -> Booking {
        let now = Utc::now();
        Booking {
            id: 1,
            confirmation_code: "BOK-AAAA0000".to_string(),
            status: BookingStatus::Confirmed,
            customer_id: 1,
            car_id: Some(1),
            car_type_id: 1,
            pickup_hub_id: 1,
            return_hub_id: 2,
            start_date: start,
            end_date: end,
            booking_date: start,
            customer: CustomerSnapshot::default(),
            rates: RateSnapshot::default(),
            car_name: None,
            pickup_at: None,
            pickup_fuel_level: None,
            pickup_notes: None,
            returned_at: None,
            return_fuel_level: None,
            return_notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_status_roundtrip() {
        for status in [
            BookingStatus::Confirmed,
            BookingStatus::Active,
            BookingStatus::Completed,
            BookingStatus::Cancelled,
        ] {
            assert_eq!(BookingStatus::from_str(&status.to_string()), Some(status));
        }
        assert_eq!(BookingStatus::from_str("active"), Some(BookingStatus::Active));
        assert_eq!(BookingStatus::from_str("pending"), None);
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(!BookingStatus::Confirmed.is_terminal());
        assert!(!BookingStatus::Active.is_terminal());
        assert!(BookingStatus::Completed.is_terminal());
        assert!(BookingStatus::Cancelled.is_terminal());
        assert!(BookingStatus::Completed.blocks_car());
        assert!(!BookingStatus::Cancelled.blocks_car());
    }

    #[test]
    fn test_overlap_is_inclusive() {
        let b = booking(date(2024, 1, 10), date(2024, 1, 12));

        assert!(b.overlaps(date(2024, 1, 12), date(2024, 1, 15)));
        assert!(b.overlaps(date(2024, 1, 1), date(2024, 1, 10)));
        assert!(b.overlaps(date(2024, 1, 11), date(2024, 1, 11)));
        assert!(!b.overlaps(date(2024, 1, 13), date(2024, 1, 20)));
        assert!(!b.overlaps(date(2024, 1, 1), date(2024, 1, 9)));
    }

    #[test]
    fn test_touches_hub() {
        let b = booking(date(2024, 1, 10), date(2024, 1, 12));
        assert!(b.touches_hub(1));
        assert!(b.touches_hub(2));
        assert!(!b.touches_hub(3));
    }

    #[test]
    fn test_unset_daily_rate_bills_zero() {
        assert_eq!(RateSnapshot::default().billable_daily_rate(), Decimal::ZERO);

        let rates = RateSnapshot {
            daily_rate: Some(dec!(1000)),
            ..Default::default()
        };
        assert_eq!(rates.billable_daily_rate(), dec!(1000));
    }

    #[test]
    fn test_create_booking_rejects_bad_email() {
        let req = CreateBooking {
            customer_id: 1,
            car_id: 1,
            pickup_hub_id: 1,
            return_hub_id: 1,
            start_date: date(2024, 1, 1),
            end_date: date(2024, 1, 2),
            email: "not-an-email".to_string(),
            add_on_ids: vec![],
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_status_serializes_uppercase() {
        let json = serde_json::to_string(&BookingStatus::Cancelled).unwrap();
        assert_eq!(json, "\"CANCELLED\"");
    }
}
