//! Invoice model
//!
//! One invoice per booking. It is created as a skeleton at handover and
//! finalized with amounts when the car comes back.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Invoice entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    /// Unique identifier (0 until persisted)
    pub id: i64,

    /// Owning booking, unique
    pub booking_id: i64,

    pub handover_date: NaiveDate,
    pub return_date: Option<NaiveDate>,

    pub rental_amount: Option<Decimal>,
    pub add_on_amount: Option<Decimal>,
    pub total_amount: Option<Decimal>,

    /// e.g. `Daily: 1000 | Days: 3`
    pub rate_description: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    /// Invoice opened at handover, amounts unset
    pub fn skeleton(booking_id: i64, handover_date: NaiveDate, now: DateTime<Utc>) -> Self {
        Self {
            id: 0,
            booking_id,
            handover_date,
            return_date: None,
            rental_amount: None,
            add_on_amount: None,
            total_amount: None,
            rate_description: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Amounts are only present once the car has been returned
    pub fn is_finalized(&self) -> bool {
        self.return_date.is_some() && self.total_amount.is_some()
    }
}
