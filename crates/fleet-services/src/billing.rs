//! Billing calculator
//!
//! One formula prices both the live quote of a booking and its final
//! invoice; only the effective end date differs.
//!
//! ```text
//! days   = max(1, (end - start) + 1)
//! rental = days * daily_rate
//! add_on = days * sum(add_on_rates)
//! total  = rental + add_on
//! ```

use chrono::NaiveDate;
use fleet_core::models::{Booking, BookingDetail};
use rust_decimal::Decimal;
use serde::Serialize;

/// Priced rental
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BillingBreakdown {
    pub days: i64,
    pub daily_rate: Decimal,
    pub rental_amount: Decimal,
    pub add_on_amount: Decimal,
    pub total_amount: Decimal,
}

impl BillingBreakdown {
    /// Summary stored on the invoice, e.g. `Daily: 1000 | Days: 3`
    pub fn rate_description(&self) -> String {
        format!("Daily: {} | Days: {}", self.daily_rate, self.days)
    }
}

/// Inclusive day count, never below one
pub fn billable_days(start: NaiveDate, end: NaiveDate) -> i64 {
    ((end - start).num_days() + 1).max(1)
}

/// Price a rental from `start` to `effective_end` inclusive
pub fn calculate(
    start: NaiveDate,
    effective_end: NaiveDate,
    daily_rate: Decimal,
    add_on_rates: &[Decimal],
) -> BillingBreakdown {
    let days = billable_days(start, effective_end);
    let day_count = Decimal::from(days);

    let rental_amount = day_count * daily_rate;
    let add_on_amount = day_count * add_on_rates.iter().copied().sum::<Decimal>();

    BillingBreakdown {
        days,
        daily_rate,
        rental_amount,
        add_on_amount,
        total_amount: rental_amount + add_on_amount,
    }
}

/// Price a booking up to `effective_end` using its snapshotted rates
pub fn price_booking(
    booking: &Booking,
    details: &[BookingDetail],
    effective_end: NaiveDate,
) -> BillingBreakdown {
    let add_on_rates: Vec<Decimal> = details.iter().map(|d| d.add_on_daily_rate).collect();
    calculate(
        booking.start_date,
        effective_end,
        booking.rates.billable_daily_rate(),
        &add_on_rates,
    )
}

/// Current price of a booking over its booked dates
pub fn quote(booking: &Booking, details: &[BookingDetail]) -> BillingBreakdown {
    price_booking(booking, details, booking.end_date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_three_day_rental_with_add_ons() {
        let bill = calculate(
            date(2024, 1, 1),
            date(2024, 1, 3),
            dec!(1000),
            &[dec!(100), dec!(50)],
        );

        assert_eq!(bill.days, 3);
        assert_eq!(bill.rental_amount, dec!(3000));
        assert_eq!(bill.add_on_amount, dec!(450));
        assert_eq!(bill.total_amount, dec!(3450));
        assert_eq!(bill.rate_description(), "Daily: 1000 | Days: 3");
    }

    #[test]
    fn test_same_day_return_bills_one_day() {
        let bill = calculate(date(2024, 5, 10), date(2024, 5, 10), dec!(800), &[]);
        assert_eq!(bill.days, 1);
        assert_eq!(bill.total_amount, dec!(800));
    }

    #[test]
    fn test_return_before_start_still_bills_one_day() {
        assert_eq!(billable_days(date(2024, 5, 10), date(2024, 5, 1)), 1);
    }

    #[test]
    fn test_zero_rate_bills_only_add_ons() {
        let bill = calculate(date(2024, 1, 1), date(2024, 1, 2), Decimal::ZERO, &[dec!(75)]);
        assert_eq!(bill.rental_amount, Decimal::ZERO);
        assert_eq!(bill.total_amount, dec!(150));
    }

    #[test]
    fn test_leap_day_counted() {
        assert_eq!(billable_days(date(2024, 2, 28), date(2024, 3, 1)), 3);
    }

    proptest! {
        #[test]
        fn prop_days_at_least_one_and_total_adds_up(
            start_offset in 0i64..2000,
            span in -30i64..400,
            rate_cents in 0i64..10_000_000,
            add_on_cents in proptest::collection::vec(0i64..100_000, 0..5),
        ) {
            let start = date(2020, 1, 1) + chrono::Duration::days(start_offset);
            let end = start + chrono::Duration::days(span);
            let rate = Decimal::new(rate_cents, 2);
            let add_ons: Vec<Decimal> = add_on_cents.iter().map(|c| Decimal::new(*c, 2)).collect();

            let bill = calculate(start, end, rate, &add_ons);

            prop_assert!(bill.days >= 1);
            prop_assert_eq!(bill.total_amount, bill.rental_amount + bill.add_on_amount);
            prop_assert_eq!(bill.rental_amount, Decimal::from(bill.days) * rate);
        }
    }
}
