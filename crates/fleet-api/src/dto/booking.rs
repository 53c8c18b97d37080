//! Booking and availability DTOs

use super::fleet::CarResponse;
use chrono::NaiveDate;
use fleet_core::{models::Car, AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Filters for `GET /bookings`; at most one may be given, none lists every booking
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListBookingsQuery {
    pub email: Option<String>,
    pub hub_id: Option<i32>,
}

/// Which listing a `GET /bookings` request asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingFilter {
    All,
    Email(String),
    Hub(i32),
}

impl ListBookingsQuery {
    pub fn filter(&self) -> AppResult<BookingFilter> {
        let email = self
            .email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty());

        match (email, self.hub_id) {
            (Some(email), None) => Ok(BookingFilter::Email(email.to_string())),
            (None, Some(hub_id)) => Ok(BookingFilter::Hub(hub_id)),
            (Some(_), Some(_)) => Err(AppError::Validation(
                "filter by either email or hub_id, not both".to_string(),
            )),
            (None, None) => Ok(BookingFilter::All),
        }
    }
}

/// Query for `GET /cars/available`
#[derive(Debug, Clone, Deserialize)]
pub struct AvailableCarsQuery {
    pub hub_id: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub car_type_id: Option<i32>,
}

/// Optional date window for `GET /fleet/overview`; both dates or neither
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FleetOverviewQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl FleetOverviewQuery {
    pub fn window(&self) -> AppResult<Option<(NaiveDate, NaiveDate)>> {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => Ok(Some((start, end))),
            (None, None) => Ok(None),
            _ => Err(AppError::Validation(
                "start_date and end_date must be given together".to_string(),
            )),
        }
    }
}

/// Free cars for a hub and date range
#[derive(Debug, Clone, Serialize)]
pub struct AvailableCarsResponse {
    pub hub_id: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub cars: Vec<CarResponse>,
}

impl AvailableCarsResponse {
    pub fn new(query: &AvailableCarsQuery, cars: Vec<Car>) -> Self {
        Self {
            hub_id: query.hub_id,
            start_date: query.start_date,
            end_date: query.end_date,
            cars: cars.into_iter().map(CarResponse::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_filter_allows_at_most_one() {
        let by_email = ListBookingsQuery {
            email: Some(" asha@example.com ".to_string()),
            hub_id: None,
        };
        assert_eq!(
            by_email.filter().unwrap(),
            BookingFilter::Email("asha@example.com".to_string())
        );

        let by_hub = ListBookingsQuery {
            email: Some("  ".to_string()),
            hub_id: Some(3),
        };
        assert_eq!(by_hub.filter().unwrap(), BookingFilter::Hub(3));

        assert_eq!(
            ListBookingsQuery::default().filter().unwrap(),
            BookingFilter::All
        );
        assert!(ListBookingsQuery {
            email: Some("a@b.c".to_string()),
            hub_id: Some(1),
        }
        .filter()
        .is_err());
    }

    #[test]
    fn test_overview_window_needs_both_dates() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

        assert_eq!(FleetOverviewQuery::default().window().unwrap(), None);
        assert_eq!(
            FleetOverviewQuery {
                start_date: Some(day),
                end_date: Some(day),
            }
            .window()
            .unwrap(),
            Some((day, day))
        );
        assert!(matches!(
            FleetOverviewQuery {
                start_date: Some(day),
                end_date: None,
            }
            .window(),
            Err(AppError::Validation(_))
        ));
    }
}
