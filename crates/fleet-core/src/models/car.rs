//! Car model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

/// Whether a car can be claimed by a booking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    #[default]
    Available,
    Unavailable,
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Availability::Available => write!(f, "available"),
            Availability::Unavailable => write!(f, "unavailable"),
        }
    }
}

impl Availability {
    /// Parse from string (case-insensitive), accepting the legacy `Y`/`N` flags
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "y" | "yes" | "available" => Some(Availability::Available),
            "n" | "no" | "unavailable" => Some(Availability::Unavailable),
            _ => None,
        }
    }

    /// Single-character flag stored in the `cars.availability` column
    pub fn as_flag(&self) -> &'static str {
        match self {
            Availability::Available => "Y",
            Availability::Unavailable => "N",
        }
    }
}

/// Car entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Car {
    pub id: i32,
    pub car_type_id: i32,
    pub hub_id: i32,
    pub name: String,

    /// Registration number, unique across the fleet
    pub number_plate: String,

    pub mileage: Option<i32>,
    pub maintenance_due: Option<NaiveDate>,

    /// Only the booking lifecycle changes this
    pub availability: Availability,

    /// Booking currently holding the car, if any
    pub held_by_booking_id: Option<i64>,
}

impl Car {
    /// Whether `booking_id` may claim this car
    pub fn claimable_by(&self, booking_id: i64) -> bool {
        self.availability == Availability::Available
            || self.held_by_booking_id == Some(booking_id)
    }
}

/// Request to register a car
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCar {
    pub car_type_id: i32,
    pub hub_id: i32,

    #[validate(length(min = 1, max = 100))]
    pub name: String,

    #[validate(length(min = 1, max = 20))]
    pub number_plate: String,

    #[validate(range(min = 0))]
    pub mileage: Option<i32>,

    pub maintenance_due: Option<NaiveDate>,
}

impl CreateCar {
    /// New cars start available and unheld
    pub fn to_car(&self) -> Car {
        Car {
            id: 0,
            car_type_id: self.car_type_id,
            hub_id: self.hub_id,
            name: self.name.trim().to_string(),
            number_plate: self.number_plate.trim().to_uppercase(),
            mileage: self.mileage,
            maintenance_due: self.maintenance_due,
            availability: Availability::Available,
            held_by_booking_id: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn car(availability: Availability, held_by: Option<i64>) -> Car {
        Car {
            id: 1,
            car_type_id: 1,
            hub_id: 1,
            name: "Swift".to_string(),
            number_plate: "KA01AB1234".to_string(),
            mileage: None,
            maintenance_due: None,
            availability,
            held_by_booking_id: held_by,
        }
    }

    #[test]
    fn test_availability_parsing() {
        assert_eq!(Availability::from_str("Y"), Some(Availability::Available));
        assert_eq!(Availability::from_str("yes"), Some(Availability::Available));
        assert_eq!(Availability::from_str("N"), Some(Availability::Unavailable));
        assert_eq!(
            Availability::from_str("Unavailable"),
            Some(Availability::Unavailable)
        );
        assert_eq!(Availability::from_str("maybe"), None);
        assert_eq!(Availability::Unavailable.as_flag(), "N");
    }

    #[test]
    fn test_claimable_by_holder_only() {
        assert!(car(Availability::Available, None).claimable_by(5));

        let held = car(Availability::Unavailable, Some(5));
        assert!(held.claimable_by(5));
        assert!(!held.claimable_by(6));

        assert!(!car(Availability::Unavailable, None).claimable_by(5));
    }

    #[test]
    fn test_registered_car_starts_available() {
        let req = CreateCar {
            car_type_id: 2,
            hub_id: 1,
            name: " Swift ".to_string(),
            number_plate: "ka01ab1234".to_string(),
            mileage: Some(12),
            maintenance_due: None,
        };
        assert!(req.validate().is_ok());

        let car = req.to_car();
        assert_eq!(car.name, "Swift");
        assert_eq!(car.number_plate, "KA01AB1234");
        assert_eq!(car.availability, Availability::Available);
        assert_eq!(car.held_by_booking_id, None);
    }
}
