//! Car type model (rate table entry)

use super::booking::RateSnapshot;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Pricing class shared by a group of cars
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarType {
    pub id: i32,
    pub name: String,
    pub daily_rate: Option<Decimal>,
    pub weekly_rate: Option<Decimal>,
    pub monthly_rate: Option<Decimal>,
    pub image_ref: Option<String>,
}

impl CarType {
    /// Copy of the current rates for storing on a booking
    pub fn rate_snapshot(&self) -> RateSnapshot {
        RateSnapshot {
            daily_rate: self.daily_rate,
            weekly_rate: self.weekly_rate,
            monthly_rate: self.monthly_rate,
        }
    }
}

pub(crate) fn non_negative(rate: &Decimal) -> Result<(), ValidationError> {
    if rate.is_sign_negative() {
        return Err(ValidationError::new("negative_rate"));
    }
    Ok(())
}

/// Request to add a rate table entry
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCarType {
    #[validate(length(min = 1, max = 100))]
    pub name: String,

    #[validate(custom(function = "non_negative"))]
    pub daily_rate: Option<Decimal>,

    #[validate(custom(function = "non_negative"))]
    pub weekly_rate: Option<Decimal>,

    #[validate(custom(function = "non_negative"))]
    pub monthly_rate: Option<Decimal>,

    #[validate(length(max = 255))]
    pub image_ref: Option<String>,
}

impl CreateCarType {
    pub fn to_car_type(&self) -> CarType {
        CarType {
            id: 0,
            name: self.name.trim().to_string(),
            daily_rate: self.daily_rate,
            weekly_rate: self.weekly_rate,
            monthly_rate: self.monthly_rate,
            image_ref: self.image_ref.clone(),
        }
    }
}

/// Request to replace the rates of a car type
///
/// Existing bookings keep their snapshot.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateCarTypeRates {
    #[validate(custom(function = "non_negative"))]
    pub daily_rate: Option<Decimal>,

    #[validate(custom(function = "non_negative"))]
    pub weekly_rate: Option<Decimal>,

    #[validate(custom(function = "non_negative"))]
    pub monthly_rate: Option<Decimal>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_rate_snapshot_copies_all_rates() {
        let car_type = CarType {
            id: 3,
            name: "SUV".to_string(),
            daily_rate: Some(dec!(2500)),
            weekly_rate: Some(dec!(15000)),
            monthly_rate: None,
            image_ref: None,
        };

        let snapshot = car_type.rate_snapshot();
        assert_eq!(snapshot.daily_rate, Some(dec!(2500)));
        assert_eq!(snapshot.weekly_rate, Some(dec!(15000)));
        assert_eq!(snapshot.monthly_rate, None);
    }

    #[test]
    fn test_negative_rate_rejected() {
        let req = UpdateCarTypeRates {
            daily_rate: Some(dec!(-1)),
            weekly_rate: None,
            monthly_rate: None,
        };
        assert!(req.validate().is_err());

        let req = UpdateCarTypeRates {
            daily_rate: Some(dec!(900)),
            weekly_rate: None,
            monthly_rate: None,
        };
        assert!(req.validate().is_ok());
    }
}
