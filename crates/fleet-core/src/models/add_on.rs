//! Add-on model

use super::car_type::non_negative;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Optional extra billed per rental day (child seat, GPS, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddOn {
    pub id: i32,
    pub name: String,
    pub daily_rate: Decimal,
    pub rate_valid_until: Option<NaiveDate>,
}

/// Request to add an entry to the add-on catalog
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateAddOn {
    #[validate(length(min = 1, max = 100))]
    pub name: String,

    #[validate(custom(function = "non_negative"))]
    pub daily_rate: Decimal,

    pub rate_valid_until: Option<NaiveDate>,
}

impl CreateAddOn {
    pub fn to_add_on(&self) -> AddOn {
        AddOn {
            id: 0,
            name: self.name.trim().to_string(),
            daily_rate: self.daily_rate,
            rate_valid_until: self.rate_valid_until,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_create_add_on_validation() {
        let valid = CreateAddOn {
            name: " GPS ".to_string(),
            daily_rate: dec!(100),
            rate_valid_until: None,
        };
        assert!(valid.validate().is_ok());
        assert_eq!(valid.to_add_on().name, "GPS");

        let negative = CreateAddOn {
            name: "Child seat".to_string(),
            daily_rate: dec!(-1),
            rate_valid_until: None,
        };
        assert!(negative.validate().is_err());

        let unnamed = CreateAddOn {
            name: String::new(),
            daily_rate: dec!(50),
            rate_valid_until: None,
        };
        assert!(unnamed.validate().is_err());
    }
}
