//! Customer model

use super::booking::CustomerSnapshot;
use serde::{Deserialize, Serialize};

/// Registered customer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
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

impl Customer {
    /// Single-line postal address built from the non-empty address parts
    pub fn full_address(&self) -> Option<String> {
        let parts: Vec<&str> = [&self.address_line1, &self.address_line2, &self.city]
            .into_iter()
            .filter_map(|p| p.as_deref())
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }

    /// Contact fields to store on a booking, using the email given with the booking
    pub fn snapshot(&self, email: &str) -> CustomerSnapshot {
        CustomerSnapshot {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            address: self.full_address(),
            pin: self.pincode.clone(),
            state: self.state.clone(),
            email: email.to_string(),
        }
    }
}
