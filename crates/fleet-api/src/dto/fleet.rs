//! Fleet reference data DTOs

use chrono::NaiveDate;
use fleet_core::models::{Availability, Car};
use serde::{Deserialize, Serialize};

/// Query for `GET /cars`
#[derive(Debug, Clone, Deserialize)]
pub struct FleetQuery {
    pub hub_id: i32,
}

/// Car as exposed over HTTP; the holding booking stays internal
#[derive(Debug, Clone, Serialize)]
pub struct CarResponse {
    pub id: i32,
    pub car_type_id: i32,
    pub hub_id: i32,
    pub name: String,
    pub number_plate: String,
    pub mileage: Option<i32>,
    pub maintenance_due: Option<NaiveDate>,
    pub availability: Availability,
}

impl From<Car> for CarResponse {
    fn from(car: Car) -> Self {
        Self {
            id: car.id,
            car_type_id: car.car_type_id,
            hub_id: car.hub_id,
            name: car.name,
            number_plate: car.number_plate,
            mileage: car.mileage,
            maintenance_due: car.maintenance_due,
            availability: car.availability,
        }
    }
}
