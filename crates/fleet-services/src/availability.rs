//! Fleet availability tracker
//!
//! A car is free for `[start, end]` when its availability flag is set and no
//! non-cancelled booking uses it on any day of that range. The lifecycle
//! re-checks the same overlap rule whenever a booking is bound to a car.
//!
//! The fleet overview reports every car as Available, Rented or Maintenance,
//! grouped by hub, with fleet-wide utilisation.

use chrono::{DateTime, NaiveDate, Utc};
use fleet_core::{
    models::{Availability, Booking, BookingStatus, Car, CarType},
    traits::{RentalStore, RentalTransaction},
    AppError, AppResult, Clock, EntityKind,
};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Status of one car in the fleet overview
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CarStatus {
    Available,
    Rented,
    Maintenance,
}

/// The rental keeping a car out
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RentalInfo {
    pub booking_id: i64,
    pub customer_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub pickup_at: Option<DateTime<Utc>>,
    /// Still out after its end date
    pub overdue: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CarStatusEntry {
    pub car_id: i32,
    pub name: String,
    pub car_type: String,
    pub number_plate: String,
    pub status: CarStatus,
    pub daily_rate: Option<Decimal>,
    pub image_ref: Option<String>,
    pub current_rental: Option<RentalInfo>,
}

/// Cars stationed at one hub with per-status counts
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HubFleet {
    pub hub_id: i32,
    pub hub_name: String,
    pub cars: Vec<CarStatusEntry>,
    pub total_cars: usize,
    pub available_cars: usize,
    pub rented_cars: usize,
    pub maintenance_cars: usize,
}

impl HubFleet {
    fn count(cars: &[CarStatusEntry], status: CarStatus) -> usize {
        cars.iter().filter(|c| c.status == status).count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FleetStatistics {
    pub total_cars: usize,
    pub total_available: usize,
    pub total_rented: usize,
    pub total_maintenance: usize,
    /// Rented share of the fleet in percent, two decimal places
    pub utilization_rate: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FleetOverview {
    pub as_of: NaiveDate,
    pub hubs: Vec<HubFleet>,
    pub statistics: FleetStatistics,
}

/// Read side of car availability
pub struct FleetAvailability<S: RentalStore> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S: RentalStore> FleetAvailability<S> {
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Cars at `hub_id` free over `[start, end]`, optionally of one car type, ordered by id
    #[instrument(skip(self))]
    pub async fn query_available(
        &self,
        hub_id: i32,
        start: NaiveDate,
        end: NaiveDate,
        car_type_id: Option<i32>,
    ) -> AppResult<Vec<Car>> {
        ensure_valid_range(start, end)?;

        let mut tx = self.store.begin().await?;

        if tx.find_hub(hub_id).await?.is_none() {
            return Err(AppError::not_found(EntityKind::Hub, hub_id));
        }

        let cars = tx
            .list_available_cars(hub_id, start, end, car_type_id)
            .await?;

        debug!("{} cars available at hub {}", cars.len(), hub_id);
        Ok(cars)
    }

    /// Status of every car, grouped by hub
    ///
    /// Without a window a car is Rented while an ACTIVE booking holds it and
    /// Maintenance when it is flagged unavailable with no such booking. With a
    /// `[start, end]` window a car is Rented when a non-cancelled booking
    /// overlaps the window and Available otherwise.
    ///
    /// Hubs without cars are left out.
    #[instrument(skip(self))]
    pub async fn fleet_overview(
        &self,
        window: Option<(NaiveDate, NaiveDate)>,
    ) -> AppResult<FleetOverview> {
        if let Some((start, end)) = window {
            ensure_valid_range(start, end)?;
        }

        let today = self.clock.now().date_naive();
        let mut tx = self.store.begin().await?;
        let hubs = tx.list_hubs().await?;
        let cars = tx.list_cars().await?;
        let bookings: Vec<Booking> = tx
            .list_bookings()
            .await?
            .into_iter()
            .filter(|b| match window {
                Some((start, end)) => b.status.blocks_car() && b.overlaps(start, end),
                None => b.status == BookingStatus::Active,
            })
            .collect();

        let mut car_types: BTreeMap<i32, Option<CarType>> = BTreeMap::new();
        let mut by_hub: BTreeMap<i32, Vec<CarStatusEntry>> = BTreeMap::new();
        for car in cars {
            if !car_types.contains_key(&car.car_type_id) {
                let car_type = tx.find_car_type(car.car_type_id).await?;
                car_types.insert(car.car_type_id, car_type);
            }
            let car_type = car_types.get(&car.car_type_id).and_then(Option::as_ref);

            let rental = bookings.iter().find(|b| b.car_id == Some(car.id));
            let status = match rental {
                Some(_) => CarStatus::Rented,
                None if window.is_none() && car.availability == Availability::Unavailable => {
                    CarStatus::Maintenance
                }
                None => CarStatus::Available,
            };

            by_hub.entry(car.hub_id).or_default().push(CarStatusEntry {
                car_id: car.id,
                name: car.name,
                car_type: car_type.map_or_else(|| "Unknown".to_string(), |t| t.name.clone()),
                number_plate: car.number_plate,
                status,
                daily_rate: car_type.and_then(|t| t.daily_rate),
                image_ref: car_type.and_then(|t| t.image_ref.clone()),
                current_rental: rental.map(|b| RentalInfo {
                    booking_id: b.id,
                    customer_name: format!(
                        "{} {}",
                        b.customer.first_name, b.customer.last_name
                    ),
                    start_date: b.start_date,
                    end_date: b.end_date,
                    pickup_at: b.pickup_at,
                    overdue: b.status == BookingStatus::Active && b.end_date < today,
                }),
            });
        }

        let hub_fleets: Vec<HubFleet> = hubs
            .into_iter()
            .filter_map(|hub| {
                let cars = by_hub.remove(&hub.id)?;
                Some(HubFleet {
                    hub_id: hub.id,
                    hub_name: hub.name,
                    total_cars: cars.len(),
                    available_cars: HubFleet::count(&cars, CarStatus::Available),
                    rented_cars: HubFleet::count(&cars, CarStatus::Rented),
                    maintenance_cars: HubFleet::count(&cars, CarStatus::Maintenance),
                    cars,
                })
            })
            .collect();

        let statistics = fleet_statistics(&hub_fleets);
        debug!(
            "Fleet overview: {} cars, {}% utilised",
            statistics.total_cars, statistics.utilization_rate
        );

        Ok(FleetOverview {
            as_of: today,
            hubs: hub_fleets,
            statistics,
        })
    }
}

fn fleet_statistics(hubs: &[HubFleet]) -> FleetStatistics {
    let total_cars: usize = hubs.iter().map(|h| h.total_cars).sum();
    let total_rented: usize = hubs.iter().map(|h| h.rented_cars).sum();

    let utilization_rate = if total_cars == 0 {
        Decimal::ZERO
    } else {
        (Decimal::from(total_rented as u64) * Decimal::ONE_HUNDRED
            / Decimal::from(total_cars as u64))
        .round_dp(2)
    };

    FleetStatistics {
        total_cars,
        total_available: hubs.iter().map(|h| h.available_cars).sum(),
        total_rented,
        total_maintenance: hubs.iter().map(|h| h.maintenance_cars).sum(),
        utilization_rate,
    }
}

/// Reject ranges that end before they start
pub(crate) fn ensure_valid_range(start: NaiveDate, end: NaiveDate) -> AppResult<()> {
    if end < start {
        return Err(AppError::InvalidInput(format!(
            "end date {} is before start date {}",
            end, start
        )));
    }
    Ok(())
}

/// Fail with `CarUnavailable` if another live booking uses the car within the range
pub(crate) async fn ensure_no_overlap<T: RentalTransaction>(
    tx: &mut T,
    car_id: i32,
    start: NaiveDate,
    end: NaiveDate,
    booking_id: Option<i64>,
) -> AppResult<()> {
    if tx.car_has_overlap(car_id, start, end, booking_id).await? {
        warn!(
            "Car {} already booked between {} and {}",
            car_id, start, end
        );
        return Err(AppError::CarUnavailable { car_id });
    }
    Ok(())
}

/// Mark the car unavailable for `booking_id`, or fail with `CarUnavailable`
pub(crate) async fn claim<T: RentalTransaction>(
    tx: &mut T,
    car_id: i32,
    booking_id: i64,
) -> AppResult<()> {
    if !tx.claim_car(car_id, booking_id).await? {
        warn!("Car {} could not be claimed for booking {}", car_id, booking_id);
        return Err(AppError::CarUnavailable { car_id });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn hub(id: i32, total: usize, rented: usize) -> HubFleet {
        HubFleet {
            hub_id: id,
            hub_name: format!("Hub {}", id),
            cars: vec![],
            total_cars: total,
            available_cars: total - rented,
            rented_cars: rented,
            maintenance_cars: 0,
        }
    }

    #[test]
    fn test_utilization_rounded_to_two_places() {
        let stats = fleet_statistics(&[hub(1, 2, 1), hub(2, 1, 0)]);
        assert_eq!(stats.total_cars, 3);
        assert_eq!(stats.total_rented, 1);
        assert_eq!(stats.utilization_rate, dec!(33.33));

        assert_eq!(fleet_statistics(&[]).utilization_rate, Decimal::ZERO);
    }

    #[test]
    fn test_inverted_range_rejected() {
        let a = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        let b = NaiveDate::from_ymd_opt(2024, 1, 4).unwrap();

        assert!(ensure_valid_range(a, a).is_ok());
        assert!(matches!(
            ensure_valid_range(a, b),
            Err(AppError::InvalidInput(_))
        ));
    }
}
