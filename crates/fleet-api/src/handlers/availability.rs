//! Car availability handlers

use crate::dto::{ApiResponse, AvailableCarsQuery, AvailableCarsResponse, FleetOverviewQuery};
use actix_web::{web, HttpResponse};
use fleet_core::{traits::RentalStore, AppError};
use fleet_services::FleetAvailability;
use tracing::{debug, instrument, warn};

/// Cars free at a hub over a date range
///
/// GET /api/v1/cars/available?hub_id=&start_date=&end_date=[&car_type_id=]
#[instrument(skip(availability))]
pub async fn list_available_cars<S: RentalStore>(
    availability: web::Data<FleetAvailability<S>>,
    query: web::Query<AvailableCarsQuery>,
) -> Result<HttpResponse, AppError> {
    let query = query.into_inner();
    let cars = availability
        .query_available(query.hub_id, query.start_date, query.end_date, query.car_type_id)
        .await?;

    debug!(hub_id = query.hub_id, count = cars.len(), "Available cars");

    Ok(HttpResponse::Ok().json(ApiResponse::success(AvailableCarsResponse::new(&query, cars))))
}

/// Status of every car grouped by hub, now or over a date window
///
/// GET /api/v1/fleet/overview[?start_date=&end_date=]
#[instrument(skip(availability))]
pub async fn fleet_overview<S: RentalStore>(
    availability: web::Data<FleetAvailability<S>>,
    query: web::Query<FleetOverviewQuery>,
) -> Result<HttpResponse, AppError> {
    let window = query.window().map_err(|e| {
        warn!("Fleet overview rejected: {}", e);
        e
    })?;

    let overview = availability.fleet_overview(window).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(overview)))
}

/// Configure availability routes for a store
pub fn configure<S: RentalStore>(cfg: &mut web::ServiceConfig) {
    cfg.route("/cars/available", web::get().to(list_available_cars::<S>))
        .route("/fleet/overview", web::get().to(fleet_overview::<S>));
}
