//! Fleet handlers
//!
//! HTTP handlers for the rate table (car types) and car registration.
//! Rate changes apply to bookings created afterwards; existing bookings keep
//! the rates they were created or swapped with.

use crate::dto::{ApiResponse, CarResponse, FleetQuery, PaginationParams};
use actix_web::{web, HttpResponse};
use fleet_core::{
    models::{CreateCar, CreateCarType, UpdateCarTypeRates},
    traits::{CarRepository, CarTypeRepository, Repository},
    AppError, EntityKind,
};
use fleet_db::{PgCarRepository, PgCarTypeRepository};
use sqlx::PgPool;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

/// List the rate table
///
/// GET /api/v1/car-types
#[instrument(skip(pool))]
pub async fn list_car_types(
    pool: web::Data<PgPool>,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse, AppError> {
    query.validate().map_err(|e| {
        warn!("Pagination validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    let repo = PgCarTypeRepository::new(pool.get_ref().clone());
    let car_types = repo.find_all(query.limit(), query.offset()).await?;
    let total = repo.count().await?;

    Ok(HttpResponse::Ok().json(query.paginate(car_types, total)))
}

/// Add a rate table entry
///
/// POST /api/v1/car-types
#[instrument(skip(pool, req), fields(name = %req.name))]
pub async fn create_car_type(
    pool: web::Data<PgPool>,
    req: web::Json<CreateCarType>,
) -> Result<HttpResponse, AppError> {
    req.validate().map_err(|e| {
        warn!("Car type validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    let repo = PgCarTypeRepository::new(pool.get_ref().clone());
    let created = repo.create(&req.to_car_type()).await?;

    info!(id = created.id, name = %created.name, "Car type created");

    Ok(HttpResponse::Created().json(ApiResponse::with_message(created, "Car type created")))
}

/// Get one rate table entry
///
/// GET /api/v1/car-types/{id}
#[instrument(skip(pool))]
pub async fn get_car_type(
    pool: web::Data<PgPool>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let repo = PgCarTypeRepository::new(pool.get_ref().clone());

    let car_type = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found(EntityKind::CarType, id))?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(car_type)))
}

/// Replace the rates of a car type
///
/// PUT /api/v1/car-types/{id}/rates
#[instrument(skip(pool, req))]
pub async fn update_car_type_rates(
    pool: web::Data<PgPool>,
    path: web::Path<i32>,
    req: web::Json<UpdateCarTypeRates>,
) -> Result<HttpResponse, AppError> {
    req.validate().map_err(|e| {
        warn!("Rate update validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    let id = path.into_inner();
    let repo = PgCarTypeRepository::new(pool.get_ref().clone());

    let updated = repo
        .update_rates(id, &req)
        .await?
        .ok_or_else(|| AppError::not_found(EntityKind::CarType, id))?;

    info!(
        id,
        daily = ?updated.daily_rate,
        weekly = ?updated.weekly_rate,
        monthly = ?updated.monthly_rate,
        "Car type rates updated"
    );

    Ok(HttpResponse::Ok().json(ApiResponse::with_message(updated, "Rates updated")))
}

/// Register a car
///
/// POST /api/v1/cars
#[instrument(skip(pool, req), fields(plate = %req.number_plate))]
pub async fn register_car(
    pool: web::Data<PgPool>,
    req: web::Json<CreateCar>,
) -> Result<HttpResponse, AppError> {
    req.validate().map_err(|e| {
        warn!("Car registration validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    let car = req.to_car();

    let car_types = PgCarTypeRepository::new(pool.get_ref().clone());
    if car_types.find_by_id(car.car_type_id).await?.is_none() {
        return Err(AppError::not_found(EntityKind::CarType, car.car_type_id));
    }

    let repo = PgCarRepository::new(pool.get_ref().clone());
    if repo.find_by_plate(&car.number_plate).await?.is_some() {
        warn!(plate = %car.number_plate, "Car registration failed: duplicate plate");
        return Err(AppError::AlreadyExists(format!(
            "car with number plate {} already exists",
            car.number_plate
        )));
    }

    debug!(hub_id = car.hub_id, "Registering car");
    let created = repo.create(&car).await?;

    info!(id = created.id, plate = %created.number_plate, "Car registered");

    Ok(HttpResponse::Created().json(ApiResponse::with_message(
        CarResponse::from(created),
        "Car registered",
    )))
}

/// Cars stationed at a hub, regardless of availability
///
/// GET /api/v1/cars?hub_id=...
#[instrument(skip(pool))]
pub async fn list_cars(
    pool: web::Data<PgPool>,
    query: web::Query<FleetQuery>,
) -> Result<HttpResponse, AppError> {
    let repo = PgCarRepository::new(pool.get_ref().clone());
    let cars: Vec<CarResponse> = repo
        .list_by_hub(query.hub_id)
        .await?
        .into_iter()
        .map(CarResponse::from)
        .collect();

    debug!(hub_id = query.hub_id, count = cars.len(), "Listed cars");
    Ok(HttpResponse::Ok().json(ApiResponse::success(cars)))
}

/// Configure rate table and car registration routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/car-types")
            .route("", web::get().to(list_car_types))
            .route("", web::post().to(create_car_type))
            .route("/{id}", web::get().to(get_car_type))
            .route("/{id}/rates", web::put().to(update_car_type_rates)),
    )
    .route("/cars", web::get().to(list_cars))
    .route("/cars", web::post().to(register_car));
}
