//! Catalog handlers
//!
//! Hubs and the add-on catalog.

use crate::dto::ApiResponse;
use actix_web::{web, HttpResponse};
use fleet_core::{models::CreateAddOn, traits::RentalStore, AppError};
use fleet_services::Catalog;
use tracing::{debug, info, instrument};

/// List all hubs
///
/// GET /api/v1/hubs
#[instrument(skip(catalog))]
pub async fn list_hubs<S: RentalStore>(
    catalog: web::Data<Catalog<S>>,
) -> Result<HttpResponse, AppError> {
    let hubs = catalog.list_hubs().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(hubs)))
}

/// List the add-on catalog
///
/// GET /api/v1/add-ons
#[instrument(skip(catalog))]
pub async fn list_add_ons<S: RentalStore>(
    catalog: web::Data<Catalog<S>>,
) -> Result<HttpResponse, AppError> {
    let add_ons = catalog.list_add_ons().await?;

    debug!(count = add_ons.len(), "Listed add-ons");
    Ok(HttpResponse::Ok().json(ApiResponse::success(add_ons)))
}

/// GET /api/v1/add-ons/{id}
#[instrument(skip(catalog))]
pub async fn get_add_on<S: RentalStore>(
    catalog: web::Data<Catalog<S>>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let add_on = catalog.get_add_on(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(add_on)))
}

/// Add an entry to the add-on catalog
///
/// POST /api/v1/add-ons
#[instrument(skip(catalog, req), fields(name = %req.name))]
pub async fn create_add_on<S: RentalStore>(
    catalog: web::Data<Catalog<S>>,
    req: web::Json<CreateAddOn>,
) -> Result<HttpResponse, AppError> {
    let created = catalog.create_add_on(req.into_inner()).await?;

    info!(id = created.id, "Add-on created");
    Ok(HttpResponse::Created().json(ApiResponse::with_message(created, "Add-on created")))
}

/// Configure hub and add-on routes for a store
pub fn configure<S: RentalStore>(cfg: &mut web::ServiceConfig) {
    cfg.route("/hubs", web::get().to(list_hubs::<S>)).service(
        web::scope("/add-ons")
            .route("", web::get().to(list_add_ons::<S>))
            .route("", web::post().to(create_add_on::<S>))
            .route("/{id}", web::get().to(get_add_on::<S>)),
    );
}
