//! Booking handlers
//!
//! HTTP handlers for the booking lifecycle endpoints.

use super::invoice::{get_invoice, get_invoice_document};
use crate::dto::{ApiResponse, BookingFilter, ListBookingsQuery};
use actix_web::{web, HttpResponse};
use fleet_core::{
    models::{CreateBooking, HandoverRequest, ModifyBooking, ReturnRequest},
    traits::RentalStore,
    AppError,
};
use fleet_services::BookingService;
use tracing::{debug, info, instrument, warn};

/// Create a booking
///
/// POST /api/v1/bookings
#[instrument(skip(service, req), fields(customer_id = req.customer_id, car_id = req.car_id))]
pub async fn create_booking<S: RentalStore>(
    service: web::Data<BookingService<S>>,
    req: web::Json<CreateBooking>,
) -> Result<HttpResponse, AppError> {
    let view = service.create(req.into_inner()).await?;

    info!(
        id = view.booking.id,
        code = %view.booking.confirmation_code,
        "Booking created"
    );

    Ok(HttpResponse::Created().json(ApiResponse::with_message(view, "Booking confirmed")))
}

/// Get a booking by numeric id or confirmation code
///
/// GET /api/v1/bookings/{reference}
#[instrument(skip(service))]
pub async fn get_booking<S: RentalStore>(
    service: web::Data<BookingService<S>>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let reference = path.into_inner();
    debug!(reference = %reference, "Getting booking");

    let view = service.find_by_reference(&reference).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(view)))
}

/// List bookings by customer email, by hub, or all of them
///
/// GET /api/v1/bookings[?email=... | ?hub_id=...]
#[instrument(skip(service))]
pub async fn list_bookings<S: RentalStore>(
    service: web::Data<BookingService<S>>,
    query: web::Query<ListBookingsQuery>,
) -> Result<HttpResponse, AppError> {
    let filter = query.filter().map_err(|e| {
        warn!("Booking list rejected: {}", e);
        e
    })?;

    let views = match filter {
        BookingFilter::All => service.list_all().await?,
        BookingFilter::Email(email) => service.list_by_email(&email).await?,
        BookingFilter::Hub(hub_id) => service.list_by_hub(hub_id).await?,
    };

    debug!(count = views.len(), "Listed bookings");
    Ok(HttpResponse::Ok().json(ApiResponse::success(views)))
}

/// Hand the car over to the customer
///
/// POST /api/v1/bookings/{id}/handover
#[instrument(skip(service, req))]
pub async fn handover_booking<S: RentalStore>(
    service: web::Data<BookingService<S>>,
    path: web::Path<i64>,
    req: web::Json<HandoverRequest>,
) -> Result<HttpResponse, AppError> {
    let view = service.handover(path.into_inner(), req.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::with_message(view, "Car handed over")))
}

/// Take the car back and finalize the invoice
///
/// POST /api/v1/bookings/{id}/return
#[instrument(skip(service, req))]
pub async fn return_booking<S: RentalStore>(
    service: web::Data<BookingService<S>>,
    path: web::Path<i64>,
    req: web::Json<ReturnRequest>,
) -> Result<HttpResponse, AppError> {
    let receipt = service.return_car(path.into_inner(), req.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::with_message(receipt, "Car returned")))
}

/// Cancel a booking
///
/// POST /api/v1/bookings/{id}/cancel
#[instrument(skip(service))]
pub async fn cancel_booking<S: RentalStore>(
    service: web::Data<BookingService<S>>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let view = service.cancel(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::with_message(view, "Booking cancelled")))
}

/// Change the dates or car of a confirmed booking
///
/// PUT /api/v1/bookings/{id}
#[instrument(skip(service, req))]
pub async fn modify_booking<S: RentalStore>(
    service: web::Data<BookingService<S>>,
    path: web::Path<i64>,
    req: web::Json<ModifyBooking>,
) -> Result<HttpResponse, AppError> {
    let req = req.into_inner();
    if req.is_empty() {
        return Err(AppError::Validation(
            "at least one of start_date, end_date or car_id is required".to_string(),
        ));
    }

    let view = service.modify(path.into_inner(), req).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::with_message(view, "Booking updated")))
}

/// Configure booking and invoice routes for a store
pub fn configure<S: RentalStore>(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/bookings")
            .route("", web::get().to(list_bookings::<S>))
            .route("", web::post().to(create_booking::<S>))
            .route("/{id}", web::get().to(get_booking::<S>))
            .route("/{id}", web::put().to(modify_booking::<S>))
            .route("/{id}/handover", web::post().to(handover_booking::<S>))
            .route("/{id}/return", web::post().to(return_booking::<S>))
            .route("/{id}/cancel", web::post().to(cancel_booking::<S>))
            .route("/{id}/invoice", web::get().to(get_invoice::<S>))
            .route(
                "/{id}/invoice/document",
                web::get().to(get_invoice_document::<S>),
            ),
    );
}
