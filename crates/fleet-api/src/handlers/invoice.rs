//! Invoice handlers

use crate::dto::ApiResponse;
use actix_web::{web, HttpResponse};
use fleet_core::{traits::RentalStore, AppError};
use fleet_services::InvoiceEmitter;
use tracing::{debug, instrument};

/// Invoice statement of a booking
///
/// GET /api/v1/bookings/{id}/invoice
#[instrument(skip(emitter))]
pub async fn get_invoice<S: RentalStore>(
    emitter: web::Data<InvoiceEmitter<S>>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let statement = emitter.statement(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(statement)))
}

/// Rendered invoice document of a booking
///
/// GET /api/v1/bookings/{id}/invoice/document
#[instrument(skip(emitter))]
pub async fn get_invoice_document<S: RentalStore>(
    emitter: web::Data<InvoiceEmitter<S>>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let booking_id = path.into_inner();
    let (bytes, content_type) = emitter.document(booking_id).await?;

    debug!(booking_id, size = bytes.len(), "Serving invoice document");

    Ok(HttpResponse::Ok()
        .content_type(content_type)
        .insert_header((
            "Content-Disposition",
            format!("inline; filename=\"invoice-{}.txt\"", booking_id),
        ))
        .body(bytes))
}
