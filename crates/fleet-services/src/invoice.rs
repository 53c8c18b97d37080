//! Invoice record emitter
//!
//! Turns the stored 1:1 invoice of a booking into a statement that document
//! and email collaborators can consume.

use crate::billing;
use chrono::NaiveDate;
use fleet_core::{
    models::{Booking, BookingDetail, Invoice},
    traits::{RentalStore, RentalTransaction},
    AppError, AppResult, EntityKind,
};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt::Write;
use std::sync::Arc;
use tracing::{debug, instrument};

/// One priced line of an invoice
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvoiceLine {
    pub description: String,
    pub amount: Decimal,
}

/// Everything a rendered invoice shows
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceStatement {
    pub invoice: Invoice,
    pub confirmation_code: String,
    pub customer_name: String,
    pub email: String,
    pub car_name: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Empty until the invoice is finalized
    pub lines: Vec<InvoiceLine>,
    pub currency: String,
}

impl InvoiceStatement {
    pub fn build(
        booking: &Booking,
        details: &[BookingDetail],
        invoice: Invoice,
        currency: &str,
    ) -> Self {
        let mut lines = Vec::new();

        if let (Some(return_date), Some(rental)) = (invoice.return_date, invoice.rental_amount) {
            let days = billing::billable_days(booking.start_date, return_date);
            let day_count = Decimal::from(days);

            lines.push(InvoiceLine {
                description: format!(
                    "Rental ({})",
                    invoice
                        .rate_description
                        .clone()
                        .unwrap_or_else(|| format!("Days: {}", days))
                ),
                amount: rental,
            });

            for detail in details {
                lines.push(InvoiceLine {
                    description: format!(
                        "{} ({} x {} days)",
                        detail.add_on_name, detail.add_on_daily_rate, days
                    ),
                    amount: detail.add_on_daily_rate * day_count,
                });
            }
        }

        Self {
            confirmation_code: booking.confirmation_code.clone(),
            customer_name: format!(
                "{} {}",
                booking.customer.first_name, booking.customer.last_name
            ),
            email: booking.customer.email.clone(),
            car_name: booking.car_name.clone(),
            start_date: booking.start_date,
            end_date: booking.end_date,
            lines,
            currency: currency.to_string(),
            invoice,
        }
    }
}

/// Renders an invoice statement into a document
pub trait InvoiceRenderer: Send + Sync {
    /// MIME type of the rendered bytes
    fn content_type(&self) -> &'static str;

    fn render(&self, statement: &InvoiceStatement) -> AppResult<Vec<u8>>;
}

/// Plain-text invoice
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextRenderer;

impl PlainTextRenderer {
    fn write(statement: &InvoiceStatement) -> Result<String, std::fmt::Error> {
        let mut out = String::new();
        let invoice = &statement.invoice;

        writeln!(out, "INVOICE #{}", invoice.id)?;
        writeln!(out, "Booking: {}", statement.confirmation_code)?;
        writeln!(out, "Customer: {} <{}>", statement.customer_name, statement.email)?;
        if let Some(car) = &statement.car_name {
            writeln!(out, "Car: {}", car)?;
        }
        writeln!(out, "Handover: {}", invoice.handover_date)?;
        match invoice.return_date {
            Some(date) => writeln!(out, "Return: {}", date)?,
            None => writeln!(out, "Return: pending")?,
        }
        writeln!(out)?;

        for line in &statement.lines {
            writeln!(out, "{:<48} {:>12} {}", line.description, line.amount, statement.currency)?;
        }

        match invoice.total_amount {
            Some(total) => writeln!(out, "{:<48} {:>12} {}", "TOTAL", total, statement.currency)?,
            None => writeln!(out, "Amounts are computed when the car is returned")?,
        }

        Ok(out)
    }
}

impl InvoiceRenderer for PlainTextRenderer {
    fn content_type(&self) -> &'static str {
        "text/plain; charset=utf-8"
    }

    fn render(&self, statement: &InvoiceStatement) -> AppResult<Vec<u8>> {
        Self::write(statement)
            .map(String::into_bytes)
            .map_err(|e| AppError::Document(format!("Failed to render invoice: {}", e)))
    }
}

/// Read side of invoices
pub struct InvoiceEmitter<S: RentalStore> {
    store: Arc<S>,
    renderer: Arc<dyn InvoiceRenderer>,
    currency: String,
}

impl<S: RentalStore> InvoiceEmitter<S> {
    pub fn new(store: Arc<S>, renderer: Arc<dyn InvoiceRenderer>, currency: impl Into<String>) -> Self {
        Self {
            store,
            renderer,
            currency: currency.into(),
        }
    }

    /// Statement for the invoice of a booking
    #[instrument(skip(self))]
    pub async fn statement(&self, booking_id: i64) -> AppResult<InvoiceStatement> {
        let mut tx = self.store.begin().await?;

        let booking = tx
            .find_booking(booking_id)
            .await?
            .ok_or_else(|| AppError::not_found(EntityKind::Booking, booking_id))?;

        let invoice = tx
            .find_invoice_by_booking(booking_id)
            .await?
            .ok_or_else(|| AppError::not_found(EntityKind::Invoice, booking_id))?;

        let details = tx.list_booking_details(booking_id).await?;

        Ok(InvoiceStatement::build(&booking, &details, invoice, &self.currency))
    }

    /// Rendered invoice document and its content type
    #[instrument(skip(self))]
    pub async fn document(&self, booking_id: i64) -> AppResult<(Vec<u8>, &'static str)> {
        let statement = self.statement(booking_id).await?;
        let bytes = self.renderer.render(&statement)?;

        debug!("Rendered invoice for booking {} ({} bytes)", booking_id, bytes.len());
        Ok((bytes, self.renderer.content_type()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use fleet_core::models::{BookingStatus, CustomerSnapshot, RateSnapshot};
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn completed_booking() -> Booking {
        let now = Utc::now();
        Booking {
            id: 11,
            confirmation_code: "BOK-TEST0001".to_string(),
            status: BookingStatus::Completed,
            customer_id: 1,
            car_id: Some(2),
            car_type_id: 1,
            pickup_hub_id: 1,
            return_hub_id: 1,
            start_date: date(2024, 1, 1),
            end_date: date(2024, 1, 3),
            booking_date: date(2023, 12, 20),
            customer: CustomerSnapshot {
                first_name: "Asha".to_string(),
                last_name: "Rao".to_string(),
                email: "asha@example.com".to_string(),
                ..Default::default()
            },
            rates: RateSnapshot {
                daily_rate: Some(dec!(1000)),
                ..Default::default()
            },
            car_name: Some("Swift".to_string()),
            pickup_at: Some(now),
            pickup_fuel_level: None,
            pickup_notes: None,
            returned_at: Some(now),
            return_fuel_level: None,
            return_notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn detail(name: &str, rate: Decimal) -> BookingDetail {
        BookingDetail {
            id: 1,
            booking_id: 11,
            add_on_id: 1,
            add_on_name: name.to_string(),
            add_on_daily_rate: rate,
        }
    }

    fn finalized_invoice() -> Invoice {
        let mut invoice = Invoice::skeleton(11, date(2024, 1, 1), Utc::now());
        invoice.id = 5;
        invoice.return_date = Some(date(2024, 1, 3));
        invoice.rental_amount = Some(dec!(3000));
        invoice.add_on_amount = Some(dec!(450));
        invoice.total_amount = Some(dec!(3450));
        invoice.rate_description = Some("Daily: 1000 | Days: 3".to_string());
        invoice
    }

    #[test]
    fn test_statement_lines_for_finalized_invoice() {
        let details = vec![detail("GPS", dec!(100)), detail("Child seat", dec!(50))];
        let statement =
            InvoiceStatement::build(&completed_booking(), &details, finalized_invoice(), "INR");

        assert_eq!(statement.customer_name, "Asha Rao");
        assert_eq!(statement.lines.len(), 3);
        assert_eq!(statement.lines[0].amount, dec!(3000));
        assert_eq!(statement.lines[1].amount, dec!(300));
        assert_eq!(statement.lines[2].amount, dec!(150));

        let line_sum: Decimal = statement.lines.iter().map(|l| l.amount).sum();
        assert_eq!(Some(line_sum), statement.invoice.total_amount);
    }

    #[test]
    fn test_skeleton_statement_has_no_lines() {
        let skeleton = Invoice::skeleton(11, date(2024, 1, 1), Utc::now());
        let statement = InvoiceStatement::build(&completed_booking(), &[], skeleton, "INR");
        assert!(statement.lines.is_empty());
    }

    #[test]
    fn test_plain_text_render() {
        let statement =
            InvoiceStatement::build(&completed_booking(), &[], finalized_invoice(), "INR");
        let bytes = PlainTextRenderer.render(&statement).unwrap();
        let text = String::from_utf8(bytes).unwrap();

        assert!(text.contains("INVOICE #5"));
        assert!(text.contains("BOK-TEST0001"));
        assert!(text.contains("TOTAL"));
        assert!(text.contains("3450"));
    }
}
