//! Invoice email collaborator

use async_trait::async_trait;
use fleet_core::{traits::InvoiceNotifier, AppResult};
use tracing::{info, instrument};

/// Notifier that records the dispatch in the log instead of sending mail
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingNotifier;

#[async_trait]
impl InvoiceNotifier for LoggingNotifier {
    #[instrument(skip(self))]
    async fn send_invoice_email(&self, booking_id: i64, email: &str) -> AppResult<()> {
        info!("Invoice for booking {} dispatched to {}", booking_id, email);
        Ok(())
    }
}
