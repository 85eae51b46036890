use sqlx::MySqlPool;

use crate::models::booking::BookingFilter;
use crate::models::export::BookingExportRow;
use crate::models::payment::Payable;
use crate::services::booking_service::{fetch_assignments, fetch_booking_rows};
use crate::services::payment_service::PaymentService;
use crate::utils::error::{AppError, AppResult};

/// Flattens bookings with their vehicles and payments into export rows.
#[derive(Clone)]
pub struct ExportService {
    pool: MySqlPool,
    payments: PaymentService,
}

impl ExportService {
    pub fn new(pool: MySqlPool) -> Self {
        ExportService {
            payments: PaymentService::new(pool.clone()),
            pool,
        }
    }

    pub async fn export_bookings(&self, filter: BookingFilter) -> AppResult<Vec<BookingExportRow>> {
        let rows = fetch_booking_rows(&self.pool, &filter).await?;

        let mut exported = Vec::with_capacity(rows.len());
        for row in rows {
            let booking = row.record.id;
            let assignments = fetch_assignments(&self.pool, booking).await?;
            let payments = self.payments.payment_records(Payable::Booking(booking)).await?;

            let line = BookingExportRow::new(row, &assignments, &payments)
                .map_err(|e| AppError::Unprocessable(format!("booking {}: {}", booking, e)))?;
            exported.push(line);
        }

        tracing::info!(rows = exported.len(), "bookings exported");
        Ok(exported)
    }
}
