use chrono::{NaiveDateTime, Utc};
use rust_decimal::Decimal;
use sqlx::mysql::MySqlConnection;
use sqlx::MySqlPool;
use uuid::Uuid;
use validator::Validate;

use crate::db::inserted_id;
use crate::models::booking::{BookingPaymentStatus, CodedChoice};
use crate::models::payment::{
    CreatePaymentRequest, Payable, PaymentRecord, PaymentStatus, PaymentView, UpdatePaymentRequest,
};
use crate::services::booking_service::booking_pk;
use crate::utils::error::{AppError, AppResult};

/// Paid/due bookkeeping derived from a booking's fare and its payments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentSummary {
    pub payment_done: Decimal,
    pub payment_due: Decimal,
    pub payment_status: BookingPaymentStatus,
    pub last_payment_date: Option<NaiveDateTime>,
}

impl PaymentSummary {
    pub fn compute(total_fare: Decimal, payments: &[PaymentRecord]) -> Self {
        let counted = payments
            .iter()
            .filter(|p| PaymentStatus::counts_as_paid(p.status()));

        let mut payment_done = Decimal::ZERO;
        let mut last_payment_date = None;
        for payment in counted {
            payment_done += payment.amount;
            last_payment_date = last_payment_date.max(Some(payment.timestamp));
        }

        PaymentSummary {
            payment_done,
            payment_due: total_fare - payment_done,
            payment_status: BookingPaymentStatus::for_amounts(total_fare, payment_done),
            last_payment_date,
        }
    }
}

pub fn generate_invoice_id() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("INV-{}", hex[..12].to_uppercase())
}

/// Check that the owner of a payment exists. There is no foreign key
/// behind (item_kind, item_object_id).
pub async fn resolve_payable(conn: &mut MySqlConnection, owner: Payable) -> AppResult<()> {
    let found: Option<i32> = match owner {
        Payable::Booking(id) => {
            sqlx::query_scalar("SELECT id FROM booking WHERE id = ?")
                .bind(id)
                .fetch_optional(&mut *conn)
                .await?
        }
    };
    found
        .map(|_| ())
        .ok_or_else(|| AppError::NotFound(format!("{} {} not found", owner.kind(), owner.object_id())))
}

async fn payments_of(conn: &mut MySqlConnection, owner: Payable) -> AppResult<Vec<PaymentRecord>> {
    let payments = sqlx::query_as::<_, PaymentRecord>(
        "SELECT * FROM payment WHERE item_kind = ? AND item_object_id = ? ORDER BY timestamp, id",
    )
    .bind(owner.kind())
    .bind(owner.object_id())
    .fetch_all(&mut *conn)
    .await?;
    Ok(payments)
}

// Recompute the owner's paid/due columns from its payments
pub async fn refresh_payment_summary(conn: &mut MySqlConnection, owner: Payable) -> AppResult<PaymentSummary> {
    match owner {
        Payable::Booking(booking_pk) => {
            let total_fare: Decimal = sqlx::query_scalar("SELECT total_fare FROM booking WHERE id = ? FOR UPDATE")
                .bind(booking_pk)
                .fetch_one(&mut *conn)
                .await?;
            let payments = payments_of(&mut *conn, owner).await?;
            let summary = PaymentSummary::compute(total_fare, &payments);

            sqlx::query(
                r#"
                UPDATE booking
                SET payment_done = ?, payment_due = ?, payment_status = ?, last_payment_date = ?
                WHERE id = ?
                "#,
            )
            .bind(summary.payment_done)
            .bind(summary.payment_due)
            .bind(summary.payment_status.code())
            .bind(summary.last_payment_date)
            .bind(booking_pk)
            .execute(&mut *conn)
            .await?;

            Ok(summary)
        }
    }
}

#[derive(Clone)]
pub struct PaymentService {
    pool: MySqlPool,
}

impl PaymentService {
    pub fn new(pool: MySqlPool) -> Self {
        PaymentService { pool }
    }

    /// Payment owner for a booking given by its human-readable id.
    pub async fn booking_owner(&self, booking_ref: &str) -> AppResult<Payable> {
        Ok(Payable::Booking(booking_pk(&self.pool, booking_ref).await?))
    }

    pub async fn add_payment(&self, owner: Payable, request: CreatePaymentRequest) -> AppResult<PaymentView> {
        request.validate()?;
        if request.amount <= Decimal::ZERO {
            return Err(AppError::ValidationError("amount: must be positive".into()));
        }

        let mut tx = self.pool.begin().await?;
        resolve_payable(&mut *tx, owner).await?;

        let invoice_id = generate_invoice_id();
        let timestamp = request.timestamp.unwrap_or_else(|| Utc::now().naive_utc());

        let result = sqlx::query(
            r#"
            INSERT INTO payment (
                item_kind, item_object_id, amount, type, mode,
                reference_id, comment, invoice_id, timestamp, details, status
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(owner.kind())
        .bind(owner.object_id())
        .bind(request.amount)
        .bind(&request.payment_type)
        .bind(&request.mode)
        .bind(&request.reference_id)
        .bind(&request.comment)
        .bind(&invoice_id)
        .bind(timestamp)
        .bind(&request.details)
        .bind(request.status.map(PaymentStatus::code))
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::on_insert(e, "Invoice"))?;

        let payment_id = inserted_id(&result)?;
        let summary = refresh_payment_summary(&mut *tx, owner).await?;
        tx.commit().await?;

        tracing::info!(
            payment_id,
            %invoice_id,
            owner = owner.kind(),
            owner_id = owner.object_id(),
            amount = %request.amount,
            due = %summary.payment_due,
            "payment recorded"
        );

        self.get_payment(payment_id).await
    }

    pub async fn get_payment(&self, payment_id: i32) -> AppResult<PaymentView> {
        let record = sqlx::query_as::<_, PaymentRecord>("SELECT * FROM payment WHERE id = ?")
            .bind(payment_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Payment {} not found", payment_id)))?;
        Ok(record.into())
    }

    pub async fn list_payments(&self, owner: Payable) -> AppResult<Vec<PaymentView>> {
        let mut conn = self.pool.acquire().await?;
        resolve_payable(&mut *conn, owner).await?;
        let payments = payments_of(&mut *conn, owner).await?;
        Ok(payments.into_iter().map(PaymentView::from).collect())
    }

    pub(crate) async fn payment_records(&self, owner: Payable) -> AppResult<Vec<PaymentRecord>> {
        let mut conn = self.pool.acquire().await?;
        payments_of(&mut *conn, owner).await
    }

    /// Change the status, details or comment of a payment and refresh the
    /// owner's totals.
    pub async fn update_payment(&self, payment_id: i32, request: UpdatePaymentRequest) -> AppResult<PaymentView> {
        request.validate()?;

        let mut tx = self.pool.begin().await?;
        let record = sqlx::query_as::<_, PaymentRecord>("SELECT * FROM payment WHERE id = ? FOR UPDATE")
            .bind(payment_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Payment {} not found", payment_id)))?;

        let status = match request.status {
            Some(status) => Some(status.code().to_string()),
            None => record.status.clone(),
        };
        let details = request.details.or_else(|| record.details.clone());
        let comment = request.comment.or_else(|| record.comment.clone());

        sqlx::query("UPDATE payment SET status = ?, details = ?, comment = ? WHERE id = ?")
            .bind(&status)
            .bind(&details)
            .bind(&comment)
            .bind(payment_id)
            .execute(&mut *tx)
            .await?;

        match record.owner() {
            Some(owner) => {
                resolve_payable(&mut *tx, owner).await?;
                refresh_payment_summary(&mut *tx, owner).await?;
            }
            None => tracing::warn!(payment_id, kind = %record.item_kind, "payment owner kind not recognised"),
        }
        tx.commit().await?;

        if record.status != status {
            tracing::info!(payment_id, from = ?record.status, to = ?status, "payment status changed");
        }
        self.get_payment(payment_id).await
    }
}
