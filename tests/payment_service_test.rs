use cab_booking_system::{
    models::booking::{BookingFilter, CreateBookingResponse},
    models::booking_vehicle::BookingVehicleRequest,
    models::payment::{CreatePaymentRequest, Payable, PaymentStatus, UpdatePaymentRequest},
    services::booking_service::BookingService,
    services::booking_vehicle_service::BookingVehicleService,
    services::export_service::ExportService,
    services::notification_service::NotificationDispatcher,
    services::payment_service::PaymentService,
    utils::error::AppError,
    utils::notifier::LogNotifier,
};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;
use test_context::{test_context, AsyncTestContext};

mod common {
    pub mod fixtures;
    pub mod test_utils;
}
use common::fixtures::Fixture;
use common::test_utils::TestDb;

use ctor::dtor;

#[dtor]
fn cleanup() {
    if let Err(e) = TestDb::cleanup_database_sync() {
        eprintln!("Failed to cleanup test database: {}", e);
    }
}

struct PaymentServiceContext {
    fixture: Fixture,
    bookings: BookingService,
    payments: PaymentService,
}

impl PaymentServiceContext {
    async fn new_booking(&self) -> Result<CreateBookingResponse, AppError> {
        // One-way fare of the seeded route: 2500
        self.bookings.create_booking(self.fixture.booking_request()).await
    }
}

fn payment(amount: i64, status: Option<PaymentStatus>) -> CreatePaymentRequest {
    CreatePaymentRequest {
        amount: Decimal::from(amount),
        payment_type: "Advance".to_string(),
        mode: "UPI".to_string(),
        reference_id: Some("TXN-1".to_string()),
        comment: None,
        details: None,
        status,
        timestamp: None,
    }
}

struct Ctx(Option<PaymentServiceContext>);

#[async_trait]
impl AsyncTestContext for Ctx {
    async fn setup() -> Self {
        let pool = TestDb::get_instance()
            .await
            .expect("Failed to get test database instance");
        let Some(pool) = pool else {
            return Ctx(None);
        };

        let dispatcher = NotificationDispatcher::new(Arc::new(LogNotifier));
        Ctx(Some(PaymentServiceContext {
            bookings: BookingService::new(pool.clone(), dispatcher),
            payments: PaymentService::new(pool.clone()),
            fixture: Fixture::seed(pool).await.expect("Failed to seed reference data"),
        }))
    }

    async fn teardown(self) {}
}

#[test_context(Ctx)]
#[tokio::test]
async fn test_payment_updates_booking_totals(ctx: &Ctx) -> Result<(), AppError> {
    let Some(ctx) = &ctx.0 else {
        return Ok(());
    };
    let booking = ctx.new_booking().await?;

    let recorded = ctx
        .payments
        .add_payment(Payable::Booking(booking.id), payment(1000, None))
        .await?;
    assert!(recorded.invoice_id.starts_with("INV-"));
    assert_eq!(recorded.payment_type, "Advance");

    let view = ctx.bookings.get_booking(&booking.booking_id).await?;
    assert_eq!(view.payment_done, Decimal::from(1000));
    assert_eq!(view.payment_due, Decimal::from(1500));
    assert_eq!(view.payment_status, "Partially paid");
    assert!(view.last_payment_date.is_some());

    ctx.payments
        .add_payment(Payable::Booking(booking.id), payment(1500, Some(PaymentStatus::Confirmed)))
        .await?;
    let view = ctx.bookings.get_booking(&booking.booking_id).await?;
    assert_eq!(view.payment_due, Decimal::ZERO);
    assert_eq!(view.payment_status, "Paid");
    Ok(())
}

#[test_context(Ctx)]
#[tokio::test]
async fn test_only_settled_payments_count(ctx: &Ctx) -> Result<(), AppError> {
    let Some(ctx) = &ctx.0 else {
        return Ok(());
    };
    let booking = ctx.new_booking().await?;
    let owner = Payable::Booking(booking.id);

    let pending = ctx
        .payments
        .add_payment(owner, payment(800, Some(PaymentStatus::Waiting)))
        .await?;
    let view = ctx.bookings.get_booking(&booking.booking_id).await?;
    assert_eq!(view.payment_done, Decimal::ZERO);
    assert_eq!(view.payment_status, "Not paid");

    let confirmed = ctx
        .payments
        .update_payment(
            pending.id,
            UpdatePaymentRequest {
                status: Some(PaymentStatus::Confirmed),
                details: Some("gateway ok".to_string()),
                comment: None,
            },
        )
        .await?;
    assert_eq!(confirmed.status, Some(PaymentStatus::Confirmed));
    assert_eq!(confirmed.details.as_deref(), Some("gateway ok"));

    let view = ctx.bookings.get_booking(&booking.booking_id).await?;
    assert_eq!(view.payment_done, Decimal::from(800));
    assert_eq!(view.payment_due, Decimal::from(1700));

    ctx.payments
        .update_payment(
            pending.id,
            UpdatePaymentRequest {
                status: Some(PaymentStatus::Refunded),
                details: None,
                comment: Some("customer cancelled".to_string()),
            },
        )
        .await?;
    let view = ctx.bookings.get_booking(&booking.booking_id).await?;
    assert_eq!(view.payment_done, Decimal::ZERO);

    let listed = ctx.payments.list_payments(owner).await?;
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].details.as_deref(), Some("gateway ok"));
    assert_eq!(listed[0].comment.as_deref(), Some("customer cancelled"));
    Ok(())
}

#[test_context(Ctx)]
#[tokio::test]
async fn test_invalid_payments_are_rejected(ctx: &Ctx) -> Result<(), AppError> {
    let Some(ctx) = &ctx.0 else {
        return Ok(());
    };
    let booking = ctx.new_booking().await?;

    let zero = ctx
        .payments
        .add_payment(Payable::Booking(booking.id), payment(0, None))
        .await;
    assert!(matches!(zero, Err(AppError::ValidationError(_))));

    let orphan = ctx
        .payments
        .add_payment(Payable::Booking(i32::MAX), payment(100, None))
        .await;
    assert!(matches!(orphan, Err(AppError::NotFound(_))));

    let missing = ctx.payments.get_payment(i32::MAX).await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));
    Ok(())
}

#[test_context(Ctx)]
#[tokio::test]
async fn test_export_flattens_vehicles_and_payments(ctx: &Ctx) -> Result<(), AppError> {
    let Some(ctx) = &ctx.0 else {
        return Ok(());
    };
    let booking = ctx.new_booking().await?;

    let vehicles = BookingVehicleService::new(
        ctx.fixture.pool.clone(),
        NotificationDispatcher::new(Arc::new(LogNotifier)),
    );
    vehicles
        .add_assignment(
            &booking.booking_id,
            BookingVehicleRequest {
                vehicle_id: Some(ctx.fixture.vehicle.id),
                driver_id: Some(ctx.fixture.driver.id),
                extra_info: None,
            },
        )
        .await?;
    ctx.payments
        .add_payment(Payable::Booking(booking.id), payment(1000, None))
        .await?;

    let export = ExportService::new(ctx.fixture.pool.clone());
    let rows = export
        .export_bookings(BookingFilter {
            search: Some(booking.booking_id.clone()),
            ..Default::default()
        })
        .await?;

    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row.status, "Pending");
    assert_eq!(row.payment_status, "Partially paid");
    assert_eq!(
        row.vehicles,
        format!("Ravi/Dzire ({})", ctx.fixture.vehicle.number)
    );

    let payments: serde_json::Value = serde_json::from_str(&row.payments)
        .map_err(|e| AppError::Unprocessable(e.to_string()))?;
    assert_eq!(payments.as_array().map(Vec::len), Some(1));
    assert_eq!(payments[0]["reference_id"], "TXN-1");
    Ok(())
}
