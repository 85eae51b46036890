use rocket::serde::json::Json;
use rocket::State;
use rocket_okapi::openapi;

use crate::models::payment::{
    CreatePaymentRequest, Payable, PaymentListResponse, PaymentView, UpdatePaymentRequest,
};
use crate::services::payment_service::PaymentService;
use crate::utils::error::AppError;
use crate::utils::jwt::AuthenticatedStaff;

fn owner(kind: &str, object_id: i32) -> Result<Payable, AppError> {
    Payable::from_parts(kind, object_id)
        .ok_or_else(|| AppError::BadRequest(format!("Payments cannot be attached to '{}'", kind)))
}

/// Payments attached to any payable entity
#[openapi(tag = "Payments")]
#[get("/payments/<kind>/<object_id>")]
pub async fn list_payments(
    kind: String,
    object_id: i32,
    _auth: AuthenticatedStaff,
    payment_service: &State<PaymentService>,
) -> Result<Json<PaymentListResponse>, AppError> {
    let payments = payment_service.list_payments(owner(&kind, object_id)?).await?;
    Ok(Json(PaymentListResponse { payments }))
}

/// Record a payment against any payable entity
#[openapi(tag = "Payments")]
#[post("/payments/<kind>/<object_id>", format = "json", data = "<request>")]
pub async fn add_payment(
    kind: String,
    object_id: i32,
    request: Json<CreatePaymentRequest>,
    _auth: AuthenticatedStaff,
    payment_service: &State<PaymentService>,
) -> Result<Json<PaymentView>, AppError> {
    let payment = payment_service
        .add_payment(owner(&kind, object_id)?, request.into_inner())
        .await?;
    Ok(Json(payment))
}

/// Payments of a booking, addressed by its booking id
#[openapi(tag = "Payments")]
#[get("/bookings/<booking_id>/payments")]
pub async fn list_booking_payments(
    booking_id: String,
    _auth: AuthenticatedStaff,
    payment_service: &State<PaymentService>,
) -> Result<Json<PaymentListResponse>, AppError> {
    let owner = payment_service.booking_owner(&booking_id).await?;
    let payments = payment_service.list_payments(owner).await?;
    Ok(Json(PaymentListResponse { payments }))
}

/// Record a payment for a booking
#[openapi(tag = "Payments")]
#[post("/bookings/<booking_id>/payments", format = "json", data = "<request>")]
pub async fn add_booking_payment(
    booking_id: String,
    request: Json<CreatePaymentRequest>,
    _auth: AuthenticatedStaff,
    payment_service: &State<PaymentService>,
) -> Result<Json<PaymentView>, AppError> {
    let owner = payment_service.booking_owner(&booking_id).await?;
    let payment = payment_service.add_payment(owner, request.into_inner()).await?;
    Ok(Json(payment))
}

#[openapi(tag = "Payments")]
#[get("/payments/<id>")]
pub async fn get_payment(
    id: i32,
    _auth: AuthenticatedStaff,
    payment_service: &State<PaymentService>,
) -> Result<Json<PaymentView>, AppError> {
    Ok(Json(payment_service.get_payment(id).await?))
}

/// Change a payment's status, details or comment
#[openapi(tag = "Payments")]
#[put("/payments/<id>", format = "json", data = "<request>")]
pub async fn update_payment(
    id: i32,
    request: Json<UpdatePaymentRequest>,
    _auth: AuthenticatedStaff,
    payment_service: &State<PaymentService>,
) -> Result<Json<PaymentView>, AppError> {
    let payment = payment_service.update_payment(id, request.into_inner()).await?;
    Ok(Json(payment))
}
