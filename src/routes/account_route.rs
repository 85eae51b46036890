use rocket::serde::json::Json;
use rocket::State;
use rocket_okapi::openapi;

use crate::models::booking::{AccountListResponse, AccountVerificationRequest};
use crate::services::booking_service::BookingService;
use crate::utils::error::AppError;
use crate::utils::jwt::AuthenticatedStaff;

/// Payment bookkeeping of bookings, optionally by verification state
#[openapi(tag = "Accounts")]
#[get("/accounts?<accounts_verified>&<search>")]
pub async fn list_accounts(
    accounts_verified: Option<bool>,
    search: Option<String>,
    _auth: AuthenticatedStaff,
    booking_service: &State<BookingService>,
) -> Result<Json<AccountListResponse>, AppError> {
    let accounts = booking_service.list_accounts(accounts_verified, search).await?;
    Ok(Json(AccountListResponse { accounts }))
}

/// Mark a booking's accounts as verified or not
#[openapi(tag = "Accounts")]
#[put("/accounts/<booking_id>", format = "json", data = "<request>")]
pub async fn set_accounts_verified(
    booking_id: String,
    request: Json<AccountVerificationRequest>,
    _auth: AuthenticatedStaff,
    booking_service: &State<BookingService>,
) -> Result<(), AppError> {
    booking_service
        .set_accounts_verified(&booking_id, request.accounts_verified)
        .await
}
