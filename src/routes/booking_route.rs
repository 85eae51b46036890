use rocket::serde::json::Json;
use rocket::State;
use rocket_okapi::openapi;

use crate::models::booking::{
    BookingFilter, BookingListResponse, BookingView, CreateBookingRequest, CreateBookingResponse,
    UpdateBookingRequest, UpdateBookingResponse,
};
use crate::models::export::BookingExportResponse;
use crate::routes::{parse_code, parse_date};
use crate::services::booking_service::BookingService;
use crate::services::export_service::ExportService;
use crate::utils::error::AppError;
use crate::utils::jwt::AuthenticatedStaff;

fn booking_filter(
    booking_type: Option<String>,
    status: Option<String>,
    payment_status: Option<String>,
    travel_date: Option<String>,
    search: Option<String>,
) -> Result<BookingFilter, AppError> {
    Ok(BookingFilter {
        booking_type: parse_code(booking_type, "booking type")?,
        status: parse_code(status, "status")?,
        payment_status: parse_code(payment_status, "payment status")?,
        travel_date: parse_date(travel_date, "travel date")?,
        search,
    })
}

/// Create a booking
#[openapi(tag = "Bookings")]
#[post("/bookings", format = "json", data = "<request>")]
pub async fn create_booking(
    request: Json<CreateBookingRequest>,
    _auth: AuthenticatedStaff,
    booking_service: &State<BookingService>,
) -> Result<Json<CreateBookingResponse>, AppError> {
    let created = booking_service.create_booking(request.into_inner()).await?;
    Ok(Json(created))
}

/// List bookings, filtered by codes (`OW`, `1`, `PP`), travel date and a search term
#[openapi(tag = "Bookings")]
#[get("/bookings?<booking_type>&<status>&<payment_status>&<travel_date>&<search>")]
pub async fn list_bookings(
    booking_type: Option<String>,
    status: Option<String>,
    payment_status: Option<String>,
    travel_date: Option<String>,
    search: Option<String>,
    _auth: AuthenticatedStaff,
    booking_service: &State<BookingService>,
) -> Result<Json<BookingListResponse>, AppError> {
    let filter = booking_filter(booking_type, status, payment_status, travel_date, search)?;
    let bookings = booking_service.list_bookings(filter).await?;
    Ok(Json(BookingListResponse { bookings }))
}

/// Export bookings with their vehicles and payments
#[openapi(tag = "Bookings")]
#[get("/bookings/export?<booking_type>&<status>&<payment_status>&<travel_date>&<search>")]
pub async fn export_bookings(
    booking_type: Option<String>,
    status: Option<String>,
    payment_status: Option<String>,
    travel_date: Option<String>,
    search: Option<String>,
    _auth: AuthenticatedStaff,
    export_service: &State<ExportService>,
) -> Result<Json<BookingExportResponse>, AppError> {
    let filter = booking_filter(booking_type, status, payment_status, travel_date, search)?;
    let rows = export_service.export_bookings(filter).await?;
    Ok(Json(BookingExportResponse { rows }))
}

/// Get a booking by its booking id
#[openapi(tag = "Bookings")]
#[get("/bookings/<booking_id>")]
pub async fn get_booking(
    booking_id: String,
    _auth: AuthenticatedStaff,
    booking_service: &State<BookingService>,
) -> Result<Json<BookingView>, AppError> {
    let booking = booking_service.get_booking(&booking_id).await?;
    Ok(Json(booking))
}

/// Update a booking; a status change notifies the customer
#[openapi(tag = "Bookings")]
#[put("/bookings/<booking_id>", format = "json", data = "<request>")]
pub async fn update_booking(
    booking_id: String,
    request: Json<UpdateBookingRequest>,
    _auth: AuthenticatedStaff,
    booking_service: &State<BookingService>,
) -> Result<Json<UpdateBookingResponse>, AppError> {
    let (booking, report) = booking_service
        .update_booking(&booking_id, request.into_inner())
        .await?;
    Ok(Json(UpdateBookingResponse {
        booking,
        notifications_sent: report.sent,
        notifications_failed: report.failed,
    }))
}

/// Delete a booking with its vehicles and payments
#[openapi(tag = "Bookings")]
#[delete("/bookings/<booking_id>")]
pub async fn delete_booking(
    booking_id: String,
    _auth: AuthenticatedStaff,
    booking_service: &State<BookingService>,
) -> Result<(), AppError> {
    booking_service.delete_booking(&booking_id).await
}
