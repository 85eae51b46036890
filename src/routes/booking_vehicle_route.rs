use rocket::serde::json::Json;
use rocket::State;
use rocket_okapi::openapi;

use crate::models::booking_vehicle::{
    BookingVehicleListResponse, BookingVehicleRequest, BookingVehicleSaveResponse,
};
use crate::services::booking_vehicle_service::BookingVehicleService;
use crate::utils::error::AppError;
use crate::utils::jwt::AuthenticatedStaff;

/// Vehicles and drivers assigned to a booking
#[openapi(tag = "Booking vehicles")]
#[get("/bookings/<booking_id>/vehicles")]
pub async fn list_booking_vehicles(
    booking_id: String,
    _auth: AuthenticatedStaff,
    service: &State<BookingVehicleService>,
) -> Result<Json<BookingVehicleListResponse>, AppError> {
    let vehicles = service.list_assignments(&booking_id).await?;
    Ok(Json(BookingVehicleListResponse { vehicles }))
}

/// Assign a vehicle and driver; the customer and driver are notified
#[openapi(tag = "Booking vehicles")]
#[post("/bookings/<booking_id>/vehicles", format = "json", data = "<request>")]
pub async fn add_booking_vehicle(
    booking_id: String,
    request: Json<BookingVehicleRequest>,
    _auth: AuthenticatedStaff,
    service: &State<BookingVehicleService>,
) -> Result<Json<BookingVehicleSaveResponse>, AppError> {
    let saved = service.add_assignment(&booking_id, request.into_inner()).await?;
    Ok(Json(saved))
}

/// Replace an assignment; only changed details trigger notifications
#[openapi(tag = "Booking vehicles")]
#[put("/booking-vehicles/<id>", format = "json", data = "<request>")]
pub async fn update_booking_vehicle(
    id: i32,
    request: Json<BookingVehicleRequest>,
    _auth: AuthenticatedStaff,
    service: &State<BookingVehicleService>,
) -> Result<Json<BookingVehicleSaveResponse>, AppError> {
    let saved = service.update_assignment(id, request.into_inner()).await?;
    Ok(Json(saved))
}

#[openapi(tag = "Booking vehicles")]
#[delete("/booking-vehicles/<id>")]
pub async fn delete_booking_vehicle(
    id: i32,
    _auth: AuthenticatedStaff,
    service: &State<BookingVehicleService>,
) -> Result<(), AppError> {
    service.delete_assignment(id).await
}
