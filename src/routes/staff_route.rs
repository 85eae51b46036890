use crate::models::staff::{
    RegisterResponse, StaffLoginRequest, StaffLoginResponse, StaffRegistrationRequest,
};
use crate::services::staff_service::StaffService;
use crate::utils::error::AppError;
use crate::utils::jwt::AuthenticatedStaff;
use rocket::serde::json::Json;
use rocket::State;
use rocket_okapi::openapi;

/// Register a staff member. Only signed-in staff can add colleagues; the
/// first account comes from ADMIN_USERNAME/ADMIN_PASSWORD at startup.
#[openapi(tag = "Staff")]
#[post("/register", format = "json", data = "<request>")]
pub async fn register(
    request: Json<StaffRegistrationRequest>,
    staff_service: &State<StaffService>,
    auth: AuthenticatedStaff,
) -> Result<Json<RegisterResponse>, AppError> {
    tracing::info!(by = auth.staff_id, "staff registration");
    let staff_id = staff_service.register_staff(request.into_inner()).await?;
    Ok(Json(RegisterResponse {
        staff_id,
        status: "success".to_string(),
    }))
}

/// Login a staff member
#[openapi(tag = "Staff")]
#[post("/login", format = "json", data = "<request>")]
pub async fn login(
    request: Json<StaffLoginRequest>,
    staff_service: &State<StaffService>,
) -> Result<Json<StaffLoginResponse>, AppError> {
    let response = staff_service.login_staff(request.into_inner()).await?;
    Ok(Json(response))
}
