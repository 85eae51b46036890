use rocket::serde::json::Json;
use rocket::State;
use rocket_okapi::openapi;

use crate::models::fleet::{
    Driver, DriverRequest, NamedRequest, VehicleCategory, VehicleFeature, VehicleRateCategory,
    VehicleRateCategoryRequest, VehicleRequest, VehicleView,
};
use crate::models::place::{Place, PlaceRequest, RateRequest, RateView};
use crate::services::reference_service::ReferenceService;
use crate::utils::error::AppError;
use crate::utils::jwt::AuthenticatedStaff;

#[openapi(tag = "Places")]
#[post("/places", format = "json", data = "<request>")]
pub async fn create_place(
    request: Json<PlaceRequest>,
    _auth: AuthenticatedStaff,
    service: &State<ReferenceService>,
) -> Result<Json<Place>, AppError> {
    Ok(Json(service.create_place(request.into_inner()).await?))
}

#[openapi(tag = "Places")]
#[get("/places?<search>")]
pub async fn list_places(
    search: Option<String>,
    _auth: AuthenticatedStaff,
    service: &State<ReferenceService>,
) -> Result<Json<Vec<Place>>, AppError> {
    Ok(Json(service.list_places(search.as_deref()).await?))
}

#[openapi(tag = "Places")]
#[delete("/places/<id>")]
pub async fn delete_place(
    id: i32,
    _auth: AuthenticatedStaff,
    service: &State<ReferenceService>,
) -> Result<(), AppError> {
    service.delete_place(id).await
}

#[openapi(tag = "Drivers")]
#[post("/drivers", format = "json", data = "<request>")]
pub async fn create_driver(
    request: Json<DriverRequest>,
    _auth: AuthenticatedStaff,
    service: &State<ReferenceService>,
) -> Result<Json<Driver>, AppError> {
    Ok(Json(service.create_driver(request.into_inner()).await?))
}

/// Drivers whose name or mobile matches the search term
#[openapi(tag = "Drivers")]
#[get("/drivers?<search>")]
pub async fn list_drivers(
    search: Option<String>,
    _auth: AuthenticatedStaff,
    service: &State<ReferenceService>,
) -> Result<Json<Vec<Driver>>, AppError> {
    Ok(Json(service.list_drivers(search.as_deref()).await?))
}

#[openapi(tag = "Drivers")]
#[delete("/drivers/<id>")]
pub async fn delete_driver(
    id: i32,
    _auth: AuthenticatedStaff,
    service: &State<ReferenceService>,
) -> Result<(), AppError> {
    service.delete_driver(id).await
}

#[openapi(tag = "Vehicles")]
#[post("/vehicle-categories", format = "json", data = "<request>")]
pub async fn create_vehicle_category(
    request: Json<NamedRequest>,
    _auth: AuthenticatedStaff,
    service: &State<ReferenceService>,
) -> Result<Json<VehicleCategory>, AppError> {
    Ok(Json(service.create_vehicle_category(request.into_inner()).await?))
}

#[openapi(tag = "Vehicles")]
#[get("/vehicle-categories?<search>")]
pub async fn list_vehicle_categories(
    search: Option<String>,
    _auth: AuthenticatedStaff,
    service: &State<ReferenceService>,
) -> Result<Json<Vec<VehicleCategory>>, AppError> {
    Ok(Json(service.list_vehicle_categories(search.as_deref()).await?))
}

#[openapi(tag = "Vehicles")]
#[delete("/vehicle-categories/<id>")]
pub async fn delete_vehicle_category(
    id: i32,
    _auth: AuthenticatedStaff,
    service: &State<ReferenceService>,
) -> Result<(), AppError> {
    service.delete_vehicle_category(id).await
}

#[openapi(tag = "Vehicles")]
#[post("/vehicle-features", format = "json", data = "<request>")]
pub async fn create_feature(
    request: Json<NamedRequest>,
    _auth: AuthenticatedStaff,
    service: &State<ReferenceService>,
) -> Result<Json<VehicleFeature>, AppError> {
    Ok(Json(service.create_feature(request.into_inner()).await?))
}

#[openapi(tag = "Vehicles")]
#[get("/vehicle-features?<search>")]
pub async fn list_features(
    search: Option<String>,
    _auth: AuthenticatedStaff,
    service: &State<ReferenceService>,
) -> Result<Json<Vec<VehicleFeature>>, AppError> {
    Ok(Json(service.list_features(search.as_deref()).await?))
}

#[openapi(tag = "Vehicles")]
#[delete("/vehicle-features/<id>")]
pub async fn delete_feature(
    id: i32,
    _auth: AuthenticatedStaff,
    service: &State<ReferenceService>,
) -> Result<(), AppError> {
    service.delete_feature(id).await
}

/// Create a rate category with its features
#[openapi(tag = "Vehicles")]
#[post("/rate-categories", format = "json", data = "<request>")]
pub async fn create_rate_category(
    request: Json<VehicleRateCategoryRequest>,
    _auth: AuthenticatedStaff,
    service: &State<ReferenceService>,
) -> Result<Json<VehicleRateCategory>, AppError> {
    Ok(Json(service.create_rate_category(request.into_inner()).await?))
}

#[openapi(tag = "Vehicles")]
#[get("/rate-categories?<search>&<feature_id>")]
pub async fn list_rate_categories(
    search: Option<String>,
    feature_id: Option<i32>,
    _auth: AuthenticatedStaff,
    service: &State<ReferenceService>,
) -> Result<Json<Vec<VehicleRateCategory>>, AppError> {
    Ok(Json(service.list_rate_categories(search.as_deref(), feature_id).await?))
}

#[openapi(tag = "Vehicles")]
#[delete("/rate-categories/<id>")]
pub async fn delete_rate_category(
    id: i32,
    _auth: AuthenticatedStaff,
    service: &State<ReferenceService>,
) -> Result<(), AppError> {
    service.delete_rate_category(id).await
}

#[openapi(tag = "Vehicles")]
#[post("/vehicles", format = "json", data = "<request>")]
pub async fn create_vehicle(
    request: Json<VehicleRequest>,
    _auth: AuthenticatedStaff,
    service: &State<ReferenceService>,
) -> Result<Json<VehicleView>, AppError> {
    Ok(Json(service.create_vehicle(request.into_inner()).await?))
}

/// Vehicles matching a name or number, optionally of one category
#[openapi(tag = "Vehicles")]
#[get("/vehicles?<search>&<category>")]
pub async fn list_vehicles(
    search: Option<String>,
    category: Option<String>,
    _auth: AuthenticatedStaff,
    service: &State<ReferenceService>,
) -> Result<Json<Vec<VehicleView>>, AppError> {
    let vehicles = service
        .list_vehicles(search.as_deref(), category.as_deref())
        .await?;
    Ok(Json(vehicles))
}

#[openapi(tag = "Vehicles")]
#[delete("/vehicles/<id>")]
pub async fn delete_vehicle(
    id: i32,
    _auth: AuthenticatedStaff,
    service: &State<ReferenceService>,
) -> Result<(), AppError> {
    service.delete_vehicle(id).await
}

#[openapi(tag = "Rates")]
#[post("/rates", format = "json", data = "<request>")]
pub async fn create_rate(
    request: Json<RateRequest>,
    _auth: AuthenticatedStaff,
    service: &State<ReferenceService>,
) -> Result<Json<RateView>, AppError> {
    Ok(Json(service.create_rate(request.into_inner()).await?))
}

/// Rates whose source or destination matches the search term
#[openapi(tag = "Rates")]
#[get("/rates?<search>&<vehicle_category_id>")]
pub async fn list_rates(
    search: Option<String>,
    vehicle_category_id: Option<i32>,
    _auth: AuthenticatedStaff,
    service: &State<ReferenceService>,
) -> Result<Json<Vec<RateView>>, AppError> {
    let rates = service
        .list_rates(search.as_deref(), vehicle_category_id)
        .await?;
    Ok(Json(rates))
}

#[openapi(tag = "Rates")]
#[delete("/rates/<id>")]
pub async fn delete_rate(
    id: i32,
    _auth: AuthenticatedStaff,
    service: &State<ReferenceService>,
) -> Result<(), AppError> {
    service.delete_rate(id).await
}
