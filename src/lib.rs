#[macro_use]
extern crate rocket;
extern crate rocket_okapi;

pub mod config;
pub mod db;
pub mod models;
pub mod routes;
pub mod services;
pub mod swagger;
pub mod utils;

use std::sync::Arc;

use rocket::fairing::AdHoc;
use rocket::{Build, Rocket};
use rocket_okapi::openapi_get_routes;
use rocket_okapi::swagger_ui::make_swagger_ui;
use sqlx::MySqlPool;

use crate::config::AppConfig;
use crate::services::booking_service::BookingService;
use crate::services::booking_vehicle_service::BookingVehicleService;
use crate::services::export_service::ExportService;
use crate::services::notification_service::NotificationDispatcher;
use crate::services::payment_service::PaymentService;
use crate::services::reference_service::ReferenceService;
use crate::services::staff_service::StaffService;
use crate::swagger::swagger_ui;
use crate::utils::notifier::Notifier;

/// Assemble the application: services sharing one pool and one notifier,
/// the API under /api and its documentation under /swagger.
pub fn build_rocket(pool: MySqlPool, config: AppConfig, notifier: Arc<dyn Notifier>) -> Rocket<Build> {
    let dispatcher = NotificationDispatcher::new(notifier);

    let staff_service = StaffService::new(pool.clone(), config.jwt_secret.clone());
    let booking_service = BookingService::new(pool.clone(), dispatcher.clone());
    let booking_vehicle_service = BookingVehicleService::new(pool.clone(), dispatcher);
    let payment_service = PaymentService::new(pool.clone());
    let export_service = ExportService::new(pool.clone());
    let reference_service = ReferenceService::new(pool);

    rocket::build()
        .manage(config)
        .manage(staff_service)
        .manage(booking_service)
        .manage(booking_vehicle_service)
        .manage(payment_service)
        .manage(export_service)
        .manage(reference_service)
        .mount(
            "/api",
            openapi_get_routes![
                routes::staff_route::register,
                routes::staff_route::login,
                routes::booking_route::create_booking,
                routes::booking_route::list_bookings,
                routes::booking_route::export_bookings,
                routes::booking_route::get_booking,
                routes::booking_route::update_booking,
                routes::booking_route::delete_booking,
                routes::booking_vehicle_route::list_booking_vehicles,
                routes::booking_vehicle_route::add_booking_vehicle,
                routes::booking_vehicle_route::update_booking_vehicle,
                routes::booking_vehicle_route::delete_booking_vehicle,
                routes::payment_route::list_payments,
                routes::payment_route::add_payment,
                routes::payment_route::list_booking_payments,
                routes::payment_route::add_booking_payment,
                routes::payment_route::get_payment,
                routes::payment_route::update_payment,
                routes::account_route::list_accounts,
                routes::account_route::set_accounts_verified,
                routes::reference_route::create_place,
                routes::reference_route::list_places,
                routes::reference_route::delete_place,
                routes::reference_route::create_driver,
                routes::reference_route::list_drivers,
                routes::reference_route::delete_driver,
                routes::reference_route::create_vehicle_category,
                routes::reference_route::list_vehicle_categories,
                routes::reference_route::delete_vehicle_category,
                routes::reference_route::create_feature,
                routes::reference_route::list_features,
                routes::reference_route::delete_feature,
                routes::reference_route::create_rate_category,
                routes::reference_route::list_rate_categories,
                routes::reference_route::delete_rate_category,
                routes::reference_route::create_vehicle,
                routes::reference_route::list_vehicles,
                routes::reference_route::delete_vehicle,
                routes::reference_route::create_rate,
                routes::reference_route::list_rates,
                routes::reference_route::delete_rate,
            ],
        )
        .mount("/swagger", make_swagger_ui(&swagger_ui()))
        .attach(AdHoc::on_response("CORS", |_, res| {
            Box::pin(async move {
                res.set_header(rocket::http::Header::new(
                    "Access-Control-Allow-Origin",
                    "*",
                ));
            })
        }))
}
