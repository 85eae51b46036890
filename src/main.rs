use std::sync::Arc;

use cab_booking_system::config::AppConfig;
use cab_booking_system::db::{init_schema, Database};
use cab_booking_system::services::staff_service::StaffService;
use cab_booking_system::utils::logging::init_tracing;
use cab_booking_system::utils::notifier::{HttpNotifier, LogNotifier, Notifier};
use rocket::launch;

#[launch]
async fn rocket() -> _ {
    init_tracing();

    let config = AppConfig::from_env().expect("Invalid configuration");

    // Connect to the database
    let database = Database::new(&config.database_url)
        .await
        .expect("Failed to connect to database");
    if config.init_schema {
        init_schema(database.get_pool())
            .await
            .expect("Failed to create tables");
    }
    if let Some((username, password)) = config.admin_credentials() {
        StaffService::new(database.pool.clone(), config.jwt_secret.clone())
            .ensure_staff(username, password)
            .await
            .expect("Failed to create the admin staff account");
    }

    let notifier: Arc<dyn Notifier> = if config.has_gateway() {
        Arc::new(HttpNotifier::new(&config).expect("Failed to build notification client"))
    } else {
        tracing::warn!("no SMS or email gateway configured, notifications are only logged");
        Arc::new(LogNotifier)
    };

    cab_booking_system::build_rocket(database.pool, config, notifier)
}
