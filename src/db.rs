use sqlx::mysql::{MySqlPool, MySqlPoolOptions, MySqlQueryResult};
use std::time::Duration;

use crate::utils::error::{AppError, AppResult};

// Database connection manager
pub struct Database {
    pub pool: MySqlPool,
}

impl Database {
    // Create a new database connection pool
    pub async fn new(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = MySqlPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(Duration::from_secs(3))
            .connect(database_url)
            .await?;

        Ok(Database { pool })
    }

    // Get a reference to the connection pool
    pub fn get_pool(&self) -> &MySqlPool {
        &self.pool
    }
}

/// Id of the row an INSERT just created. Tables use `INT` keys.
pub fn inserted_id(result: &MySqlQueryResult) -> AppResult<i32> {
    id_from(result.last_insert_id())
}

fn id_from(raw: u64) -> AppResult<i32> {
    i32::try_from(raw)
        .map_err(|_| AppError::DatabaseError(format!("Inserted id {} is out of range", raw)))
}

/// `LIKE` pattern matching `term` anywhere, with the wildcards in `term`
/// taken literally.
pub fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

// Tables in dependency order. Payments point at their owner through
// (item_kind, item_object_id) and therefore carry no foreign key.
const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS staff (
        id INT AUTO_INCREMENT PRIMARY KEY,
        username VARCHAR(150) NOT NULL,
        password VARCHAR(255) NOT NULL,
        CONSTRAINT staff_username_uindex UNIQUE (username)
    )",
    "CREATE TABLE IF NOT EXISTS place (
        id INT AUTO_INCREMENT PRIMARY KEY,
        name VARCHAR(200) NOT NULL,
        CONSTRAINT place_name_uindex UNIQUE (name)
    )",
    "CREATE TABLE IF NOT EXISTS vehicle_feature (
        id INT AUTO_INCREMENT PRIMARY KEY,
        name VARCHAR(100) NOT NULL,
        CONSTRAINT vehicle_feature_name_uindex UNIQUE (name)
    )",
    "CREATE TABLE IF NOT EXISTS vehicle_rate_category (
        id INT AUTO_INCREMENT PRIMARY KEY,
        name VARCHAR(100) NOT NULL,
        tariff_per_km DECIMAL(10,2) NOT NULL,
        tariff_after_hours DECIMAL(10,2) NOT NULL,
        CONSTRAINT vehicle_rate_category_name_uindex UNIQUE (name)
    )",
    "CREATE TABLE IF NOT EXISTS vehicle_rate_category_feature (
        rate_category_id INT NOT NULL,
        feature_id INT NOT NULL,
        PRIMARY KEY (rate_category_id, feature_id),
        CONSTRAINT vrcf_rate_category_fk
            FOREIGN KEY (rate_category_id) REFERENCES vehicle_rate_category(id)
            ON DELETE CASCADE,
        CONSTRAINT vrcf_feature_fk
            FOREIGN KEY (feature_id) REFERENCES vehicle_feature(id)
            ON DELETE CASCADE
    )",
    "CREATE TABLE IF NOT EXISTS vehicle_category (
        id INT AUTO_INCREMENT PRIMARY KEY,
        name VARCHAR(100) NOT NULL,
        CONSTRAINT vehicle_category_name_uindex UNIQUE (name)
    )",
    "CREATE TABLE IF NOT EXISTS driver (
        id INT AUTO_INCREMENT PRIMARY KEY,
        name VARCHAR(100) NOT NULL,
        mobile VARCHAR(15) NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS vehicle (
        id INT AUTO_INCREMENT PRIMARY KEY,
        name VARCHAR(100) NOT NULL,
        number VARCHAR(20) NOT NULL,
        category_id INT NOT NULL,
        driver_id INT NULL,
        CONSTRAINT vehicle_number_uindex UNIQUE (number),
        CONSTRAINT vehicle_category_fk
            FOREIGN KEY (category_id) REFERENCES vehicle_category(id),
        CONSTRAINT vehicle_driver_fk
            FOREIGN KEY (driver_id) REFERENCES driver(id)
            ON DELETE SET NULL
    )",
    "CREATE TABLE IF NOT EXISTS rate (
        id INT AUTO_INCREMENT PRIMARY KEY,
        source_id INT NOT NULL,
        destination_id INT NOT NULL,
        vehicle_category_id INT NOT NULL,
        oneway_price DECIMAL(10,2) NOT NULL,
        roundtrip_price DECIMAL(10,2) NOT NULL,
        CONSTRAINT rate_route_uindex UNIQUE (source_id, destination_id, vehicle_category_id),
        CONSTRAINT rate_source_fk FOREIGN KEY (source_id) REFERENCES place(id) ON DELETE CASCADE,
        CONSTRAINT rate_destination_fk FOREIGN KEY (destination_id) REFERENCES place(id) ON DELETE CASCADE,
        CONSTRAINT rate_vehicle_category_fk
            FOREIGN KEY (vehicle_category_id) REFERENCES vehicle_category(id)
            ON DELETE CASCADE
    )",
    "CREATE TABLE IF NOT EXISTS booking (
        id INT AUTO_INCREMENT PRIMARY KEY,
        booking_id VARCHAR(20) NOT NULL,
        customer_name VARCHAR(100) NOT NULL,
        customer_mobile VARCHAR(15) NULL,
        customer_email VARCHAR(254) NULL,
        source_id INT NOT NULL,
        destination_id INT NOT NULL,
        travel_date DATE NOT NULL,
        travel_time TIME NOT NULL,
        pickup_point VARCHAR(200) NULL,
        ssr TEXT NULL,
        passengers INT NOT NULL DEFAULT 1,
        distance INT NULL,
        booking_type CHAR(2) NOT NULL,
        vehicle_type_id INT NOT NULL,
        vehicle_count INT NOT NULL DEFAULT 1,
        status CHAR(1) NOT NULL DEFAULT '0',
        total_fare DECIMAL(10,2) NOT NULL DEFAULT 0.00,
        payment_done DECIMAL(10,2) NOT NULL DEFAULT 0.00,
        payment_due DECIMAL(10,2) NOT NULL DEFAULT 0.00,
        payment_status CHAR(2) NOT NULL DEFAULT 'NP',
        fare_details TEXT NULL,
        last_payment_date DATETIME NULL,
        accounts_verified BOOLEAN NOT NULL DEFAULT FALSE,
        created DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
        last_updated DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP,
        CONSTRAINT booking_booking_id_uindex UNIQUE (booking_id),
        CONSTRAINT booking_source_fk FOREIGN KEY (source_id) REFERENCES place(id),
        CONSTRAINT booking_destination_fk FOREIGN KEY (destination_id) REFERENCES place(id),
        CONSTRAINT booking_vehicle_type_fk
            FOREIGN KEY (vehicle_type_id) REFERENCES vehicle_category(id)
    )",
    "CREATE TABLE IF NOT EXISTS booking_vehicle (
        id INT AUTO_INCREMENT PRIMARY KEY,
        booking_id INT NOT NULL,
        vehicle_id INT NULL,
        driver_id INT NULL,
        extra_info TEXT NULL,
        CONSTRAINT booking_vehicle_booking_fk
            FOREIGN KEY (booking_id) REFERENCES booking(id)
            ON DELETE CASCADE,
        CONSTRAINT booking_vehicle_vehicle_fk
            FOREIGN KEY (vehicle_id) REFERENCES vehicle(id)
            ON DELETE SET NULL,
        CONSTRAINT booking_vehicle_driver_fk
            FOREIGN KEY (driver_id) REFERENCES driver(id)
            ON DELETE SET NULL
    )",
    "CREATE TABLE IF NOT EXISTS payment (
        id INT AUTO_INCREMENT PRIMARY KEY,
        item_kind VARCHAR(20) NOT NULL,
        item_object_id INT NOT NULL,
        amount DECIMAL(10,2) NOT NULL,
        type VARCHAR(50) NOT NULL,
        mode VARCHAR(50) NOT NULL,
        reference_id VARCHAR(100) NULL,
        comment VARCHAR(500) NULL,
        invoice_id VARCHAR(40) NOT NULL,
        timestamp DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
        details TEXT NULL,
        status CHAR(3) NULL,
        CONSTRAINT payment_invoice_id_uindex UNIQUE (invoice_id),
        INDEX payment_owner_index (item_kind, item_object_id)
    )",
];

// Create every table that does not exist yet
pub async fn init_schema(pool: &MySqlPool) -> Result<(), sqlx::Error> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    tracing::info!(tables = SCHEMA.len(), "schema ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inserted_ids_must_fit_the_key_column() {
        assert_eq!(id_from(42).unwrap(), 42);
        assert_eq!(id_from(i32::MAX as u64).unwrap(), i32::MAX);
        assert!(matches!(
            id_from(i32::MAX as u64 + 1),
            Err(AppError::DatabaseError(_))
        ));
    }

    #[test]
    fn search_wildcards_are_matched_literally() {
        assert_eq!(contains_pattern("BK12"), "%BK12%");
        assert_eq!(contains_pattern("100%"), "%100\\%%");
        assert_eq!(contains_pattern("a_b"), "%a\\_b%");
        assert_eq!(contains_pattern(r"c:\x"), r"%c:\\x%");
    }
}
