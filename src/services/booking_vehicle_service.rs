use sqlx::mysql::MySqlConnection;
use sqlx::MySqlPool;
use validator::Validate;

use crate::db::inserted_id;
use crate::models::booking_vehicle::{
    BookingVehicle, BookingVehicleRequest, BookingVehicleSaveResponse, BookingVehicleView,
};
use crate::services::booking_service::{booking_pk, fetch_assignments};
use crate::services::lifecycle::{
    assignment_events, assignment_notices, CustomerContact, TripDetails,
};
use crate::services::notification_service::NotificationDispatcher;
use crate::utils::error::{AppError, AppResult};

#[derive(Debug, sqlx::FromRow)]
struct TripRow {
    booking_id: String,
    customer_name: String,
    customer_mobile: Option<String>,
    customer_email: Option<String>,
    source: String,
    destination: String,
    travel_date: chrono::NaiveDate,
    travel_time: chrono::NaiveTime,
    pickup_point: Option<String>,
    vehicle_name: Option<String>,
    vehicle_number: Option<String>,
    driver_name: Option<String>,
    driver_mobile: Option<String>,
    extra_info: Option<String>,
}

impl From<TripRow> for TripDetails {
    fn from(row: TripRow) -> Self {
        let vehicle = match (row.vehicle_name, row.vehicle_number) {
            (Some(name), Some(number)) => Some(format!("{} ({})", name, number)),
            (name, number) => name.or(number),
        };

        TripDetails {
            booking_id: row.booking_id,
            customer: CustomerContact {
                name: row.customer_name,
                mobile: row.customer_mobile,
                email: row.customer_email,
            },
            source: row.source,
            destination: row.destination,
            travel_date: row.travel_date,
            travel_time: row.travel_time,
            pickup_point: row.pickup_point,
            vehicle,
            driver_name: row.driver_name,
            driver_mobile: row.driver_mobile,
            extra_info: row.extra_info,
        }
    }
}

async fn check_references(conn: &mut MySqlConnection, request: &BookingVehicleRequest) -> AppResult<()> {
    if let Some(vehicle_id) = request.vehicle_id {
        let found: Option<i32> = sqlx::query_scalar("SELECT id FROM vehicle WHERE id = ?")
            .bind(vehicle_id)
            .fetch_optional(&mut *conn)
            .await?;
        if found.is_none() {
            return Err(AppError::NotFound(format!("Vehicle {} not found", vehicle_id)));
        }
    }
    if let Some(driver_id) = request.driver_id {
        let found: Option<i32> = sqlx::query_scalar("SELECT id FROM driver WHERE id = ?")
            .bind(driver_id)
            .fetch_optional(&mut *conn)
            .await?;
        if found.is_none() {
            return Err(AppError::NotFound(format!("Driver {} not found", driver_id)));
        }
    }
    Ok(())
}

// Concurrent saves of one assignment queue here, so each sees the state the other left
async fn lock_assignment(conn: &mut MySqlConnection, assignment_id: i32) -> AppResult<BookingVehicle> {
    sqlx::query_as::<_, BookingVehicle>(
        "SELECT id, booking_id, vehicle_id, driver_id, extra_info FROM booking_vehicle WHERE id = ? FOR UPDATE",
    )
    .bind(assignment_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Booking vehicle {} not found", assignment_id)))
}

#[derive(Clone)]
pub struct BookingVehicleService {
    pool: MySqlPool,
    dispatcher: NotificationDispatcher,
}

impl BookingVehicleService {
    pub fn new(pool: MySqlPool, dispatcher: NotificationDispatcher) -> Self {
        BookingVehicleService { pool, dispatcher }
    }

    async fn trip_details(&self, assignment_id: i32) -> AppResult<TripDetails> {
        let row = sqlx::query_as::<_, TripRow>(
            r#"
            SELECT b.booking_id, b.customer_name, b.customer_mobile, b.customer_email,
                s.name AS source, d.name AS destination,
                b.travel_date, b.travel_time, b.pickup_point,
                v.name AS vehicle_name, v.number AS vehicle_number,
                dr.name AS driver_name, dr.mobile AS driver_mobile,
                bv.extra_info
            FROM booking_vehicle bv
            JOIN booking b ON b.id = bv.booking_id
            JOIN place s ON s.id = b.source_id
            JOIN place d ON d.id = b.destination_id
            LEFT JOIN vehicle v ON v.id = bv.vehicle_id
            LEFT JOIN driver dr ON dr.id = bv.driver_id
            WHERE bv.id = ?
            "#,
        )
        .bind(assignment_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    // Notify whoever the save concerns; never fails the save itself
    async fn notify(
        &self,
        previous: Option<&BookingVehicle>,
        current: &BookingVehicle,
    ) -> AppResult<BookingVehicleSaveResponse> {
        let notices = assignment_notices(previous, current);
        let mut response = BookingVehicleSaveResponse {
            id: current.id,
            notifications_sent: 0,
            notifications_failed: 0,
        };
        if !notices.customer && !notices.driver {
            return Ok(response);
        }

        let trip = match self.trip_details(current.id).await {
            Ok(trip) => trip,
            Err(err) => {
                tracing::warn!(assignment = current.id, error = %err, "trip details unavailable, notifications skipped");
                return Ok(response);
            }
        };
        let report = self
            .dispatcher
            .dispatch(&assignment_events(notices, trip))
            .await;

        response.notifications_sent = report.sent;
        response.notifications_failed = report.failed;
        Ok(response)
    }

    pub async fn list_assignments(&self, booking_ref: &str) -> AppResult<Vec<BookingVehicleView>> {
        let booking = booking_pk(&self.pool, booking_ref).await?;
        fetch_assignments(&self.pool, booking).await
    }

    pub async fn add_assignment(
        &self,
        booking_ref: &str,
        request: BookingVehicleRequest,
    ) -> AppResult<BookingVehicleSaveResponse> {
        request.validate()?;
        let booking = booking_pk(&self.pool, booking_ref).await?;
        let mut conn = self.pool.acquire().await?;
        check_references(&mut *conn, &request).await?;

        let result = sqlx::query(
            "INSERT INTO booking_vehicle (booking_id, vehicle_id, driver_id, extra_info) VALUES (?, ?, ?, ?)",
        )
        .bind(booking)
        .bind(request.vehicle_id)
        .bind(request.driver_id)
        .bind(&request.extra_info)
        .execute(&mut *conn)
        .await?;
        drop(conn);

        let created = BookingVehicle {
            id: inserted_id(&result)?,
            booking_id: booking,
            vehicle_id: request.vehicle_id,
            driver_id: request.driver_id,
            extra_info: request.extra_info,
        };
        tracing::info!(booking = %booking_ref, assignment = created.id, "vehicle assignment added");

        self.notify(None, &created).await
    }

    /// Replace vehicle, driver and extra info of an assignment.
    pub async fn update_assignment(
        &self,
        assignment_id: i32,
        request: BookingVehicleRequest,
    ) -> AppResult<BookingVehicleSaveResponse> {
        request.validate()?;
        let mut tx = self.pool.begin().await?;
        let previous = lock_assignment(&mut *tx, assignment_id).await?;
        check_references(&mut *tx, &request).await?;

        sqlx::query("UPDATE booking_vehicle SET vehicle_id = ?, driver_id = ?, extra_info = ? WHERE id = ?")
            .bind(request.vehicle_id)
            .bind(request.driver_id)
            .bind(&request.extra_info)
            .bind(assignment_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        let current = BookingVehicle {
            id: previous.id,
            booking_id: previous.booking_id,
            vehicle_id: request.vehicle_id,
            driver_id: request.driver_id,
            extra_info: request.extra_info,
        };
        tracing::info!(assignment = assignment_id, "vehicle assignment updated");

        self.notify(Some(&previous), &current).await
    }

    pub async fn delete_assignment(&self, assignment_id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM booking_vehicle WHERE id = ?")
            .bind(assignment_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Booking vehicle {} not found", assignment_id)));
        }
        tracing::info!(assignment = assignment_id, "vehicle assignment removed");
        Ok(())
    }
}
