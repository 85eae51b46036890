use rand::distributions::Alphanumeric;
use rand::Rng;
use rust_decimal::Decimal;
use sqlx::mysql::MySqlConnection;
use sqlx::{MySql, MySqlPool, QueryBuilder};
use validator::Validate;

use crate::db::{contains_pattern, inserted_id};
use crate::models::booking::{
    take_blank, AccountView, BookingFilter, BookingListRow, BookingPaymentStatus, BookingRecord,
    BookingStatus, BookingType, BookingView, CodedChoice, CreateBookingRequest,
    CreateBookingResponse, UpdateBookingRequest,
};
use crate::models::booking_vehicle::BookingVehicleView;
use crate::models::place::Rate;
use crate::services::lifecycle::{booking_status_event, CustomerContact};
use crate::services::notification_service::{DispatchReport, NotificationDispatcher};
use crate::utils::error::{AppError, AppResult};

pub(crate) const BOOKING_SELECT: &str = r#"
    SELECT b.*,
        s.name AS source_name,
        d.name AS destination_name,
        vc.name AS vehicle_type_name
    FROM booking b
    JOIN place s ON s.id = b.source_id
    JOIN place d ON d.id = b.destination_id
    JOIN vehicle_category vc ON vc.id = b.vehicle_type_id
"#;

// Bookings matching a filter, newest first
pub(crate) async fn fetch_booking_rows(
    pool: &MySqlPool,
    filter: &BookingFilter,
) -> AppResult<Vec<BookingListRow>> {
    let mut query: QueryBuilder<MySql> = QueryBuilder::new(BOOKING_SELECT);
    query.push(" WHERE 1 = 1");

    if let Some(booking_type) = filter.booking_type {
        query.push(" AND b.booking_type = ").push_bind(booking_type.code().to_string());
    }
    if let Some(status) = filter.status {
        query.push(" AND b.status = ").push_bind(status.code().to_string());
    }
    if let Some(payment_status) = filter.payment_status {
        query.push(" AND b.payment_status = ").push_bind(payment_status.code().to_string());
    }
    if let Some(travel_date) = filter.travel_date {
        query.push(" AND b.travel_date = ").push_bind(travel_date);
    }
    if let Some(term) = filter.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        let pattern = contains_pattern(term);
        query
            .push(" AND (b.booking_id LIKE ")
            .push_bind(pattern.clone())
            .push(" OR b.customer_name LIKE ")
            .push_bind(pattern.clone())
            .push(" OR b.customer_mobile LIKE ")
            .push_bind(pattern)
            .push(")");
    }
    query.push(" ORDER BY b.created DESC, b.id DESC");

    let rows = query
        .build_query_as::<BookingListRow>()
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub(crate) async fn fetch_booking_row(pool: &MySqlPool, booking_ref: &str) -> AppResult<BookingListRow> {
    sqlx::query_as::<_, BookingListRow>(&format!("{} WHERE b.booking_id = ?", BOOKING_SELECT))
        .bind(booking_ref)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Booking {} not found", booking_ref)))
}

pub(crate) async fn fetch_assignments(
    pool: &MySqlPool,
    booking_pk: i32,
) -> AppResult<Vec<BookingVehicleView>> {
    let rows = sqlx::query_as::<_, BookingVehicleView>(
        r#"
        SELECT bv.id, bv.vehicle_id,
            v.name AS vehicle_name, v.number AS vehicle_number,
            bv.driver_id,
            d.name AS driver_name, d.mobile AS driver_mobile,
            bv.extra_info
        FROM booking_vehicle bv
        LEFT JOIN vehicle v ON v.id = bv.vehicle_id
        LEFT JOIN driver d ON d.id = bv.driver_id
        WHERE bv.booking_id = ?
        ORDER BY bv.id
        "#,
    )
    .bind(booking_pk)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Primary key of a booking from its human-readable id.
pub async fn booking_pk(pool: &MySqlPool, booking_ref: &str) -> AppResult<i32> {
    let id: Option<i32> = sqlx::query_scalar("SELECT id FROM booking WHERE booking_id = ?")
        .bind(booking_ref)
        .fetch_optional(pool)
        .await?;
    id.ok_or_else(|| AppError::NotFound(format!("Booking {} not found", booking_ref)))
}

async fn lock_booking(conn: &mut MySqlConnection, booking_ref: &str) -> AppResult<BookingRecord> {
    sqlx::query_as::<_, BookingRecord>("SELECT * FROM booking WHERE booking_id = ? FOR UPDATE")
        .bind(booking_ref)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Booking {} not found", booking_ref)))
}

async fn place_exists(conn: &mut MySqlConnection, id: i32) -> AppResult<()> {
    let found: Option<i32> = sqlx::query_scalar("SELECT id FROM place WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    found
        .map(|_| ())
        .ok_or_else(|| AppError::NotFound(format!("Place {} not found", id)))
}

async fn vehicle_category_exists(conn: &mut MySqlConnection, id: i32) -> AppResult<()> {
    let found: Option<i32> = sqlx::query_scalar("SELECT id FROM vehicle_category WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    found
        .map(|_| ())
        .ok_or_else(|| AppError::NotFound(format!("Vehicle category {} not found", id)))
}

async fn route_rate(
    conn: &mut MySqlConnection,
    source_id: i32,
    destination_id: i32,
    vehicle_category_id: i32,
) -> AppResult<Rate> {
    sqlx::query_as::<_, Rate>(
        r#"
        SELECT id, source_id, destination_id, vehicle_category_id, oneway_price, roundtrip_price
        FROM rate
        WHERE source_id = ? AND destination_id = ? AND vehicle_category_id = ?
        "#,
    )
    .bind(source_id)
    .bind(destination_id)
    .bind(vehicle_category_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| AppError::Unprocessable("No rate defined for this route".into()))
}

fn check_fare(fare: Decimal) -> AppResult<Decimal> {
    if fare.is_sign_negative() {
        return Err(AppError::ValidationError("total_fare: must not be negative".into()));
    }
    Ok(fare)
}

pub fn generate_booking_id() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect();
    format!("BK{}", suffix.to_uppercase())
}

fn contact_of(record: &BookingRecord) -> CustomerContact {
    CustomerContact {
        name: record.customer_name.clone(),
        mobile: record.customer_mobile.clone(),
        email: record.customer_email.clone(),
    }
}

#[derive(Clone)]
pub struct BookingService {
    pool: MySqlPool,
    dispatcher: NotificationDispatcher,
}

impl BookingService {
    pub fn new(pool: MySqlPool, dispatcher: NotificationDispatcher) -> Self {
        BookingService { pool, dispatcher }
    }

    pub async fn create_booking(&self, request: CreateBookingRequest) -> AppResult<CreateBookingResponse> {
        request.validate()?;
        if request.source_id == request.destination_id {
            return Err(AppError::BadRequest("Source and destination must differ".into()));
        }
        let mut conn = self.pool.acquire().await?;
        place_exists(&mut *conn, request.source_id).await?;
        place_exists(&mut *conn, request.destination_id).await?;
        vehicle_category_exists(&mut *conn, request.vehicle_type_id).await?;

        // Fare from the route rate, unless the request names one
        let total_fare = match request.total_fare {
            Some(fare) => check_fare(fare)?,
            None => route_rate(
                &mut *conn,
                request.source_id,
                request.destination_id,
                request.vehicle_type_id,
            )
            .await?
            .fare(request.booking_type, request.vehicle_count),
        };
        let booking_id = generate_booking_id();
        let status = BookingStatus::Pending;

        let result = sqlx::query(
            r#"
            INSERT INTO booking (
                booking_id, customer_name, customer_mobile, customer_email,
                source_id, destination_id, travel_date, travel_time,
                pickup_point, ssr, passengers, distance,
                booking_type, vehicle_type_id, vehicle_count, status,
                total_fare, payment_done, payment_due, payment_status, fare_details
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0, ?, ?, ?)
            "#,
        )
        .bind(&booking_id)
        .bind(&request.customer_name)
        .bind(&request.customer_mobile)
        .bind(&request.customer_email)
        .bind(request.source_id)
        .bind(request.destination_id)
        .bind(request.travel_date)
        .bind(request.travel_time)
        .bind(&request.pickup_point)
        .bind(&request.ssr)
        .bind(request.passengers)
        .bind(request.distance)
        .bind(request.booking_type.code())
        .bind(request.vehicle_type_id)
        .bind(request.vehicle_count)
        .bind(status.code())
        .bind(total_fare)
        .bind(total_fare)
        .bind(BookingPaymentStatus::NotPaid.code())
        .bind(&request.fare_details)
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::on_insert(e, "Booking"))?;

        let id = inserted_id(&result)?;
        tracing::info!(booking = %booking_id, id, %total_fare, "booking created");

        Ok(CreateBookingResponse {
            id,
            booking_id,
            total_fare,
            status: status.label().to_string(),
        })
    }

    pub async fn get_booking(&self, booking_ref: &str) -> AppResult<BookingView> {
        let row = fetch_booking_row(&self.pool, booking_ref).await?;
        let assignments = fetch_assignments(&self.pool, row.record.id).await?;
        Ok(BookingView::new(row, &assignments))
    }

    pub async fn list_bookings(&self, filter: BookingFilter) -> AppResult<Vec<BookingView>> {
        let rows = fetch_booking_rows(&self.pool, &filter).await?;
        let mut bookings = Vec::with_capacity(rows.len());
        for row in rows {
            let assignments = fetch_assignments(&self.pool, row.record.id).await?;
            bookings.push(BookingView::new(row, &assignments));
        }
        Ok(bookings)
    }

    /// Apply a partial update. A status change notifies the customer once the
    /// update is committed.
    pub async fn update_booking(
        &self,
        booking_ref: &str,
        mut request: UpdateBookingRequest,
    ) -> AppResult<(BookingView, DispatchReport)> {
        let clear_mobile = take_blank(&mut request.customer_mobile);
        let clear_email = take_blank(&mut request.customer_email);
        request.validate()?;
        if let Some(fare) = request.total_fare {
            check_fare(fare)?;
        }

        let mut tx = self.pool.begin().await?;
        let before = lock_booking(&mut *tx, booking_ref).await?;

        let mut after = before.clone();
        if let Some(v) = request.customer_name {
            after.customer_name = v;
        }
        if clear_mobile {
            after.customer_mobile = None;
        } else if let Some(v) = request.customer_mobile {
            after.customer_mobile = Some(v);
        }
        if clear_email {
            after.customer_email = None;
        } else if let Some(v) = request.customer_email {
            after.customer_email = Some(v);
        }
        if let Some(v) = request.source_id {
            after.source_id = v;
        }
        if let Some(v) = request.destination_id {
            after.destination_id = v;
        }
        if let Some(v) = request.booking_type {
            after.booking_type = v.code().to_string();
        }
        if let Some(v) = request.vehicle_type_id {
            after.vehicle_type_id = v;
        }
        if let Some(v) = request.travel_date {
            after.travel_date = v;
        }
        if let Some(v) = request.travel_time {
            after.travel_time = v;
        }
        if let Some(v) = request.pickup_point {
            after.pickup_point = Some(v);
        }
        if let Some(v) = request.ssr {
            after.ssr = Some(v);
        }
        if let Some(v) = request.passengers {
            after.passengers = v;
        }
        if let Some(v) = request.distance {
            after.distance = Some(v);
        }
        if let Some(v) = request.vehicle_count {
            after.vehicle_count = v;
        }
        if let Some(v) = request.fare_details {
            after.fare_details = Some(v);
        }
        if let Some(status) = request.status {
            after.status = status.code().to_string();
        }

        if after.source_id == after.destination_id {
            return Err(AppError::BadRequest("Source and destination must differ".into()));
        }
        if after.source_id != before.source_id {
            place_exists(&mut *tx, after.source_id).await?;
        }
        if after.destination_id != before.destination_id {
            place_exists(&mut *tx, after.destination_id).await?;
        }
        if after.vehicle_type_id != before.vehicle_type_id {
            vehicle_category_exists(&mut *tx, after.vehicle_type_id).await?;
        }

        let pricing_changed = after.source_id != before.source_id
            || after.destination_id != before.destination_id
            || after.booking_type != before.booking_type
            || after.vehicle_type_id != before.vehicle_type_id
            || after.vehicle_count != before.vehicle_count;
        if let Some(fare) = request.total_fare {
            after.total_fare = fare;
        } else if pricing_changed {
            let booking_type = BookingType::from_code(&after.booking_type).ok_or_else(|| {
                AppError::Unprocessable(format!("Booking type {} cannot be priced", after.booking_type))
            })?;
            let rate = route_rate(
                &mut *tx,
                after.source_id,
                after.destination_id,
                after.vehicle_type_id,
            )
            .await?;
            after.total_fare = rate.fare(booking_type, after.vehicle_count);
            tracing::info!(booking = %after.booking_id, from = %before.total_fare, to = %after.total_fare, "booking repriced");
        }
        after.payment_due = after.total_fare - after.payment_done;
        after.payment_status = BookingPaymentStatus::for_amounts(after.total_fare, after.payment_done)
            .code()
            .to_string();

        sqlx::query(
            r#"
            UPDATE booking
            SET customer_name = ?, customer_mobile = ?, customer_email = ?,
                source_id = ?, destination_id = ?, booking_type = ?, vehicle_type_id = ?,
                travel_date = ?, travel_time = ?, pickup_point = ?, ssr = ?,
                passengers = ?, distance = ?, vehicle_count = ?, fare_details = ?,
                status = ?, total_fare = ?, payment_due = ?, payment_status = ?
            WHERE id = ?
            "#,
        )
        .bind(&after.customer_name)
        .bind(&after.customer_mobile)
        .bind(&after.customer_email)
        .bind(after.source_id)
        .bind(after.destination_id)
        .bind(&after.booking_type)
        .bind(after.vehicle_type_id)
        .bind(after.travel_date)
        .bind(after.travel_time)
        .bind(&after.pickup_point)
        .bind(&after.ssr)
        .bind(after.passengers)
        .bind(after.distance)
        .bind(after.vehicle_count)
        .bind(&after.fare_details)
        .bind(&after.status)
        .bind(after.total_fare)
        .bind(after.payment_due)
        .bind(&after.payment_status)
        .bind(after.id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        let status_changed = before.status != after.status;
        if status_changed {
            tracing::info!(booking = %after.booking_id, from = %before.status, to = %after.status, "booking status changed");
        }

        let events: Vec<_> = booking_status_event(
            &after.booking_id,
            &after.status,
            status_changed,
            contact_of(&after),
        )
        .into_iter()
        .collect();
        let report = self.dispatcher.dispatch(&events).await;

        let view = self.get_booking(booking_ref).await?;
        Ok((view, report))
    }

    // Payments have no foreign key to their booking, remove them explicitly
    pub async fn delete_booking(&self, booking_ref: &str) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;
        let record = lock_booking(&mut *tx, booking_ref).await?;

        let payments = sqlx::query("DELETE FROM payment WHERE item_kind = 'booking' AND item_object_id = ?")
            .bind(record.id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM booking WHERE id = ?")
            .bind(record.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::info!(booking = %booking_ref, payments = payments.rows_affected(), "booking deleted");
        Ok(())
    }

    pub async fn list_accounts(
        &self,
        accounts_verified: Option<bool>,
        search: Option<String>,
    ) -> AppResult<Vec<AccountView>> {
        let mut query: QueryBuilder<MySql> = QueryBuilder::new(
            "SELECT booking_id, accounts_verified, payment_status, payment_done, payment_due, last_payment_date \
             FROM booking WHERE 1 = 1",
        );
        if let Some(verified) = accounts_verified {
            query.push(" AND accounts_verified = ").push_bind(verified);
        }
        if let Some(term) = search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            query.push(" AND booking_id LIKE ").push_bind(contains_pattern(term));
        }
        query.push(" ORDER BY last_updated DESC, id DESC");

        let mut accounts = query.build_query_as::<AccountView>().fetch_all(&self.pool).await?;
        for account in accounts.iter_mut() {
            account.payment_status = BookingPaymentStatus::label_for(&account.payment_status);
        }
        Ok(accounts)
    }

    pub async fn set_accounts_verified(&self, booking_ref: &str, verified: bool) -> AppResult<()> {
        let result = sqlx::query("UPDATE booking SET accounts_verified = ? WHERE booking_id = ?")
            .bind(verified)
            .bind(booking_ref)
            .execute(&self.pool)
            .await?;

        // MySQL reports 0 affected rows when the value is unchanged
        if result.rows_affected() == 0 {
            booking_pk(&self.pool, booking_ref).await?;
        }
        tracing::info!(booking = %booking_ref, verified, "accounts verification updated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_booking_ids_are_prefixed_and_uppercase() {
        let id = generate_booking_id();
        assert_eq!(id.len(), 10);
        assert!(id.starts_with("BK"));
        assert!(id.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[test]
    fn generated_booking_ids_differ() {
        assert_ne!(generate_booking_id(), generate_booking_id());
    }
}
