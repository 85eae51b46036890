use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::EnumMessage;
use strum_macros::{AsRefStr, EnumIter, EnumMessage, EnumString};
use validator::Validate;

use crate::models::booking_vehicle::BookingVehicleView;

// Booking status, stored as a one-character code
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema,
    EnumString, AsRefStr, EnumIter, EnumMessage,
)]
pub enum BookingStatus {
    #[strum(serialize = "0", message = "Pending")]
    Pending,
    #[strum(serialize = "1", message = "Confirmed")]
    Confirmed,
    #[strum(serialize = "2", message = "Declined")]
    Declined,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema,
    EnumString, AsRefStr, EnumIter, EnumMessage,
)]
pub enum BookingType {
    #[strum(serialize = "OW", message = "One way")]
    OneWay,
    #[strum(serialize = "RT", message = "Round trip")]
    RoundTrip,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema,
    EnumString, AsRefStr, EnumIter, EnumMessage,
)]
pub enum BookingPaymentStatus {
    #[strum(serialize = "NP", message = "Not paid")]
    NotPaid,
    #[strum(serialize = "PP", message = "Partially paid")]
    PartiallyPaid,
    #[strum(serialize = "PD", message = "Paid")]
    Paid,
}

/// Code/label conversions shared by the enumerated booking columns.
pub trait CodedChoice: Sized + AsRef<str> + EnumMessage + std::str::FromStr {
    fn code(&self) -> &str {
        self.as_ref()
    }

    fn label(&self) -> &'static str {
        self.get_message().unwrap_or("")
    }

    fn from_code(code: &str) -> Option<Self> {
        code.trim().parse().ok()
    }

    /// Label for a stored code; unknown codes are shown as-is.
    fn label_for(code: &str) -> String {
        Self::from_code(code)
            .map(|choice| choice.label().to_string())
            .unwrap_or_else(|| code.to_string())
    }
}

impl CodedChoice for BookingStatus {}
impl CodedChoice for BookingType {}
impl CodedChoice for BookingPaymentStatus {}

impl BookingPaymentStatus {
    pub fn for_amounts(total_fare: Decimal, payment_done: Decimal) -> Self {
        if payment_done <= Decimal::ZERO {
            BookingPaymentStatus::NotPaid
        } else if payment_done < total_fare {
            BookingPaymentStatus::PartiallyPaid
        } else {
            BookingPaymentStatus::Paid
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BookingRecord {
    pub id: i32,
    pub booking_id: String,
    pub customer_name: String,
    pub customer_mobile: Option<String>,
    pub customer_email: Option<String>,
    pub source_id: i32,
    pub destination_id: i32,
    pub travel_date: NaiveDate,
    pub travel_time: NaiveTime,
    pub pickup_point: Option<String>,
    pub ssr: Option<String>,
    pub passengers: i32,
    pub distance: Option<i32>,
    pub booking_type: String,
    pub vehicle_type_id: i32,
    pub vehicle_count: i32,
    pub status: String,
    pub total_fare: Decimal,
    pub payment_done: Decimal,
    pub payment_due: Decimal,
    pub payment_status: String,
    pub fare_details: Option<String>,
    pub last_payment_date: Option<NaiveDateTime>,
    pub accounts_verified: bool,
    pub created: NaiveDateTime,
    pub last_updated: NaiveDateTime,
}

impl BookingRecord {
    pub fn status(&self) -> Option<BookingStatus> {
        BookingStatus::from_code(&self.status)
    }
}

// Booking joined with the display names of its lookups
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BookingListRow {
    #[sqlx(flatten)]
    pub record: BookingRecord,
    pub source_name: String,
    pub destination_name: String,
    pub vehicle_type_name: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema, Validate)]
pub struct CreateBookingRequest {
    #[validate(length(min = 1, max = 100))]
    pub customer_name: String,
    #[validate(length(min = 10, max = 15))]
    pub customer_mobile: Option<String>,
    #[validate(email)]
    pub customer_email: Option<String>,
    pub source_id: i32,
    pub destination_id: i32,
    pub travel_date: NaiveDate,
    pub travel_time: NaiveTime,
    #[validate(length(max = 200))]
    pub pickup_point: Option<String>,
    pub ssr: Option<String>,
    #[validate(range(min = 1, max = 100))]
    pub passengers: i32,
    #[validate(range(min = 0))]
    pub distance: Option<i32>,
    pub booking_type: BookingType,
    pub vehicle_type_id: i32,
    #[validate(range(min = 1, max = 50))]
    pub vehicle_count: i32,
    pub fare_details: Option<String>,
    /// Overrides the fare computed from the route rate
    pub total_fare: Option<Decimal>,
}

/// Partial booking update. An empty `customer_mobile` or `customer_email`
/// clears that contact. Changing the route, trip type, vehicle category or
/// vehicle count reprices the booking unless `total_fare` is given.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema, Validate)]
pub struct UpdateBookingRequest {
    #[validate(length(min = 1, max = 100))]
    pub customer_name: Option<String>,
    #[validate(length(min = 10, max = 15))]
    pub customer_mobile: Option<String>,
    #[validate(email)]
    pub customer_email: Option<String>,
    pub source_id: Option<i32>,
    pub destination_id: Option<i32>,
    pub booking_type: Option<BookingType>,
    pub vehicle_type_id: Option<i32>,
    pub travel_date: Option<NaiveDate>,
    pub travel_time: Option<NaiveTime>,
    #[validate(length(max = 200))]
    pub pickup_point: Option<String>,
    pub ssr: Option<String>,
    #[validate(range(min = 1, max = 100))]
    pub passengers: Option<i32>,
    #[validate(range(min = 0))]
    pub distance: Option<i32>,
    #[validate(range(min = 1, max = 50))]
    pub vehicle_count: Option<i32>,
    pub status: Option<BookingStatus>,
    pub total_fare: Option<Decimal>,
    pub fare_details: Option<String>,
}

/// Turns a blank value into `None`, reporting whether it did.
pub fn take_blank(value: &mut Option<String>) -> bool {
    if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
        *value = None;
        return true;
    }
    false
}

#[derive(Debug, Clone, Default)]
pub struct BookingFilter {
    pub booking_type: Option<BookingType>,
    pub status: Option<BookingStatus>,
    pub payment_status: Option<BookingPaymentStatus>,
    pub travel_date: Option<NaiveDate>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct BookingView {
    pub id: i32,
    pub booking_id: String,
    pub customer_name: String,
    pub customer_mobile: Option<String>,
    pub customer_email: Option<String>,
    pub source: String,
    pub destination: String,
    pub travel_date: NaiveDate,
    pub travel_time: NaiveTime,
    pub pickup_point: Option<String>,
    pub ssr: Option<String>,
    pub passengers: i32,
    pub distance: Option<i32>,
    pub booking_type: String,
    pub vehicle_type: String,
    pub vehicle_count: i32,
    pub vehicles: String,
    pub status: String,
    pub total_fare: Decimal,
    pub payment_done: Decimal,
    pub payment_due: Decimal,
    pub payment_status: String,
    pub fare_details: Option<String>,
    pub last_payment_date: Option<NaiveDateTime>,
    pub created: NaiveDateTime,
}

impl BookingView {
    pub fn new(row: BookingListRow, assignments: &[BookingVehicleView]) -> Self {
        let r = row.record;
        BookingView {
            id: r.id,
            vehicles: crate::models::booking_vehicle::vehicles_column(assignments, ", "),
            booking_type: BookingType::label_for(&r.booking_type),
            status: BookingStatus::label_for(&r.status),
            payment_status: BookingPaymentStatus::label_for(&r.payment_status),
            booking_id: r.booking_id,
            customer_name: r.customer_name,
            customer_mobile: r.customer_mobile,
            customer_email: r.customer_email,
            source: row.source_name,
            destination: row.destination_name,
            travel_date: r.travel_date,
            travel_time: r.travel_time,
            pickup_point: r.pickup_point,
            ssr: r.ssr,
            passengers: r.passengers,
            distance: r.distance,
            vehicle_type: row.vehicle_type_name,
            vehicle_count: r.vehicle_count,
            total_fare: r.total_fare,
            payment_done: r.payment_done,
            payment_due: r.payment_due,
            fare_details: r.fare_details,
            last_payment_date: r.last_payment_date,
            created: r.created,
        }
    }
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct BookingListResponse {
    pub bookings: Vec<BookingView>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct CreateBookingResponse {
    pub id: i32,
    pub booking_id: String,
    pub total_fare: Decimal,
    pub status: String,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct UpdateBookingResponse {
    pub booking: BookingView,
    pub notifications_sent: usize,
    pub notifications_failed: usize,
}

// Accounts screen: payment bookkeeping of a booking
#[derive(Debug, Clone, Serialize, JsonSchema, sqlx::FromRow)]
pub struct AccountView {
    pub booking_id: String,
    pub accounts_verified: bool,
    pub payment_status: String,
    pub payment_done: Decimal,
    pub payment_due: Decimal,
    pub last_payment_date: Option<NaiveDateTime>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct AccountListResponse {
    pub accounts: Vec<AccountView>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct AccountVerificationRequest {
    pub accounts_verified: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(value: i64) -> Decimal {
        Decimal::from(value)
    }

    #[test]
    fn status_codes_map_explicitly() {
        assert_eq!(BookingStatus::from_code("0"), Some(BookingStatus::Pending));
        assert_eq!(BookingStatus::from_code("1"), Some(BookingStatus::Confirmed));
        assert_eq!(BookingStatus::from_code("2"), Some(BookingStatus::Declined));
        assert_eq!(BookingStatus::from_code("3"), None);
        assert_eq!(BookingStatus::from_code("Confirmed"), None);
        assert_eq!(BookingStatus::Declined.code(), "2");
    }

    #[test]
    fn unknown_codes_are_displayed_verbatim() {
        assert_eq!(BookingStatus::label_for("1"), "Confirmed");
        assert_eq!(BookingType::label_for("RT"), "Round trip");
        assert_eq!(BookingStatus::label_for("9"), "9");
    }

    #[test]
    fn payment_status_follows_amounts() {
        assert_eq!(
            BookingPaymentStatus::for_amounts(dec(1000), dec(0)),
            BookingPaymentStatus::NotPaid
        );
        assert_eq!(
            BookingPaymentStatus::for_amounts(dec(1000), dec(400)),
            BookingPaymentStatus::PartiallyPaid
        );
        assert_eq!(
            BookingPaymentStatus::for_amounts(dec(1000), dec(1000)),
            BookingPaymentStatus::Paid
        );
    }

    #[test]
    fn invalid_email_fails_validation() {
        let request = UpdateBookingRequest {
            customer_email: Some("not-an-email".into()),
            ..Default::default()
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn blank_contacts_are_taken() {
        let mut mobile = Some("  ".to_string());
        assert!(take_blank(&mut mobile));
        assert_eq!(mobile, None);

        let mut email = Some("a@b.in".to_string());
        assert!(!take_blank(&mut email));
        assert_eq!(email.as_deref(), Some("a@b.in"));

        let mut missing = None;
        assert!(!take_blank(&mut missing));
    }
}
