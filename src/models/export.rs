use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::Serialize;

use crate::models::booking::{
    BookingListRow, BookingPaymentStatus, BookingStatus, BookingType, CodedChoice,
};
use crate::models::booking_vehicle::{vehicles_column, BookingVehicleView};
use crate::models::payment::{PaymentExport, PaymentRecord};

/// One exported booking. Field order is the column order of the export.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct BookingExportRow {
    pub id: i32,
    pub booking_id: String,
    pub source: String,
    pub destination: String,
    pub booking_type: String,
    pub customer_name: String,
    pub customer_mobile: Option<String>,
    pub customer_email: Option<String>,
    pub created: NaiveDateTime,
    pub travel_date: NaiveDate,
    pub travel_time: NaiveTime,
    pub pickup_point: Option<String>,
    pub ssr: Option<String>,
    pub status: String,
    pub vehicle_type: String,
    pub vehicle_count: i32,
    pub vehicles: String,
    pub total_fare: Decimal,
    pub payment_status: String,
    pub payment_done: Decimal,
    pub payment_due: Decimal,
    pub fare_details: Option<String>,
    /// JSON array of the booking's payments
    pub payments: String,
}

impl BookingExportRow {
    pub fn new(
        row: BookingListRow,
        assignments: &[BookingVehicleView],
        payments: &[PaymentRecord],
    ) -> Result<Self, serde_json::Error> {
        let exported: Vec<PaymentExport> = payments.iter().map(PaymentExport::from).collect();
        let r = row.record;

        Ok(BookingExportRow {
            id: r.id,
            booking_type: BookingType::label_for(&r.booking_type),
            status: BookingStatus::label_for(&r.status),
            payment_status: BookingPaymentStatus::label_for(&r.payment_status),
            vehicles: vehicles_column(assignments, ","),
            payments: serde_json::to_string(&exported)?,
            booking_id: r.booking_id,
            source: row.source_name,
            destination: row.destination_name,
            customer_name: r.customer_name,
            customer_mobile: r.customer_mobile,
            customer_email: r.customer_email,
            created: r.created,
            travel_date: r.travel_date,
            travel_time: r.travel_time,
            pickup_point: r.pickup_point,
            ssr: r.ssr,
            vehicle_type: row.vehicle_type_name,
            vehicle_count: r.vehicle_count,
            total_fare: r.total_fare,
            payment_done: r.payment_done,
            payment_due: r.payment_due,
            fare_details: r.fare_details,
        })
    }
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct BookingExportResponse {
    pub rows: Vec<BookingExportRow>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::booking::BookingRecord;
    use chrono::NaiveDate;

    fn sample_row() -> BookingListRow {
        let created = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        BookingListRow {
            record: BookingRecord {
                id: 5,
                booking_id: "BK100".into(),
                customer_name: "Asha".into(),
                customer_mobile: Some("9999999999".into()),
                customer_email: None,
                source_id: 1,
                destination_id: 2,
                travel_date: NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(),
                travel_time: NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
                pickup_point: Some("MG Road".into()),
                ssr: None,
                passengers: 3,
                distance: None,
                booking_type: "RT".into(),
                vehicle_type_id: 1,
                vehicle_count: 1,
                status: "1".into(),
                total_fare: Decimal::from(3000),
                payment_done: Decimal::from(1000),
                payment_due: Decimal::from(2000),
                payment_status: "PP".into(),
                fare_details: None,
                last_payment_date: Some(created),
                accounts_verified: true,
                created,
                last_updated: created,
            },
            source_name: "Bangalore".into(),
            destination_name: "Mysore".into(),
            vehicle_type_name: "Sedan".into(),
        }
    }

    fn sample_payment() -> PaymentRecord {
        PaymentRecord {
            id: 1,
            item_kind: "booking".into(),
            item_object_id: 5,
            amount: Decimal::new(100050, 2),
            payment_type: "Advance".into(),
            mode: "UPI".into(),
            reference_id: Some("TXN1".into()),
            comment: None,
            invoice_id: "INV-1".into(),
            timestamp: NaiveDate::from_ymd_opt(2024, 3, 2)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap(),
            details: Some("gateway payload".into()),
            status: Some("CNF".into()),
        }
    }

    #[test]
    fn enumerations_are_exported_as_labels() {
        let row = BookingExportRow::new(sample_row(), &[], &[]).unwrap();
        assert_eq!(row.status, "Confirmed");
        assert_eq!(row.booking_type, "Round trip");
        assert_eq!(row.payment_status, "Partially paid");
        assert_eq!(row.vehicles, "x");
        assert_eq!(row.payments, "[]");
    }

    #[test]
    fn payments_column_lists_only_exported_fields() {
        let row = BookingExportRow::new(sample_row(), &[], &[sample_payment()]).unwrap();
        let payments: serde_json::Value = serde_json::from_str(&row.payments).unwrap();
        let first = &payments[0];

        assert_eq!(first["amount"], 1000.5);
        assert_eq!(first["type"], "Advance");
        assert_eq!(first["mode"], "UPI");
        assert_eq!(first["reference_id"], "TXN1");
        assert_eq!(first["invoice_id"], "INV-1");
        assert_eq!(first["timestamp"], "2024-03-02 10:00:00");
        assert!(first.get("details").is_none());
        assert!(first.get("status").is_none());
    }

    #[test]
    fn columns_follow_export_order() {
        let row = BookingExportRow::new(sample_row(), &[], &[]).unwrap();
        let json = serde_json::to_string(&row).unwrap();
        assert!(json.starts_with(r#"{"id":5,"booking_id":"BK100","source":"Bangalore","destination":"Mysore","booking_type""#));
        assert!(json.ends_with(r#""payments":"[]"}"#));
        assert!(!json.contains("accounts_verified"));
    }
}
