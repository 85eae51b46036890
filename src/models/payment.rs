use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum_macros::{EnumIter, EnumString, IntoStaticStr};
use validator::Validate;

/// Entity kinds a payment can be attached to, stored next to the owner id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Payable {
    Booking(i32),
}

impl Payable {
    pub fn kind(&self) -> &'static str {
        match self {
            Payable::Booking(_) => "booking",
        }
    }

    pub fn object_id(&self) -> i32 {
        match self {
            Payable::Booking(id) => *id,
        }
    }

    pub fn from_parts(kind: &str, object_id: i32) -> Option<Self> {
        match kind {
            "booking" => Some(Payable::Booking(object_id)),
            _ => None,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema,
    EnumString, IntoStaticStr, EnumIter,
)]
pub enum PaymentStatus {
    #[strum(serialize = "WAT")]
    Waiting,
    #[strum(serialize = "INP")]
    Input,
    #[strum(serialize = "RFN")]
    Refunded,
    #[strum(serialize = "REJ")]
    Rejected,
    #[strum(serialize = "CNF")]
    Confirmed,
    #[strum(serialize = "ERR")]
    Error,
}

impl PaymentStatus {
    pub fn code(self) -> &'static str {
        self.into()
    }

    /// Whether a payment in this status counts towards the amount paid.
    /// Payments recorded before statuses existed have none and count.
    pub fn counts_as_paid(status: Option<PaymentStatus>) -> bool {
        matches!(status, None | Some(PaymentStatus::Confirmed))
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PaymentRecord {
    pub id: i32,
    pub item_kind: String,
    pub item_object_id: i32,
    pub amount: Decimal,
    #[sqlx(rename = "type")]
    pub payment_type: String,
    pub mode: String,
    pub reference_id: Option<String>,
    pub comment: Option<String>,
    pub invoice_id: String,
    pub timestamp: NaiveDateTime,
    pub details: Option<String>,
    pub status: Option<String>,
}

impl PaymentRecord {
    pub fn owner(&self) -> Option<Payable> {
        Payable::from_parts(&self.item_kind, self.item_object_id)
    }

    pub fn status(&self) -> Option<PaymentStatus> {
        self.status.as_deref().and_then(|code| code.parse().ok())
    }
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct PaymentView {
    pub id: i32,
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub payment_type: String,
    pub mode: String,
    pub reference_id: Option<String>,
    pub comment: Option<String>,
    pub invoice_id: String,
    pub timestamp: NaiveDateTime,
    pub details: Option<String>,
    pub status: Option<PaymentStatus>,
}

impl From<PaymentRecord> for PaymentView {
    fn from(record: PaymentRecord) -> Self {
        PaymentView {
            status: record.status(),
            id: record.id,
            amount: record.amount,
            payment_type: record.payment_type,
            mode: record.mode,
            reference_id: record.reference_id,
            comment: record.comment,
            invoice_id: record.invoice_id,
            timestamp: record.timestamp,
            details: record.details,
        }
    }
}

#[derive(Debug, Clone, Deserialize, JsonSchema, Validate)]
pub struct CreatePaymentRequest {
    pub amount: Decimal,
    #[serde(rename = "type")]
    #[validate(length(min = 1, max = 50))]
    pub payment_type: String,
    #[validate(length(min = 1, max = 50))]
    pub mode: String,
    #[validate(length(max = 100))]
    pub reference_id: Option<String>,
    #[validate(length(max = 500))]
    pub comment: Option<String>,
    #[validate(length(max = 1024))]
    pub details: Option<String>,
    pub status: Option<PaymentStatus>,
    pub timestamp: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema, Validate)]
pub struct UpdatePaymentRequest {
    pub status: Option<PaymentStatus>,
    #[validate(length(max = 1024))]
    pub details: Option<String>,
    #[validate(length(max = 500))]
    pub comment: Option<String>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct PaymentListResponse {
    pub payments: Vec<PaymentView>,
}

// Payment entry inside the export's payments column
#[derive(Debug, Clone, Serialize)]
pub struct PaymentExport {
    pub amount: f64,
    #[serde(rename = "type")]
    pub payment_type: String,
    pub mode: String,
    pub reference_id: Option<String>,
    pub comment: Option<String>,
    pub invoice_id: String,
    pub timestamp: String,
}

impl From<&PaymentRecord> for PaymentExport {
    fn from(record: &PaymentRecord) -> Self {
        use rust_decimal::prelude::ToPrimitive;

        PaymentExport {
            amount: record.amount.to_f64().unwrap_or_default(),
            payment_type: record.payment_type.clone(),
            mode: record.mode.clone(),
            reference_id: record.reference_id.clone(),
            comment: record.comment.clone(),
            invoice_id: record.invoice_id.clone(),
            timestamp: record.timestamp.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payable_round_trips_through_stored_parts() {
        let owner = Payable::Booking(12);
        assert_eq!(Payable::from_parts(owner.kind(), owner.object_id()), Some(owner));
        assert_eq!(Payable::from_parts("invoice", 12), None);
    }

    #[test]
    fn only_confirmed_or_legacy_payments_count() {
        assert!(PaymentStatus::counts_as_paid(None));
        assert!(PaymentStatus::counts_as_paid(Some(PaymentStatus::Confirmed)));
        assert!(!PaymentStatus::counts_as_paid(Some(PaymentStatus::Waiting)));
        assert!(!PaymentStatus::counts_as_paid(Some(PaymentStatus::Refunded)));
        assert!(!PaymentStatus::counts_as_paid(Some(PaymentStatus::Error)));
    }

    #[test]
    fn status_codes_use_three_letters() {
        assert_eq!(PaymentStatus::Refunded.code(), "RFN");
        assert_eq!("CNF".parse::<PaymentStatus>().unwrap(), PaymentStatus::Confirmed);
    }
}
