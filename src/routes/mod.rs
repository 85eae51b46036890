use chrono::NaiveDate;

use crate::models::booking::CodedChoice;
use crate::utils::error::AppError;

pub mod account_route;
pub mod booking_route;
pub mod booking_vehicle_route;
pub mod payment_route;
pub mod reference_route;
pub mod staff_route;

// Query string helpers shared by the listing endpoints

pub(crate) fn parse_date(value: Option<String>, name: &str) -> Result<Option<NaiveDate>, AppError> {
    value
        .map(|date| {
            NaiveDate::parse_from_str(&date, "%Y-%m-%d")
                .map_err(|_| AppError::BadRequest(format!("Invalid {} format", name)))
        })
        .transpose()
}

pub(crate) fn parse_code<T: CodedChoice>(value: Option<String>, name: &str) -> Result<Option<T>, AppError> {
    value
        .map(|code| {
            T::from_code(&code).ok_or_else(|| AppError::BadRequest(format!("Unknown {} '{}'", name, code)))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::booking::BookingStatus;

    #[test]
    fn query_values_are_optional() {
        assert_eq!(parse_date(None, "travel date").unwrap(), None);
        assert_eq!(parse_code::<BookingStatus>(None, "status").unwrap(), None);
    }

    #[test]
    fn malformed_query_values_are_bad_requests() {
        assert!(matches!(
            parse_date(Some("10/03/2024".into()), "travel date"),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            parse_code::<BookingStatus>(Some("9".into()), "status"),
            Err(AppError::BadRequest(_))
        ));
        assert_eq!(
            parse_code::<BookingStatus>(Some("1".into()), "status").unwrap(),
            Some(BookingStatus::Confirmed)
        );
    }
}
