use cab_booking_system::models::booking_vehicle::BookingVehicle;
use cab_booking_system::services::lifecycle::{
    assignment_events, assignment_notices, booking_status_event, CustomerContact, TripDetails,
};
use cab_booking_system::services::notification_service::NotificationDispatcher;
use cab_booking_system::utils::notifier::Channel;
use chrono::{NaiveDate, NaiveTime};
use std::sync::Arc;

mod common {
    pub mod recording_notifier;
}
use common::recording_notifier::RecordingNotifier;

fn dispatcher() -> (Arc<RecordingNotifier>, NotificationDispatcher) {
    let notifier = Arc::new(RecordingNotifier::default());
    (notifier.clone(), NotificationDispatcher::new(notifier))
}

fn contact(mobile: &str, email: &str) -> CustomerContact {
    CustomerContact {
        name: "Asha".to_string(),
        mobile: Some(mobile.to_string()),
        email: Some(email.to_string()),
    }
}

fn assignment(driver_id: Option<i32>, vehicle_id: Option<i32>, extra_info: &str) -> BookingVehicle {
    BookingVehicle {
        id: 11,
        booking_id: 5,
        vehicle_id,
        driver_id,
        extra_info: Some(extra_info.to_string()),
    }
}

fn trip() -> TripDetails {
    TripDetails {
        booking_id: "BK100".to_string(),
        customer: contact("9999999999", ""),
        source: "Bangalore".to_string(),
        destination: "Mysore".to_string(),
        travel_date: NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(),
        travel_time: NaiveTime::from_hms_opt(6, 30, 0).unwrap(),
        pickup_point: Some("MG Road".to_string()),
        vehicle: Some("Dzire (KA01AB1234)".to_string()),
        driver_name: Some("Ravi".to_string()),
        driver_mobile: Some("8888888888".to_string()),
        extra_info: None,
    }
}

#[tokio::test]
async fn confirming_a_booking_texts_the_customer() {
    let (notifier, dispatcher) = dispatcher();
    let event = booking_status_event("BK100", "1", true, contact("9999999999", ""));

    let report = dispatcher.dispatch(&event.into_iter().collect::<Vec<_>>()).await;

    let sms = notifier.calls_on(Channel::Sms);
    assert_eq!(sms.len(), 1);
    assert_eq!(sms[0].recipient, "9999999999");
    assert!(sms[0].body.contains("BK100"));
    assert!(sms[0].body.contains("confirmed"));
    assert!(notifier.calls_on(Channel::Email).is_empty());
    assert_eq!(report.sent, 1);
    assert_eq!(report.failed, 0);
}

#[tokio::test]
async fn status_change_with_both_contacts_uses_both_channels() {
    let (notifier, dispatcher) = dispatcher();
    let event = booking_status_event("BK7", "2", true, contact("9999999999", "asha@example.com"));

    dispatcher.dispatch(&event.into_iter().collect::<Vec<_>>()).await;

    let email = notifier.calls_on(Channel::Email);
    assert_eq!(email.len(), 1);
    assert_eq!(email[0].subject.as_deref(), Some("Booking declined"));
    assert_eq!(notifier.calls_on(Channel::Sms).len(), 1);
}

#[tokio::test]
async fn unchanged_status_sends_nothing() {
    let (notifier, dispatcher) = dispatcher();
    let event = booking_status_event("BK100", "1", false, contact("9999999999", "a@b.com"));
    assert!(event.is_none());

    dispatcher.dispatch(&[]).await;
    assert!(notifier.calls().is_empty());
}

#[tokio::test]
async fn unknown_status_code_is_dropped() {
    let event = booking_status_event("BK100", "7", true, contact("9999999999", "a@b.com"));
    assert!(event.is_none());
}

#[tokio::test]
async fn customer_without_contact_details_is_skipped() {
    let (notifier, dispatcher) = dispatcher();
    let event = booking_status_event("BK100", "0", true, contact("  ", ""));

    let report = dispatcher.dispatch(&event.into_iter().collect::<Vec<_>>()).await;

    assert!(notifier.calls().is_empty());
    assert_eq!(report.sent + report.failed, 0);
}

#[tokio::test]
async fn empty_assignment_notifies_nobody() {
    let (notifier, dispatcher) = dispatcher();
    let notices = assignment_notices(None, &assignment(None, None, ""));

    assert!(!notices.customer && !notices.driver);
    dispatcher.dispatch(&assignment_events(notices, trip())).await;
    assert!(notifier.calls().is_empty());
}

#[tokio::test]
async fn assigning_a_driver_notifies_customer_and_driver() {
    let (notifier, dispatcher) = dispatcher();
    let before = assignment(None, None, "");
    let after = assignment(Some(1), None, "");

    let events = assignment_events(assignment_notices(Some(&before), &after), trip());
    let report = dispatcher.dispatch(&events).await;

    let calls = notifier.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].recipient, "9999999999");
    assert!(calls[0].body.contains("Trip details for booking BK100"));
    assert_eq!(calls[1].recipient, "8888888888");
    assert!(calls[1].body.contains("Asha"));
    assert_eq!(report.sent, 2);
}

#[tokio::test]
async fn editing_only_extra_info_skips_the_driver() {
    let (notifier, dispatcher) = dispatcher();
    let before = assignment(Some(1), Some(2), "");
    let after = assignment(Some(1), Some(2), "Carry a child seat");

    let events = assignment_events(assignment_notices(Some(&before), &after), trip());
    dispatcher.dispatch(&events).await;

    let calls = notifier.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].recipient, "9999999999");
}

#[tokio::test]
async fn delivery_failures_are_counted_not_raised() {
    let notifier = Arc::new(RecordingNotifier::failing_on(Channel::Sms));
    let dispatcher = NotificationDispatcher::new(notifier.clone());
    let event = booking_status_event("BK100", "1", true, contact("9999999999", "asha@example.com"));

    let report = dispatcher.dispatch(&event.into_iter().collect::<Vec<_>>()).await;

    assert_eq!(notifier.calls().len(), 2);
    assert_eq!(report.sent, 1);
    assert_eq!(report.failed, 1);
}
