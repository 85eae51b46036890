//! Booking status lifecycle and vehicle assignment rules.
//!
//! Everything here is pure: it decides *whether* someone must be told about
//! a change and produces [`DomainEvent`]s. Delivery belongs to
//! [`NotificationDispatcher`](crate::services::notification_service::NotificationDispatcher).

use chrono::{NaiveDate, NaiveTime};

use crate::models::booking::{BookingStatus, CodedChoice};
use crate::models::booking_vehicle::BookingVehicle;
use crate::utils::error::LifecycleError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusNotice {
    pub subject: &'static str,
    pub message: String,
}

pub fn status_notice(status: BookingStatus, booking_id: &str) -> StatusNotice {
    match status {
        BookingStatus::Pending => StatusNotice {
            subject: "Booking under process",
            message: "Your booking request is being processed.".to_string(),
        },
        BookingStatus::Confirmed => StatusNotice {
            subject: "Booking confirmed",
            message: format!(
                "Your booking with ID: {} has been confirmed.\n\
                 You'll be notified about vehicle & driver details a few hours before your trip.",
                booking_id
            ),
        },
        BookingStatus::Declined => StatusNotice {
            subject: "Booking declined",
            message: format!("Your booking with ID: {} has been declined.", booking_id),
        },
    }
}

/// Notice for a stored status code, if one is due.
///
/// Nothing is produced when the status is unchanged. An unrecognised code is
/// reported as [`LifecycleError::InvalidStatusTransition`] so the caller can
/// log it; it never stops the save.
pub fn status_change_notice(
    status_code: &str,
    booking_id: &str,
    changed: bool,
) -> Result<Option<StatusNotice>, LifecycleError> {
    if !changed {
        return Ok(None);
    }

    match BookingStatus::from_code(status_code) {
        Some(status) => Ok(Some(status_notice(status, booking_id))),
        None => Err(LifecycleError::InvalidStatusTransition {
            booking_id: booking_id.to_string(),
            code: status_code.to_string(),
        }),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerContact {
    pub name: String,
    pub mobile: Option<String>,
    pub email: Option<String>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl CustomerContact {
    pub fn mobile(&self) -> Option<&str> {
        present(&self.mobile)
    }

    pub fn email(&self) -> Option<&str> {
        present(&self.email)
    }
}

// What a customer or driver needs to know about an assignment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripDetails {
    pub booking_id: String,
    pub customer: CustomerContact,
    pub source: String,
    pub destination: String,
    pub travel_date: NaiveDate,
    pub travel_time: NaiveTime,
    pub pickup_point: Option<String>,
    pub vehicle: Option<String>,
    pub driver_name: Option<String>,
    pub driver_mobile: Option<String>,
    pub extra_info: Option<String>,
}

impl TripDetails {
    pub fn driver_mobile(&self) -> Option<&str> {
        present(&self.driver_mobile)
    }

    fn when(&self) -> String {
        format!(
            "{} at {}",
            self.travel_date.format("%d %b %Y"),
            self.travel_time.format("%H:%M")
        )
    }

    pub fn customer_message(&self) -> String {
        let mut lines = vec![format!(
            "Trip details for booking {}: {} to {} on {}.",
            self.booking_id,
            self.source,
            self.destination,
            self.when()
        )];
        if let Some(vehicle) = &self.vehicle {
            lines.push(format!("Vehicle: {}", vehicle));
        }
        if let Some(driver) = &self.driver_name {
            match self.driver_mobile() {
                Some(mobile) => lines.push(format!("Driver: {} ({})", driver, mobile)),
                None => lines.push(format!("Driver: {}", driver)),
            }
        }
        if let Some(info) = present(&self.extra_info) {
            lines.push(info.to_string());
        }
        lines.join("\n")
    }

    pub fn driver_message(&self) -> String {
        let mut lines = vec![format!(
            "Trip {}: {} to {} on {}.",
            self.booking_id,
            self.source,
            self.destination,
            self.when()
        )];
        if let Some(pickup) = present(&self.pickup_point) {
            lines.push(format!("Pickup: {}", pickup));
        }
        match self.customer.mobile() {
            Some(mobile) => lines.push(format!("Customer: {} ({})", self.customer.name, mobile)),
            None => lines.push(format!("Customer: {}", self.customer.name)),
        }
        if let Some(vehicle) = &self.vehicle {
            lines.push(format!("Vehicle: {}", vehicle));
        }
        if let Some(info) = present(&self.extra_info) {
            lines.push(info.to_string());
        }
        lines.join("\n")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    Customer,
    Driver,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainEvent {
    BookingStatusChanged {
        booking_id: String,
        notice: StatusNotice,
        contact: CustomerContact,
    },
    VehicleAssigned {
        audience: Audience,
        trip: TripDetails,
    },
}

/// Event for a booking save. Invalid status codes are logged and dropped.
pub fn booking_status_event(
    booking_id: &str,
    status_code: &str,
    changed: bool,
    contact: CustomerContact,
) -> Option<DomainEvent> {
    match status_change_notice(status_code, booking_id, changed) {
        Ok(notice) => notice.map(|notice| DomainEvent::BookingStatusChanged {
            booking_id: booking_id.to_string(),
            notice,
            contact,
        }),
        Err(err) => {
            tracing::warn!(error = %err, "status notification skipped");
            None
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssignmentNotices {
    pub customer: bool,
    pub driver: bool,
}

/// Who must hear about a booking vehicle save. `previous` is `None` when the
/// row is new.
pub fn assignment_notices(
    previous: Option<&BookingVehicle>,
    current: &BookingVehicle,
) -> AssignmentNotices {
    match previous {
        None => AssignmentNotices {
            customer: current.vehicle_id.is_some()
                || current.driver_id.is_some()
                || current.extra_info().is_some(),
            driver: current.driver_id.is_some(),
        },
        Some(before) => {
            let vehicle_changed = before.vehicle_id != current.vehicle_id;
            let driver_changed = before.driver_id != current.driver_id;
            let extra_changed = before.extra_info() != current.extra_info();

            AssignmentNotices {
                customer: vehicle_changed || driver_changed || extra_changed,
                driver: current.driver_id.is_some() && (driver_changed || vehicle_changed),
            }
        }
    }
}

pub fn assignment_events(notices: AssignmentNotices, trip: TripDetails) -> Vec<DomainEvent> {
    let mut events = Vec::with_capacity(2);
    if notices.customer {
        events.push(DomainEvent::VehicleAssigned {
            audience: Audience::Customer,
            trip: trip.clone(),
        });
    }
    if notices.driver {
        events.push(DomainEvent::VehicleAssigned {
            audience: Audience::Driver,
            trip,
        });
    }
    events
}
