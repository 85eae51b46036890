use std::sync::Arc;

use crate::services::lifecycle::{Audience, DomainEvent};
use crate::utils::notifier::{Channel, Notifier};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub channel: Channel,
    pub recipient: String,
    pub subject: Option<String>,
    pub body: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub sent: usize,
    pub failed: usize,
}

/// Messages owed for one event, one per channel/recipient.
pub fn outgoing_messages(event: &DomainEvent) -> Vec<OutgoingMessage> {
    let mut messages = Vec::new();

    match event {
        DomainEvent::BookingStatusChanged { notice, contact, .. } => {
            if let Some(mobile) = contact.mobile() {
                messages.push(OutgoingMessage {
                    channel: Channel::Sms,
                    recipient: mobile.to_string(),
                    subject: None,
                    body: notice.message.clone(),
                });
            }
            if let Some(email) = contact.email() {
                messages.push(OutgoingMessage {
                    channel: Channel::Email,
                    recipient: email.to_string(),
                    subject: Some(notice.subject.to_string()),
                    body: notice.message.clone(),
                });
            }
        }
        DomainEvent::VehicleAssigned { audience: Audience::Customer, trip } => {
            // SMS when possible, email otherwise
            if let Some(mobile) = trip.customer.mobile() {
                messages.push(OutgoingMessage {
                    channel: Channel::Sms,
                    recipient: mobile.to_string(),
                    subject: None,
                    body: trip.customer_message(),
                });
            } else if let Some(email) = trip.customer.email() {
                messages.push(OutgoingMessage {
                    channel: Channel::Email,
                    recipient: email.to_string(),
                    subject: Some(format!("Trip details for booking {}", trip.booking_id)),
                    body: trip.customer_message(),
                });
            }
        }
        DomainEvent::VehicleAssigned { audience: Audience::Driver, trip } => {
            if let Some(mobile) = trip.driver_mobile() {
                messages.push(OutgoingMessage {
                    channel: Channel::Sms,
                    recipient: mobile.to_string(),
                    subject: None,
                    body: trip.driver_message(),
                });
            }
        }
    }

    messages
}

/// Turns domain events into notifier calls. Delivery failures are logged and
/// counted, never returned.
#[derive(Clone)]
pub struct NotificationDispatcher {
    notifier: Arc<dyn Notifier>,
}

impl NotificationDispatcher {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        NotificationDispatcher { notifier }
    }

    pub async fn dispatch(&self, events: &[DomainEvent]) -> DispatchReport {
        let mut report = DispatchReport::default();

        for event in events {
            for message in outgoing_messages(event) {
                let result = self
                    .notifier
                    .notify(
                        message.channel,
                        &message.recipient,
                        message.subject.as_deref(),
                        &message.body,
                    )
                    .await;

                match result {
                    Ok(()) => {
                        tracing::debug!(channel = %message.channel, recipient = %message.recipient, "notification sent");
                        report.sent += 1;
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, "notification dropped");
                        report.failed += 1;
                    }
                }
            }
        }

        report
    }
}
