#![allow(dead_code)]

use async_trait::async_trait;
use cab_booking_system::utils::error::LifecycleError;
use cab_booking_system::utils::notifier::{Channel, Notifier};
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sent {
    pub channel: Channel,
    pub recipient: String,
    pub subject: Option<String>,
    pub body: String,
}

/// Notifier that remembers every call. Calls on `failing` channels are
/// recorded and then rejected.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Sent>>,
    failing: Vec<Channel>,
}

impl RecordingNotifier {
    pub fn failing_on(channel: Channel) -> Self {
        RecordingNotifier {
            sent: Mutex::new(Vec::new()),
            failing: vec![channel],
        }
    }

    pub fn calls(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn calls_on(&self, channel: Channel) -> Vec<Sent> {
        self.calls().into_iter().filter(|s| s.channel == channel).collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(
        &self,
        channel: Channel,
        recipient: &str,
        subject: Option<&str>,
        body: &str,
    ) -> Result<(), LifecycleError> {
        self.sent.lock().unwrap().push(Sent {
            channel,
            recipient: recipient.to_string(),
            subject: subject.map(str::to_string),
            body: body.to_string(),
        });

        if self.failing.contains(&channel) {
            return Err(LifecycleError::NotificationDeliveryFailure {
                channel,
                recipient: recipient.to_string(),
                reason: "gateway unavailable".to_string(),
            });
        }
        Ok(())
    }
}
