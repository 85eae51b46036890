use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use strum_macros::{Display, EnumString};

use crate::config::AppConfig;
use crate::utils::error::LifecycleError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize)]
pub enum Channel {
    #[strum(serialize = "SMS")]
    #[serde(rename = "sms")]
    Sms,
    #[strum(serialize = "Email")]
    #[serde(rename = "email")]
    Email,
}

/// Outbound SMS/email transport.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(
        &self,
        channel: Channel,
        recipient: &str,
        subject: Option<&str>,
        body: &str,
    ) -> Result<(), LifecycleError>;
}

#[derive(Debug, Serialize)]
struct GatewayMessage<'a> {
    channel: Channel,
    from: Option<&'a str>,
    to: &'a str,
    subject: Option<&'a str>,
    body: &'a str,
}

/// Posts messages as JSON to an SMS gateway and an email gateway.
pub struct HttpNotifier {
    client: reqwest::Client,
    sms_url: Option<String>,
    email_url: Option<String>,
    api_key: Option<String>,
    from_email: Option<String>,
    retries: u32,
}

impl HttpNotifier {
    pub fn new(config: &AppConfig) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.notify_timeout_secs))
            .build()?;

        Ok(HttpNotifier {
            client,
            sms_url: config.sms_gateway_url.clone(),
            email_url: config.email_gateway_url.clone(),
            api_key: config.notify_api_key.clone(),
            from_email: config.from_email.clone(),
            retries: config.notify_retries,
        })
    }

    fn endpoint(&self, channel: Channel) -> Option<&str> {
        match channel {
            Channel::Sms => self.sms_url.as_deref(),
            Channel::Email => self.email_url.as_deref(),
        }
    }

    async fn send_once(&self, url: &str, message: &GatewayMessage<'_>) -> Result<(), String> {
        let mut request = self.client.post(url).json(message);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| e.to_string())?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(format!("gateway returned {}", response.status()))
        }
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn notify(
        &self,
        channel: Channel,
        recipient: &str,
        subject: Option<&str>,
        body: &str,
    ) -> Result<(), LifecycleError> {
        let failure = |reason: String| LifecycleError::NotificationDeliveryFailure {
            channel,
            recipient: recipient.to_string(),
            reason,
        };

        let url = self
            .endpoint(channel)
            .ok_or_else(|| failure("no gateway configured".into()))?;

        let message = GatewayMessage {
            channel,
            from: match channel {
                Channel::Email => self.from_email.as_deref(),
                Channel::Sms => None,
            },
            to: recipient,
            subject,
            body,
        };

        let mut attempt = 0;
        loop {
            match self.send_once(url, &message).await {
                Ok(()) => return Ok(()),
                Err(reason) if attempt < self.retries => {
                    attempt += 1;
                    tracing::debug!(%channel, recipient, attempt, %reason, "retrying notification");
                    tokio::time::sleep(Duration::from_millis(200 * attempt as u64)).await;
                }
                Err(reason) => return Err(failure(reason)),
            }
        }
    }
}

/// Writes every message to the log instead of sending it. Used when no
/// gateway is configured.
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(
        &self,
        channel: Channel,
        recipient: &str,
        subject: Option<&str>,
        body: &str,
    ) -> Result<(), LifecycleError> {
        tracing::info!(
            target: "cab_booking_system::notify",
            %channel,
            recipient,
            subject = subject.unwrap_or(""),
            body,
            "notification"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn config_without_gateways() -> AppConfig {
        AppConfig {
            database_url: "mysql://localhost/cabs".into(),
            jwt_secret: "secret".into(),
            from_email: Some("bookings@example.com".into()),
            sms_gateway_url: None,
            email_gateway_url: None,
            notify_api_key: None,
            notify_timeout_secs: 1,
            notify_retries: 0,
            init_schema: false,
            admin_username: None,
            admin_password: None,
        }
    }

    #[test]
    fn channel_round_trips_through_its_label() {
        assert_eq!(Channel::Sms.to_string(), "SMS");
        assert_eq!(Channel::from_str("Email").unwrap(), Channel::Email);
    }

    #[tokio::test]
    async fn missing_gateway_is_a_delivery_failure() {
        let notifier = HttpNotifier::new(&config_without_gateways()).unwrap();
        let result = notifier
            .notify(Channel::Email, "a@b.com", Some("subject"), "body")
            .await;

        match result {
            Err(LifecycleError::NotificationDeliveryFailure { channel, recipient, .. }) => {
                assert_eq!(channel, Channel::Email);
                assert_eq!(recipient, "a@b.com");
            }
            other => panic!("expected delivery failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn log_notifier_always_succeeds() {
        let notifier = LogNotifier;
        assert!(notifier
            .notify(Channel::Sms, "9999999999", None, "hello")
            .await
            .is_ok());
    }
}
