use std::env;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

// Runtime configuration, read from the environment (and .env)
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt_secret: String,
    pub from_email: Option<String>,
    pub sms_gateway_url: Option<String>,
    pub email_gateway_url: Option<String>,
    pub notify_api_key: Option<String>,
    pub notify_timeout_secs: u64,
    pub notify_retries: u32,
    pub init_schema: bool,
    /// Staff account created at startup when missing; registering further
    /// staff needs a token.
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        Ok(AppConfig {
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            from_email: optional("FROM_EMAIL"),
            sms_gateway_url: optional("SMS_GATEWAY_URL"),
            email_gateway_url: optional("EMAIL_GATEWAY_URL"),
            notify_api_key: optional("NOTIFY_API_KEY"),
            notify_timeout_secs: parsed("NOTIFY_TIMEOUT_SECS", 3)?,
            notify_retries: parsed("NOTIFY_RETRIES", 2)?,
            init_schema: parsed("INIT_SCHEMA", false)?,
            admin_username: optional("ADMIN_USERNAME"),
            admin_password: optional("ADMIN_PASSWORD"),
        }
        .checked()?)
    }

    fn checked(self) -> Result<Self, ConfigError> {
        match (&self.admin_username, &self.admin_password) {
            (Some(_), None) => Err(ConfigError::Missing("ADMIN_PASSWORD")),
            (None, Some(_)) => Err(ConfigError::Missing("ADMIN_USERNAME")),
            _ => Ok(self),
        }
    }

    pub fn admin_credentials(&self) -> Option<(&str, &str)> {
        self.admin_username
            .as_deref()
            .zip(self.admin_password.as_deref())
    }

    // No gateway at all means notifications are only logged
    pub fn has_gateway(&self) -> bool {
        self.sms_gateway_url.is_some() || self.email_gateway_url.is_some()
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    optional(name).ok_or(ConfigError::Missing(name))
}

fn optional(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parsed<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match optional(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}
