//! Bot configuration, loaded once from environment variables and passed explicitly to components.

use dbot_core::{DbotError, Result};
use std::env;
use std::time::Duration;
use vehicle_check_client::{ClientConfig, DEFAULT_FINES_API_URL, DEFAULT_INSURANCE_API_URL};

const DEFAULT_LOG_FILE: &str = "logs/vehicle-check-bot.log";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Immutable bot configuration.
#[derive(Clone)]
pub struct BotConfig {
    /// TELEGRAM_BOT_TOKEN (or `--token`)
    pub bot_token: String,
    /// OSAGO_API_KEY
    pub osago_api_key: String,
    /// FINES_API_KEY
    pub fines_api_key: String,
    /// OSAGO_API_URL
    pub osago_api_url: String,
    /// FINES_API_URL
    pub fines_api_url: String,
    /// HTTP_TIMEOUT_SECS; applies to every upstream lookup
    pub http_timeout: Duration,
    /// TELEGRAM_API_URL or TELOXIDE_API_URL
    pub telegram_api_url: Option<String>,
    /// LOG_FILE
    pub log_file: String,
}

/// Value of a required variable; missing and blank values are both errors.
fn required(name: &str) -> Result<String> {
    env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| DbotError::Config(format!("Missing {} environment variable.", name)))
}

fn optional(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

impl BotConfig {
    /// Loads from environment variables. `token` overrides TELEGRAM_BOT_TOKEN when provided.
    pub fn load(token: Option<String>) -> Result<Self> {
        let bot_token = match token.filter(|t| !t.trim().is_empty()) {
            Some(token) => token,
            None => required("TELEGRAM_BOT_TOKEN")?,
        };
        let osago_api_key = required("OSAGO_API_KEY")?;
        let fines_api_key = required("FINES_API_KEY")?;
        let osago_api_url =
            optional("OSAGO_API_URL").unwrap_or_else(|| DEFAULT_INSURANCE_API_URL.to_string());
        let fines_api_url =
            optional("FINES_API_URL").unwrap_or_else(|| DEFAULT_FINES_API_URL.to_string());
        let http_timeout_secs = match optional("HTTP_TIMEOUT_SECS") {
            Some(value) => value.trim().parse().map_err(|_| {
                DbotError::Config(format!(
                    "HTTP_TIMEOUT_SECS must be a whole number of seconds: {}",
                    value
                ))
            })?,
            None => DEFAULT_HTTP_TIMEOUT_SECS,
        };
        let telegram_api_url = optional("TELEGRAM_API_URL").or_else(|| optional("TELOXIDE_API_URL"));
        let log_file = optional("LOG_FILE").unwrap_or_else(|| DEFAULT_LOG_FILE.to_string());

        Ok(Self {
            bot_token,
            osago_api_key,
            fines_api_key,
            osago_api_url,
            fines_api_url,
            http_timeout: Duration::from_secs(http_timeout_secs),
            telegram_api_url,
            log_file,
        })
    }

    /// Rejects URL settings that do not parse and a zero timeout.
    pub fn validate(&self) -> Result<()> {
        let urls = [
            ("OSAGO_API_URL", Some(&self.osago_api_url)),
            ("FINES_API_URL", Some(&self.fines_api_url)),
            ("TELEGRAM_API_URL", self.telegram_api_url.as_ref()),
        ];
        for (name, value) in urls {
            if let Some(url) = value {
                if reqwest::Url::parse(url).is_err() {
                    return Err(DbotError::Config(format!(
                        "{} is set but not a valid URL: {}",
                        name, url
                    )));
                }
            }
        }
        if self.http_timeout.is_zero() {
            return Err(DbotError::Config(
                "HTTP_TIMEOUT_SECS must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Settings for the upstream API client.
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(self.osago_api_key.clone(), self.fines_api_key.clone())
            .with_urls(self.osago_api_url.clone(), self.fines_api_url.clone())
            .with_timeout(self.http_timeout)
    }
}

// Secrets stay out of Debug output so the config can be logged at startup.
impl std::fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotConfig")
            .field("bot_token", &"***")
            .field("osago_api_key", &"***")
            .field("fines_api_key", &"***")
            .field("osago_api_url", &self.osago_api_url)
            .field("fines_api_url", &self.fines_api_url)
            .field("http_timeout", &self.http_timeout)
            .field("telegram_api_url", &self.telegram_api_url)
            .field("log_file", &self.log_file)
            .finish()
    }
}
