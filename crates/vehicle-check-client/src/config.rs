//! Client configuration: API keys, endpoint URLs, request timeout.

use std::time::Duration;

/// Production OSAGO endpoint.
pub const DEFAULT_INSURANCE_API_URL: &str = "https://service.api-assist.com/parser/osago_api/";
/// Production fines endpoint.
pub const DEFAULT_FINES_API_URL: &str = "https://service.api-assist.com/parser/fines_api/";
/// Request timeout used unless overridden.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings for [`crate::VehicleCheckClient`].
#[derive(Clone)]
pub struct ClientConfig {
    pub insurance_api_key: String,
    pub fines_api_key: String,
    pub insurance_api_url: String,
    pub fines_api_url: String,
    pub timeout: Duration,
}

impl ClientConfig {
    /// Config with the given keys and the production endpoints.
    pub fn new(insurance_api_key: String, fines_api_key: String) -> Self {
        Self {
            insurance_api_key,
            fines_api_key,
            insurance_api_url: DEFAULT_INSURANCE_API_URL.to_string(),
            fines_api_url: DEFAULT_FINES_API_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Points the client at other endpoints (e.g. a mock server in tests).
    pub fn with_urls(mut self, insurance_api_url: String, fines_api_url: String) -> Self {
        self.insurance_api_url = insurance_api_url;
        self.fines_api_url = fines_api_url;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

// Keys stay out of Debug output so the config can be logged.
impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("insurance_api_key", &"***")
            .field("fines_api_key", &"***")
            .field("insurance_api_url", &self.insurance_api_url)
            .field("fines_api_url", &self.fines_api_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}
