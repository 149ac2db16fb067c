//! Configuration for the log shipper

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipperConfig {
    /// Value of the `service.name` attribute stamped on every event
    pub service_name: String,

    /// Ingestion host, without scheme or path
    pub endpoint: String,

    /// Token sent in every payload
    pub token: String,

    /// Echo every log call to a local text stream
    pub passthrough: bool,

    /// Use `http://` instead of `https://`
    pub insecure: bool,

    /// Disable asynchronous delivery entirely
    pub noop: bool,

    /// Maximum number of events per delivered batch
    pub max_batch_size: usize,

    /// Maximum age of a partially filled batch
    pub batch_interval: Duration,

    /// Client-side timeout for a single delivery request
    pub http_timeout: Duration,
}

impl Default for ShipperConfig {
    fn default() -> Self {
        Self {
            service_name: "my_server".to_string(),
            endpoint: "ingress.vigilant.run".to_string(),
            token: "tk_1234567890".to_string(),
            passthrough: true,
            insecure: false,
            noop: false,
            max_batch_size: 1000,
            batch_interval: Duration::from_millis(100),
            http_timeout: Duration::from_secs(10),
        }
    }
}

impl ShipperConfig {
    /// Configuration for a directly constructed shipper.
    ///
    /// Unlike [`ShipperConfig::default`], passthrough is off and batches hold at
    /// most 100 events.
    pub fn new(
        service_name: impl Into<String>,
        endpoint: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            service_name: service_name.into(),
            endpoint: endpoint.into(),
            token: token.into(),
            passthrough: false,
            insecure: false,
            noop: false,
            max_batch_size: 100,
            batch_interval: Duration::from_millis(100),
            http_timeout: Duration::from_secs(10),
        }
    }

    pub fn with_service_name(mut self, service_name: impl Into<String>) -> Self {
        self.service_name = service_name.into();
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = token.into();
        self
    }

    pub fn with_passthrough(mut self, passthrough: bool) -> Self {
        self.passthrough = passthrough;
        self
    }

    pub fn with_insecure(mut self, insecure: bool) -> Self {
        self.insecure = insecure;
        self
    }

    pub fn with_noop(mut self, noop: bool) -> Self {
        self.noop = noop;
        self
    }

    pub fn with_max_batch_size(mut self, max_batch_size: usize) -> Self {
        self.max_batch_size = max_batch_size;
        self
    }

    pub fn with_batch_interval(mut self, batch_interval: Duration) -> Self {
        self.batch_interval = batch_interval;
        self
    }

    pub fn with_http_timeout(mut self, http_timeout: Duration) -> Self {
        self.http_timeout = http_timeout;
        self
    }

    /// Load configuration from environment variables on top of the defaults
    pub fn from_env() -> Self {
        let mut config = ShipperConfig::default();

        if let Ok(service_name) = env::var("LOG_SHIPPER_SERVICE_NAME") {
            config.service_name = service_name;
        }

        if let Ok(endpoint) = env::var("LOG_SHIPPER_ENDPOINT") {
            config.endpoint = endpoint;
        }

        if let Ok(token) = env::var("LOG_SHIPPER_TOKEN") {
            config.token = token;
        }

        if let Ok(passthrough) = env::var("LOG_SHIPPER_PASSTHROUGH") {
            config.passthrough = passthrough.to_lowercase() == "true";
        }

        if let Ok(insecure) = env::var("LOG_SHIPPER_INSECURE") {
            config.insecure = insecure.to_lowercase() == "true";
        }

        if let Ok(noop) = env::var("LOG_SHIPPER_NOOP") {
            config.noop = noop.to_lowercase() == "true";
        }

        if let Ok(batch_size) = env::var("LOG_SHIPPER_MAX_BATCH_SIZE") {
            if let Ok(size) = batch_size.parse() {
                config.max_batch_size = size;
            }
        }

        if let Ok(interval) = env::var("LOG_SHIPPER_BATCH_INTERVAL_MS") {
            if let Ok(ms) = interval.parse::<u64>() {
                config.batch_interval = Duration::from_millis(ms);
            }
        }

        if let Ok(timeout) = env::var("LOG_SHIPPER_HTTP_TIMEOUT_SECONDS") {
            if let Ok(seconds) = timeout.parse::<u64>() {
                config.http_timeout = Duration::from_secs(seconds);
            }
        }

        config
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_batch_size == 0 {
            return Err("max_batch_size must be greater than 0".to_string());
        }

        if self.batch_interval.is_zero() {
            return Err("batch_interval must be greater than 0".to_string());
        }

        Ok(())
    }

    /// Full URL batches are posted to
    pub fn target_url(&self) -> String {
        let scheme = if self.insecure { "http" } else { "https" };
        format!("{}://{}/api/message", scheme, self.endpoint)
    }
}
