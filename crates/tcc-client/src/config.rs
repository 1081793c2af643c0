//! Client configuration with validation.

use crate::domain::{TccError, TransOptions};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Participant configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TccConfig {
    /// Coordinator base address, e.g. `http://localhost:36789/api/dtmsvr`
    pub coordinator_url: String,
    /// Per-request timeout for coordinator and branch calls
    pub request_timeout: Duration,
    /// TCP connect timeout
    pub connect_timeout: Duration,
    /// Options applied to every transaction opened by this client
    pub options: TransOptions,
}

impl Default for TccConfig {
    fn default() -> Self {
        Self {
            coordinator_url: "http://localhost:36789/api/dtmsvr".to_string(),
            request_timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(3),
            options: TransOptions::default(),
        }
    }
}

impl TccConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `TCC_COORDINATOR_URL`: coordinator address
    /// - `TCC_REQUEST_TIMEOUT_SECS`: request timeout (default: 10)
    /// - `TCC_CONNECT_TIMEOUT_SECS`: connect timeout (default: 3)
    /// - `TCC_WAIT_RESULT`: ask for synchronous submit (default: false)
    /// - `TCC_TIMEOUT_TO_FAIL_SECS`: coordinator-side give-up timeout
    /// - `TCC_RETRY_INTERVAL_SECS`: coordinator-side callback retry interval
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let secs = |key: &str| env::var(key).ok().and_then(|v| v.parse::<u64>().ok());

        Self {
            coordinator_url: env::var("TCC_COORDINATOR_URL").unwrap_or(defaults.coordinator_url),

            request_timeout: secs("TCC_REQUEST_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),

            connect_timeout: secs("TCC_CONNECT_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.connect_timeout),

            options: TransOptions {
                wait_result: env::var("TCC_WAIT_RESULT")
                    .map(|v| v.to_lowercase() == "true" || v == "1")
                    .unwrap_or(false),
                timeout_to_fail: secs("TCC_TIMEOUT_TO_FAIL_SECS").unwrap_or(0),
                retry_interval: secs("TCC_RETRY_INTERVAL_SECS").unwrap_or(0),
                ..TransOptions::default()
            },
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), TccError> {
        if self.coordinator_url.trim().is_empty() {
            return Err(TccError::Config("coordinator_url cannot be empty".into()));
        }

        if self.request_timeout.is_zero() {
            return Err(TccError::Config("request_timeout cannot be 0".into()));
        }

        if self.connect_timeout.is_zero() {
            return Err(TccError::Config("connect_timeout cannot be 0".into()));
        }

        Ok(())
    }
}
