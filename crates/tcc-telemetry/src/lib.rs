//! # TCC Telemetry
//!
//! Structured logging for TCC participants.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tcc_telemetry::{init_logging, TelemetryConfig};
//!
//! let config = TelemetryConfig::from_env();
//! init_logging(&config).expect("Failed to init logging");
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `OTEL_SERVICE_NAME` | `tcc-participant` | Service name in logs |
//! | `TCC_LOG_LEVEL` | `info` | Log level filter |
//! | `TCC_JSON_LOGS` | `false` | JSON output |

#![warn(missing_docs)]

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::init_logging;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// The log filter directive could not be parsed.
    #[error("Invalid log filter: {0}")]
    Filter(String),

    /// A global subscriber is already installed, or installation failed.
    #[error("Failed to initialize subscriber: {0}")]
    SubscriberInit(String),
}
