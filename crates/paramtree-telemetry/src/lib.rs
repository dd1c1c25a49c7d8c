//! Logging and metrics setup for paramtree.
//!
//! The library crates only emit `tracing` events and `metrics` counters.
//! This crate is for the host: it installs the subscriber and, optionally, a
//! Prometheus recorder.
//!
//! - **Logging**: `tracing-subscriber` with an `EnvFilter`, pretty or JSON
//! - **Metrics**: Prometheus text exposition via the `metrics` crate
//!
//! # Example
//!
//! ```rust,no_run
//! use paramtree_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let config = TelemetryConfig::builder()
//!     .log_level("paramtree_core=debug,info")
//!     .with_metrics()
//!     .build();
//!
//! init_telemetry(&config).expect("Failed to init telemetry");
//!
//! // ... load parameters ...
//!
//! if let Some(text) = paramtree_telemetry::render_metrics() {
//!     println!("{text}");
//! }
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;

pub use config::{TelemetryConfig, TelemetryConfigBuilder};
pub use error::TelemetryError;
pub use logging::{init_logging, LogConfig};
pub use crate::metrics::{init_metrics, render_metrics, MetricsConfig};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;

/// Initializes logging, then metrics.
///
/// # Errors
///
/// Returns `TelemetryError` if either subsystem fails to initialize.
pub fn init_telemetry(config: &TelemetryConfig) -> TelemetryResult<()> {
    init_logging(&config.logging)?;
    init_metrics(&config.metrics)?;
    Ok(())
}
