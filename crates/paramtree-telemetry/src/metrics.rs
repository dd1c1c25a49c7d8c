//! Prometheus metrics for paramtree.
//!
//! The loader and broadcast crates record through the `metrics` macros
//! unconditionally; without an installed recorder that is a no-op. This
//! module installs a Prometheus recorder (no HTTP listener) so a host can
//! render the counters itself.
//!
//! # Standard Metrics
//!
//! | Metric | Type | Description |
//! |--------|------|-------------|
//! | `paramtree_files_loaded_total` | Counter | Parameter files read, includes counted |
//! | `paramtree_lines_parsed_total` | Counter | Input lines processed |
//! | `paramtree_parameters_written_total` | Counter | Entries stored |
//! | `paramtree_broadcast_bytes_total` | Counter | Flattened bytes sent by a root |

use crate::error::TelemetryError;
use crate::TelemetryResult;
use metrics::describe_counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

/// Global metrics handle for rendering.
static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

pub use paramtree_core::counters::{BROADCAST_BYTES, FILES_LOADED, LINES_PARSED, PARAMETERS_WRITTEN};

/// Metrics configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricsConfig {
    /// Whether to install the Prometheus recorder.
    pub enabled: bool,
}

/// Installs the global Prometheus recorder.
///
/// Calling this again after a successful install is a no-op.
///
/// # Errors
///
/// Returns `TelemetryError::MetricsInit` if another recorder is already
/// installed.
pub fn init_metrics(config: &MetricsConfig) -> TelemetryResult<()> {
    if !config.enabled || METRICS_HANDLE.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;

    let _ = METRICS_HANDLE.set(handle);
    register_metric_descriptions();

    Ok(())
}

/// Returns the global metrics handle if initialized.
pub fn get_metrics_handle() -> Option<&'static PrometheusHandle> {
    METRICS_HANDLE.get()
}

/// Renders metrics in Prometheus text format.
///
/// Returns `None` if metrics are not initialized.
#[must_use]
pub fn render_metrics() -> Option<String> {
    METRICS_HANDLE.get().map(PrometheusHandle::render)
}

fn register_metric_descriptions() {
    describe_counter!(FILES_LOADED, "Parameter files read, including nested includes");
    describe_counter!(LINES_PARSED, "Parameter input lines processed");
    describe_counter!(PARAMETERS_WRITTEN, "Parameter entries stored");
    describe_counter!(BROADCAST_BYTES, "Flattened parameter bytes broadcast by a root");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_disabled() {
        assert!(!MetricsConfig::default().enabled);
    }

    #[test]
    fn test_disabled_metrics_install_nothing() {
        init_metrics(&MetricsConfig::default()).unwrap();
    }

    #[test]
    fn test_reexported_names_match_core() {
        assert_eq!(PARAMETERS_WRITTEN, "paramtree_parameters_written_total");
        assert_eq!(
            [FILES_LOADED, LINES_PARSED, PARAMETERS_WRITTEN, BROADCAST_BYTES],
            paramtree_core::counters::ALL
        );
    }
}
