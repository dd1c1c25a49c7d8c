//! Configuration schema types.
//!
//! Each section maps onto the runtime type of the crate it configures.

use paramtree_core::LoadOptions;
use paramtree_telemetry::{LogConfig, MetricsConfig, TelemetryConfig};
use serde::{Deserialize, Serialize};

/// Parameter file loading section.
///
/// # Example
///
/// ```
/// use paramtree_config::LoaderSection;
/// use paramtree_core::LoadOptions;
///
/// let section = LoaderSection {
///     fail_on_existing: true,
///     cwd_fallback: false,
/// };
/// let options = LoadOptions::from(section);
/// assert!(options.fail_on_existing);
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoaderSection {
    /// Fail when a key is declared twice instead of overriding it.
    #[serde(default)]
    pub fail_on_existing: bool,

    /// Retry includes relative to the working directory.
    #[serde(default = "default_true")]
    pub cwd_fallback: bool,
}

impl Default for LoaderSection {
    fn default() -> Self {
        Self {
            fail_on_existing: false,
            cwd_fallback: true,
        }
    }
}

impl From<LoaderSection> for LoadOptions {
    fn from(section: LoaderSection) -> Self {
        Self::default()
            .with_fail_on_existing(section.fail_on_existing)
            .with_cwd_fallback(section.cwd_fallback)
    }
}

/// Collective build section.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct BroadcastSection {
    /// Rank that reads the parameter file.
    #[serde(default)]
    pub root: usize,
}

/// Log format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable pretty format.
    #[default]
    Pretty,
    /// JSON formatted logs.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingSection {
    /// Enable logging.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Filter directive (e.g. "info", "paramtree_core=debug,warn").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Include source file and line in logs.
    #[serde(default)]
    pub include_location: bool,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
            include_location: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Metrics configuration.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct MetricsSection {
    /// Install the Prometheus recorder.
    #[serde(default)]
    pub enabled: bool,
}

/// Telemetry configuration section.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct TelemetrySection {
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSection,

    /// Metrics configuration.
    #[serde(default)]
    pub metrics: MetricsSection,
}

impl From<&TelemetrySection> for TelemetryConfig {
    fn from(section: &TelemetrySection) -> Self {
        let logging = &section.logging;
        Self {
            logging: LogConfig {
                enabled: logging.enabled,
                level: logging.level.clone(),
                json_format: logging.format == LogFormat::Json,
                file_line_info: logging.include_location,
                ..LogConfig::default()
            },
            metrics: MetricsConfig {
                enabled: section.metrics.enabled,
            },
        }
    }
}

fn default_true() -> bool {
    true
}
