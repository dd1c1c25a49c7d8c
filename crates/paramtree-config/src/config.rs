//! Root configuration type.

use paramtree_bcast::ParallelBuild;
use paramtree_core::LoadOptions;
use paramtree_telemetry::logging::create_env_filter;
use paramtree_telemetry::TelemetryConfig;
use serde::{Deserialize, Serialize};

use crate::{BroadcastSection, ConfigError, LoaderSection, LogFormat, LoggingSection, TelemetrySection};

/// Root configuration for a host embedding paramtree.
///
/// # Example
///
/// ```
/// use paramtree_config::ParamtreeConfig;
///
/// let config: ParamtreeConfig = toml::from_str(r#"
///     [loader]
///     fail_on_existing = true
///
///     [broadcast]
///     root = 1
/// "#).unwrap();
///
/// assert!(config.load_options().fail_on_existing);
/// assert_eq!(config.parallel_build().root, 1);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ParamtreeConfig {
    /// Parameter file loading.
    #[serde(default)]
    pub loader: LoaderSection,

    /// Collective build.
    #[serde(default)]
    pub broadcast: BroadcastSection,

    /// Logging and metrics.
    #[serde(default)]
    pub telemetry: TelemetrySection,
}

impl ParamtreeConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> ParamtreeConfigBuilder {
        ParamtreeConfigBuilder::new()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if the log filter directive does
    /// not parse.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let logging = &self.telemetry.logging;
        if logging.enabled {
            create_env_filter(&logging.level)
                .map_err(|e| ConfigError::invalid_value("telemetry.logging.level", e.to_string()))?;
        }
        Ok(())
    }

    /// Debug logging in pretty format, with source locations.
    #[must_use]
    pub fn development() -> Self {
        Self {
            telemetry: TelemetrySection {
                logging: LoggingSection {
                    level: "debug".to_string(),
                    format: LogFormat::Pretty,
                    include_location: true,
                    ..LoggingSection::default()
                },
                ..TelemetrySection::default()
            },
            ..Self::default()
        }
    }

    /// Strict loading, JSON logs and Prometheus metrics.
    #[must_use]
    pub fn production() -> Self {
        Self {
            loader: LoaderSection {
                fail_on_existing: true,
                cwd_fallback: false,
            },
            telemetry: TelemetrySection {
                logging: LoggingSection {
                    format: LogFormat::Json,
                    ..LoggingSection::default()
                },
                metrics: crate::MetricsSection { enabled: true },
            },
            ..Self::default()
        }
    }

    /// Options for loading parameter files.
    #[must_use]
    pub fn load_options(&self) -> LoadOptions {
        self.loader.into()
    }

    /// Settings for a collective build.
    #[must_use]
    pub fn parallel_build(&self) -> ParallelBuild {
        ParallelBuild::new()
            .with_root(self.broadcast.root)
            .with_options(self.load_options())
    }

    /// Settings for `paramtree_telemetry::init_telemetry`.
    #[must_use]
    pub fn telemetry_config(&self) -> TelemetryConfig {
        TelemetryConfig::from(&self.telemetry)
    }
}

/// Builder for [`ParamtreeConfig`].
#[derive(Debug, Default)]
pub struct ParamtreeConfigBuilder {
    loader: Option<LoaderSection>,
    broadcast: Option<BroadcastSection>,
    telemetry: Option<TelemetrySection>,
}

impl ParamtreeConfigBuilder {
    /// Create a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the loader configuration.
    #[must_use]
    pub fn loader(mut self, loader: LoaderSection) -> Self {
        self.loader = Some(loader);
        self
    }

    /// Set the broadcast configuration.
    #[must_use]
    pub fn broadcast(mut self, broadcast: BroadcastSection) -> Self {
        self.broadcast = Some(broadcast);
        self
    }

    /// Set the telemetry configuration.
    #[must_use]
    pub fn telemetry(mut self, telemetry: TelemetrySection) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    /// Build the configuration.
    ///
    /// Any unset sections will use their default values.
    #[must_use]
    pub fn build(self) -> ParamtreeConfig {
        ParamtreeConfig {
            loader: self.loader.unwrap_or_default(),
            broadcast: self.broadcast.unwrap_or_default(),
            telemetry: self.telemetry.unwrap_or_default(),
        }
    }

    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if validation fails.
    pub fn build_validated(self) -> Result<ParamtreeConfig, ConfigError> {
        let config = self.build();
        config.validate()?;
        Ok(config)
    }
}
