//! Configuration loader with layered approach.
//!
//! This module provides the [`ConfigLoader`] for loading configuration from
//! multiple sources: defaults, files, strings and environment variables.

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;

use crate::{ConfigError, LogFormat, ParamtreeConfig};

/// Default prefix for environment overrides.
pub const DEFAULT_ENV_PREFIX: &str = "PARAMTREE";

/// Configuration loader with layered approach.
///
/// Later layers override earlier ones:
/// 1. Default values (built into the code)
/// 2. Configuration file or string (TOML or JSON)
/// 3. Environment variables (`PREFIX__SECTION__KEY`)
///
/// # Example
///
/// ```no_run
/// use paramtree_config::ConfigLoader;
///
/// # fn main() -> Result<(), paramtree_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_defaults()
///     .with_file("paramtree.toml")?
///     .with_env_prefix("PARAMTREE")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConfigLoader {
    config: ParamtreeConfig,
    env_prefix: Option<String>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a new configuration loader holding the defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: ParamtreeConfig::default(),
            env_prefix: None,
        }
    }

    /// Reset to the built-in defaults.
    #[must_use]
    pub fn with_defaults(mut self) -> Self {
        self.config = ParamtreeConfig::default();
        self
    }

    /// Start from [`ParamtreeConfig::development`].
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.config = ParamtreeConfig::development();
        self
    }

    /// Start from [`ParamtreeConfig::production`].
    #[must_use]
    pub fn with_production(mut self) -> Self {
        self.config = ParamtreeConfig::production();
        self
    }

    /// Load configuration from a file. The format is chosen by extension.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file is missing, unreadable, has an
    /// unknown extension or does not match the schema.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;

        let extension = path.extension().and_then(|e| e.to_str()).map(str::to_lowercase);
        self.config = match extension.as_deref() {
            Some(format @ ("toml" | "json")) => Self::parse(&content, format)?,
            _ => return Err(ConfigError::unsupported_format(path.display().to_string())),
        };

        Ok(self)
    }

    /// Load configuration from a file if it exists.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file exists but cannot be loaded.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Load configuration from a string in `format` ("toml" or "json").
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if parsing fails.
    ///
    /// # Example
    ///
    /// ```
    /// use paramtree_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string("[broadcast]\nroot = 2\n", "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.broadcast.root, 2);
    /// ```
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        self.config = Self::parse(content, &format.to_lowercase())?;
        Ok(self)
    }

    /// Set environment variable prefix for overrides.
    ///
    /// Environment variables use the format `PREFIX__SECTION__KEY`, e.g.
    /// `PARAMTREE__LOADER__FAIL_ON_EXISTING=true` or
    /// `PARAMTREE__TELEMETRY__LOGGING__LEVEL=debug`.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Load a `.env` file into the process environment, if one exists.
    #[must_use]
    pub fn with_dotenv(self) -> Self {
        let _ = dotenvy::dotenv();
        self
    }

    /// Apply environment overrides and validate.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an override does not parse or validation
    /// fails.
    pub fn load(mut self) -> Result<ParamtreeConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            self.apply_env_overrides(&prefix)?;
        }

        self.config.validate()?;

        Ok(self.config)
    }

    /// Finalize without environment overrides or validation.
    #[must_use]
    pub fn load_unvalidated(self) -> ParamtreeConfig {
        self.config
    }

    fn parse<T: DeserializeOwned>(content: &str, format: &str) -> Result<T, ConfigError> {
        match format {
            "toml" => Ok(toml::from_str(content)?),
            "json" => Ok(serde_json::from_str(content)?),
            other => Err(ConfigError::unsupported_format(other)),
        }
    }

    fn apply_env_overrides(&mut self, prefix: &str) -> Result<(), ConfigError> {
        let marker = format!("{prefix}__");
        let env_vars: BTreeMap<String, String> = env::vars().filter(|(k, _)| k.starts_with(&marker)).collect();

        for (key, value) in env_vars {
            self.apply_env_var(&key, &value, prefix)?;
        }

        Ok(())
    }

    fn apply_env_var(&mut self, key: &str, value: &str, prefix: &str) -> Result<(), ConfigError> {
        let key_without_prefix = key
            .strip_prefix(prefix)
            .and_then(|k| k.strip_prefix("__"))
            .ok_or_else(|| ConfigError::env_parse_error(key, "invalid key format"))?;

        let parts: Vec<&str> = key_without_prefix.split("__").collect();
        let boolean = || parse_bool(value).ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"));

        match parts.as_slice() {
            ["LOADER", "FAIL_ON_EXISTING"] => {
                self.config.loader.fail_on_existing = boolean()?;
            }
            ["LOADER", "CWD_FALLBACK"] => {
                self.config.loader.cwd_fallback = boolean()?;
            }
            ["BROADCAST", "ROOT"] => {
                self.config.broadcast.root = value
                    .parse()
                    .map_err(|_| ConfigError::env_parse_error(key, "expected non-negative integer"))?;
            }
            ["TELEMETRY", "LOGGING", "ENABLED"] => {
                self.config.telemetry.logging.enabled = boolean()?;
            }
            ["TELEMETRY", "LOGGING", "LEVEL"] => {
                self.config.telemetry.logging.level = value.to_string();
            }
            ["TELEMETRY", "LOGGING", "FORMAT"] => {
                self.config.telemetry.logging.format = match value.to_lowercase().as_str() {
                    "pretty" => LogFormat::Pretty,
                    "json" => LogFormat::Json,
                    _ => return Err(ConfigError::env_parse_error(key, "expected 'pretty' or 'json'")),
                };
            }
            ["TELEMETRY", "LOGGING", "INCLUDE_LOCATION"] => {
                self.config.telemetry.logging.include_location = boolean()?;
            }
            ["TELEMETRY", "METRICS", "ENABLED"] => {
                self.config.telemetry.metrics.enabled = boolean()?;
            }
            _ => {
                return Err(ConfigError::env_parse_error(key, "unknown configuration key"));
            }
        }

        Ok(())
    }
}

/// Parse a boolean from a string.
fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loader_new() {
        let config = ConfigLoader::new().load().unwrap();
        assert_eq!(config, ParamtreeConfig::default());
    }

    #[test]
    fn test_loader_presets() {
        let config = ConfigLoader::new().with_production().load().unwrap();
        assert!(config.loader.fail_on_existing);
        let config = ConfigLoader::new().with_development().with_defaults().load().unwrap();
        assert_eq!(config.telemetry.logging.level, "info");
    }

    #[test]
    fn test_loader_with_string_toml() {
        let toml = r#"
            [loader]
            cwd_fallback = false

            [telemetry.logging]
            format = "json"
        "#;

        let config = ConfigLoader::new().with_string(toml, "toml").unwrap().load().unwrap();

        assert!(!config.loader.cwd_fallback);
        assert!(!config.loader.fail_on_existing);
        assert_eq!(config.telemetry.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_loader_with_string_json() {
        let json = r#"{"broadcast": {"root": 4}, "telemetry": {"metrics": {"enabled": true}}}"#;
        let config = ConfigLoader::new().with_string(json, "JSON").unwrap().load().unwrap();
        assert_eq!(config.broadcast.root, 4);
        assert!(config.telemetry.metrics.enabled);
    }

    #[test]
    fn test_loader_rejects_unknown_format_and_fields() {
        assert!(matches!(
            ConfigLoader::new().with_string("", "yaml"),
            Err(ConfigError::UnsupportedFormat { .. })
        ));
        assert!(matches!(
            ConfigLoader::new().with_string("[server]\nport = 1\n", "toml"),
            Err(ConfigError::TomlError(_))
        ));
    }

    #[test]
    fn test_loader_with_file_not_found() {
        let result = ConfigLoader::new().with_file("/nonexistent/paramtree.toml");
        assert!(matches!(result, Err(ConfigError::FileNotFound { .. })));
    }

    #[test]
    fn test_loader_with_optional_file_not_found() {
        let config = ConfigLoader::new()
            .with_optional_file("/nonexistent/paramtree.toml")
            .unwrap()
            .load()
            .unwrap();
        assert_eq!(config, ParamtreeConfig::default());
    }

    #[test]
    fn test_load_validates() {
        let result = ConfigLoader::new()
            .with_string("[telemetry.logging]\nlevel = \"paramtree_core=loud\"\n", "toml")
            .unwrap()
            .load();
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool("on"), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("off"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
        assert_eq!(parse_bool(""), None);
    }

    #[test]
    fn test_apply_env_var_loader() {
        let mut loader = ConfigLoader::new();
        loader.apply_env_var("TEST__LOADER__FAIL_ON_EXISTING", "yes", "TEST").unwrap();
        loader.apply_env_var("TEST__LOADER__CWD_FALLBACK", "false", "TEST").unwrap();
        assert!(loader.config.loader.fail_on_existing);
        assert!(!loader.config.loader.cwd_fallback);
    }

    #[test]
    fn test_apply_env_var_broadcast_root() {
        let mut loader = ConfigLoader::new();
        loader.apply_env_var("TEST__BROADCAST__ROOT", "3", "TEST").unwrap();
        assert_eq!(loader.config.broadcast.root, 3);
        assert!(loader.apply_env_var("TEST__BROADCAST__ROOT", "-1", "TEST").is_err());
    }

    #[test]
    fn test_apply_env_var_telemetry() {
        let mut loader = ConfigLoader::new();
        loader.apply_env_var("TEST__TELEMETRY__LOGGING__LEVEL", "debug", "TEST").unwrap();
        loader.apply_env_var("TEST__TELEMETRY__LOGGING__FORMAT", "JSON", "TEST").unwrap();
        loader.apply_env_var("TEST__TELEMETRY__METRICS__ENABLED", "1", "TEST").unwrap();
        assert_eq!(loader.config.telemetry.logging.level, "debug");
        assert_eq!(loader.config.telemetry.logging.format, LogFormat::Json);
        assert!(loader.config.telemetry.metrics.enabled);
    }

    #[test]
    fn test_apply_env_var_errors() {
        let mut loader = ConfigLoader::new();
        assert!(loader.apply_env_var("TEST__LOADER__CWD_FALLBACK", "perhaps", "TEST").is_err());
        assert!(loader.apply_env_var("TEST__LOADER__DEPTH", "3", "TEST").is_err());
        assert!(loader.apply_env_var("TEST__TELEMETRY__LOGGING__FORMAT", "xml", "TEST").is_err());
    }
}
