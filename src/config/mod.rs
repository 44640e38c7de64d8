//! Configuration management.
//!
//! Settings come from, in increasing precedence:
//!
//! 1. Built-in defaults
//! 2. A TOML file: `--config`, else `SIXDEG_CONFIG_PATH`, else
//!    `<config_dir>/sixdeg/config.toml`
//! 3. `SIXDEG_*` environment variables
//!
//! ```toml
//! graph_path = "people.json"
//! history_capacity = 50
//! history_display = 5
//! rankings_display = 8
//!
//! [logging]
//! format = "json"
//! file = "/var/log/sixdeg.log"
//! level = "sixdeg=debug"
//!
//! [metrics]
//! enabled = true
//! ```

use crate::services::DEFAULT_HISTORY_CAPACITY;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "SIXDEG_CONFIG_PATH";

/// Main configuration for sixdeg.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SixDegConfig {
    /// Graph file loaded at startup; the demo network when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graph_path: Option<PathBuf>,
    /// Number of searches retained in history.
    pub history_capacity: NonZeroUsize,
    /// Number of history rows shown by the CLI.
    pub history_display: usize,
    /// Number of ranking rows shown by the CLI.
    pub rankings_display: usize,
    /// Logging settings.
    pub logging: LoggingSettings,
    /// Metrics settings.
    pub metrics: MetricsSettings,
}

/// `[logging]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingSettings {
    /// Output format: `pretty` or `json`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Append logs to this file instead of stderr.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    /// Default filter directive, e.g. `info` or `sixdeg=debug`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
}

/// `[metrics]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricsSettings {
    /// Install the Prometheus recorder.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Graph file path.
    pub graph_path: Option<String>,
    /// History capacity.
    pub history_capacity: Option<usize>,
    /// History rows displayed.
    pub history_display: Option<usize>,
    /// Ranking rows displayed.
    pub rankings_display: Option<usize>,
    /// Logging section.
    pub logging: Option<LoggingSettings>,
    /// Metrics section.
    pub metrics: Option<MetricsSettings>,
}

impl Default for SixDegConfig {
    fn default() -> Self {
        Self {
            graph_path: None,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            history_display: 5,
            rankings_display: 8,
            logging: LoggingSettings::default(),
            metrics: MetricsSettings::default(),
        }
    }
}

impl SixDegConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the effective configuration.
    ///
    /// Uses `explicit` if given, else [`CONFIG_PATH_ENV`], else the default
    /// location, then applies environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly named file cannot be loaded or an
    /// override is invalid.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::load_from_file(path)?,
            None => match std::env::var(CONFIG_PATH_ENV) {
                Ok(path) if !path.trim().is_empty() => Self::load_from_file(Path::new(&path))?,
                _ => Self::load_default(),
            },
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Loads configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or a value is
    /// out of range.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::OperationFailed {
            operation: "read_config_file".to_string(),
            cause: format!("{}: {e}", path.display()),
        })?;

        let file: ConfigFile = toml::from_str(&contents).map_err(|e| Error::OperationFailed {
            operation: "parse_config_file".to_string(),
            cause: e.to_string(),
        })?;

        Self::from_config_file(file)
    }

    /// Loads configuration from the default location.
    ///
    /// Checks the platform config dir, then `~/.config/sixdeg/`. Returns
    /// defaults if no usable file is found.
    #[must_use]
    pub fn load_default() -> Self {
        let Some(base_dirs) = directories::BaseDirs::new() else {
            return Self::default();
        };

        let candidates = [
            base_dirs.config_dir().join("sixdeg").join("config.toml"),
            base_dirs
                .home_dir()
                .join(".config")
                .join("sixdeg")
                .join("config.toml"),
        ];

        for path in candidates.iter().filter(|p| p.exists()) {
            match Self::load_from_file(path) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Ignoring config file");
                },
            }
        }

        Self::default()
    }

    /// Applies `SIXDEG_*` environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if an override cannot be parsed.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(path) = lookup("SIXDEG_GRAPH_PATH") {
            self.graph_path = Some(PathBuf::from(path));
        }
        if let Some(raw) = lookup("SIXDEG_HISTORY_CAPACITY") {
            let capacity = raw.trim().parse::<usize>().map_err(|e| {
                Error::InvalidInput(format!("SIXDEG_HISTORY_CAPACITY '{raw}': {e}"))
            })?;
            self.history_capacity = history_capacity(capacity)?;
        }
        if let Some(format) = lookup("SIXDEG_LOG_FORMAT") {
            self.logging.format = Some(format);
        }
        if let Some(file) = lookup("SIXDEG_LOG_FILE") {
            self.logging.file = Some(PathBuf::from(file));
        }
        if let Some(raw) = lookup("SIXDEG_METRICS_ENABLED") {
            self.metrics.enabled = Some(parse_bool(&raw).ok_or_else(|| {
                Error::InvalidInput(format!("SIXDEG_METRICS_ENABLED '{raw}' is not a boolean"))
            })?);
        }
        Ok(())
    }

    /// Converts a `ConfigFile` to `SixDegConfig`.
    fn from_config_file(file: ConfigFile) -> Result<Self> {
        let mut config = Self::default();

        if let Some(path) = file.graph_path {
            config.graph_path = Some(PathBuf::from(path));
        }
        if let Some(capacity) = file.history_capacity {
            config.history_capacity = history_capacity(capacity)?;
        }
        if let Some(rows) = file.history_display {
            config.history_display = rows;
        }
        if let Some(rows) = file.rankings_display {
            config.rankings_display = rows;
        }
        if let Some(logging) = file.logging {
            config.logging = logging;
        }
        if let Some(metrics) = file.metrics {
            config.metrics = metrics;
        }

        Ok(config)
    }

    /// Sets the graph file path.
    #[must_use]
    pub fn with_graph_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.graph_path = Some(path.into());
        self
    }

    /// Returns `true` if the metrics recorder should be installed.
    #[must_use]
    pub fn metrics_enabled(&self) -> bool {
        self.metrics.enabled.unwrap_or(false)
    }

    /// Renders the configuration as TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::OperationFailed {
            operation: "serialize_config".to_string(),
            cause: e.to_string(),
        })
    }
}

fn history_capacity(value: usize) -> Result<NonZeroUsize> {
    NonZeroUsize::new(value)
        .ok_or_else(|| Error::InvalidInput("history_capacity must be at least 1".to_string()))
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
