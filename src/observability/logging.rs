//! Structured logging configuration.

use crate::config::LoggingSettings;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Environment variables consulted for the filter directive, in order.
const FILTER_ENV: [&str; 2] = ["SIXDEG_LOG", "RUST_LOG"];

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable multi-line output.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

impl LogFormat {
    /// Parses a format name, case-insensitively.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Some(Self::Pretty),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Resolved logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Output format.
    pub format: LogFormat,
    /// Append to this file instead of stderr.
    pub file: Option<PathBuf>,
    /// `EnvFilter` directive.
    pub directive: String,
}

impl LoggingConfig {
    /// Resolves logging from config settings and the process environment.
    #[must_use]
    pub fn from_settings(settings: &LoggingSettings, verbose: bool) -> Self {
        let env = FILTER_ENV
            .iter()
            .find_map(|key| std::env::var(key).ok().filter(|v| !v.trim().is_empty()));
        Self::resolve(settings, env, verbose)
    }

    fn resolve(settings: &LoggingSettings, env: Option<String>, verbose: bool) -> Self {
        let format = settings
            .format
            .as_deref()
            .and_then(|f| {
                let parsed = LogFormat::parse(f);
                if parsed.is_none() {
                    tracing::warn!(format = f, "Unknown log format, using pretty");
                }
                parsed
            })
            .unwrap_or_default();

        let directive = env.unwrap_or_else(|| {
            if verbose {
                "debug".to_string()
            } else {
                settings.level.clone().unwrap_or_else(|| "warn".to_string())
            }
        });

        Self {
            format,
            file: settings.file.clone(),
            directive,
        }
    }

    /// Builds the filter, falling back to `warn` on a bad directive.
    #[must_use]
    pub fn filter(&self) -> EnvFilter {
        EnvFilter::try_new(&self.directive).unwrap_or_else(|_| EnvFilter::new("warn"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("json" => Some(LogFormat::Json); "json")]
    #[test_case(" Pretty " => Some(LogFormat::Pretty); "pretty padded")]
    #[test_case("text" => Some(LogFormat::Pretty); "text alias")]
    #[test_case("xml" => None; "unknown")]
    fn test_parse_format(input: &str) -> Option<LogFormat> {
        LogFormat::parse(input)
    }

    #[test]
    fn test_env_directive_wins() {
        let settings = LoggingSettings {
            level: Some("info".to_string()),
            ..LoggingSettings::default()
        };
        let config = LoggingConfig::resolve(&settings, Some("trace".to_string()), true);
        assert_eq!(config.directive, "trace");
    }

    #[test]
    fn test_verbose_overrides_configured_level() {
        let settings = LoggingSettings {
            level: Some("info".to_string()),
            format: Some("json".to_string()),
            ..LoggingSettings::default()
        };
        let config = LoggingConfig::resolve(&settings, None, true);
        assert_eq!(config.directive, "debug");
        assert_eq!(config.format, LogFormat::Json);
    }

    #[test]
    fn test_defaults_to_warn() {
        let config = LoggingConfig::resolve(&LoggingSettings::default(), None, false);
        assert_eq!(config.directive, "warn");
        assert_eq!(config.format, LogFormat::Pretty);
        assert!(config.file.is_none());
    }
}
