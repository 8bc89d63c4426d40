//! Logging infrastructure for al-ranked.
//!
//! This module provides structured logging with optional daily-rotated log
//! files and module-specific log levels.

use crate::config::LoggingConfig;
use anyhow::{anyhow, Context, Result};
use std::path::Path;
use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log directory path
    pub log_dir: String,
    /// Component name (used for log file naming)
    pub component: String,
    /// Default log level
    pub default_level: Level,
    /// Enable console output
    pub console: bool,
    /// Enable file output
    pub file: bool,
    /// Enable JSON formatting for file logs
    pub json_format: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_dir: "logs".to_string(),
            component: "al-ranked".to_string(),
            default_level: Level::INFO,
            console: true,
            file: false,
            json_format: false,
        }
    }
}

impl LogConfig {
    /// Build from the `[logging]` config section.
    ///
    /// `verbose` forces debug level regardless of the configured one.
    pub fn from_settings(
        settings: &LoggingConfig,
        log_dir: &Path,
        component: &str,
        verbose: bool,
    ) -> Result<Self> {
        let default_level = if verbose {
            Level::DEBUG
        } else {
            parse_level(&settings.default_level)?
        };

        Ok(Self {
            log_dir: log_dir.to_string_lossy().to_string(),
            component: component.to_string(),
            default_level,
            console: settings.console,
            file: settings.file,
            json_format: settings.json_format,
        })
    }
}

/// Parse a level name such as `info` or `WARN`
pub fn parse_level(level: &str) -> Result<Level> {
    level
        .trim()
        .parse::<Level>()
        .map_err(|_| anyhow!("Invalid log level: {}", level))
}

/// Initialize logging with the given configuration
///
/// Sets up tracing with:
/// - Console output on stdout
/// - Optional daily-rotated file output, plain or JSON
/// - `RUST_LOG` override of the configured level
pub fn init(config: LogConfig) -> Result<()> {
    // Default to configured level, but allow override via RUST_LOG
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "{}={},shared={},al_ranked={},hyper=warn,reqwest=warn,h2=warn",
            config.component.replace('-', "_"),
            config.default_level,
            config.default_level,
            config.default_level
        ))
    });

    let mut layers = Vec::new();

    // Console layer (human-readable)
    if config.console {
        let console_layer = fmt::layer()
            .with_target(true)
            .with_level(true)
            .with_span_events(FmtSpan::NONE)
            .with_writer(std::io::stdout)
            .boxed();
        layers.push(console_layer);
    }

    // File layer with rotation
    if config.file {
        let log_dir = Path::new(&config.log_dir);
        std::fs::create_dir_all(log_dir)
            .with_context(|| format!("Failed to create log directory: {}", config.log_dir))?;

        let file_appender = tracing_appender::rolling::daily(log_dir, &config.component);

        let file_layer = if config.json_format {
            fmt::layer()
                .json()
                .with_target(true)
                .with_level(true)
                .with_current_span(true)
                .with_span_list(false)
                .with_writer(file_appender)
                .boxed()
        } else {
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_ansi(false)
                .with_span_events(FmtSpan::CLOSE)
                .with_writer(file_appender)
                .boxed()
        };

        layers.push(file_layer);
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(layers)
        .try_init()
        .context("Failed to initialize tracing subscriber")?;

    tracing::debug!(
        component = %config.component,
        log_dir = %config.log_dir,
        file = config.file,
        "Logging initialized"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logging_config() {
        let config = LogConfig::default();
        assert_eq!(config.component, "al-ranked");
        assert_eq!(config.default_level, Level::INFO);
        assert!(config.console);
        assert!(!config.file);
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("warn").unwrap(), Level::WARN);
        assert_eq!(parse_level(" DEBUG ").unwrap(), Level::DEBUG);
        assert!(parse_level("loud").is_err());
    }

    #[test]
    fn test_from_settings() -> Result<()> {
        let settings = LoggingConfig {
            default_level: "error".to_string(),
            file: true,
            json_format: true,
            ..Default::default()
        };

        let quiet = LogConfig::from_settings(&settings, Path::new("out/logs"), "al-ranked", false)?;
        assert_eq!(quiet.default_level, Level::ERROR);
        assert_eq!(quiet.log_dir, "out/logs");
        assert!(quiet.file && quiet.json_format);

        let verbose = LogConfig::from_settings(&settings, Path::new("out/logs"), "al-ranked", true)?;
        assert_eq!(verbose.default_level, Level::DEBUG);
        Ok(())
    }

    #[test]
    fn test_from_settings_rejects_bad_level() {
        let settings = LoggingConfig {
            default_level: "chatty".to_string(),
            ..Default::default()
        };
        assert!(LogConfig::from_settings(&settings, Path::new("logs"), "x", false).is_err());
    }
}
