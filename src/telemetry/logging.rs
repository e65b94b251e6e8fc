//! Structured logging layer using the tracing crate.
//!
//! Logs always go to stderr or a file so that machine-readable results on
//! stdout stay clean.

use crate::error::{Error, Result};
use crate::telemetry::config::{LogFormat, LogLevel, LoggingConfig};
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Builder for constructing a logging layer.
pub struct LoggingBuilder {
    config: LoggingConfig,
}

impl LoggingBuilder {
    /// Create a new logging builder with default configuration.
    pub fn new() -> Self {
        Self {
            config: LoggingConfig::default(),
        }
    }

    /// Create a builder from an existing configuration.
    pub fn from_config(config: LoggingConfig) -> Self {
        Self { config }
    }

    /// Set the log level.
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.config.level = level;
        self
    }

    /// Set the log format.
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.config.format = format;
        self
    }

    /// Set ANSI colors.
    pub fn with_ansi(mut self, enabled: bool) -> Self {
        self.config.ansi_colors = enabled;
        self
    }

    /// Include target in logs.
    pub fn with_target(mut self, enabled: bool) -> Self {
        self.config.with_target = enabled;
        self
    }

    /// Set filter directive.
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.config.filter = Some(filter.into());
        self
    }

    /// Set log file path.
    pub fn with_file_output(mut self, path: impl AsRef<Path>) -> Self {
        self.config.file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Build and initialize the logging layer (global subscriber).
    pub fn init(self) -> Result<()> {
        let env_filter = self.build_filter();
        let writer = self.build_writer()?;

        match self.config.format {
            LogFormat::Pretty => self.init_pretty(env_filter, writer),
            LogFormat::Compact => self.init_compact(env_filter, writer),
            LogFormat::Json => self.init_json(env_filter, writer),
            LogFormat::Full => self.init_full(env_filter, writer),
        }
    }

    fn build_filter(&self) -> EnvFilter {
        let default_filter = self.config.level.to_string();

        if let Some(ref filter) = self.config.filter {
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(filter))
                .unwrap_or_else(|_| EnvFilter::new(&default_filter))
        } else {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&default_filter))
        }
    }

    fn build_writer(&self) -> Result<BoxMakeWriter> {
        match self.config.file {
            Some(ref path) => {
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .map_err(|e| {
                        Error::Logging(format!("cannot open log file {}: {}", path.display(), e))
                    })?;
                Ok(BoxMakeWriter::new(Mutex::new(file)))
            }
            None => Ok(BoxMakeWriter::new(std::io::stderr)),
        }
    }

    fn span_events(&self) -> FmtSpan {
        if self.config.with_spans {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        }
    }

    fn init_pretty(self, env_filter: EnvFilter, writer: BoxMakeWriter) -> Result<()> {
        let layer = tracing_subscriber::fmt::layer()
            .pretty()
            .with_writer(writer)
            .with_ansi(self.config.ansi_colors)
            .with_target(self.config.with_target)
            .with_file(self.config.with_file)
            .with_line_number(self.config.with_file)
            .with_span_events(self.span_events());

        tracing_subscriber::registry()
            .with(env_filter)
            .with(layer)
            .try_init()
            .map_err(|e| Error::Logging(e.to_string()))
    }

    fn init_compact(self, env_filter: EnvFilter, writer: BoxMakeWriter) -> Result<()> {
        let layer = tracing_subscriber::fmt::layer()
            .compact()
            .with_writer(writer)
            .with_ansi(self.config.ansi_colors)
            .with_target(self.config.with_target)
            .with_file(self.config.with_file)
            .with_line_number(self.config.with_file)
            .with_span_events(self.span_events());

        let result = if self.config.with_timestamp {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(layer)
                .try_init()
        } else {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(layer.without_time())
                .try_init()
        };
        result.map_err(|e| Error::Logging(e.to_string()))
    }

    fn init_json(self, env_filter: EnvFilter, writer: BoxMakeWriter) -> Result<()> {
        let layer = tracing_subscriber::fmt::layer()
            .json()
            .with_writer(writer)
            .with_current_span(self.config.with_spans)
            .with_span_list(self.config.with_spans)
            .with_file(self.config.with_file)
            .with_line_number(self.config.with_file)
            .with_span_events(self.span_events());

        tracing_subscriber::registry()
            .with(env_filter)
            .with(layer)
            .try_init()
            .map_err(|e| Error::Logging(e.to_string()))
    }

    fn init_full(self, env_filter: EnvFilter, writer: BoxMakeWriter) -> Result<()> {
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_ansi(self.config.ansi_colors)
            .with_target(self.config.with_target)
            .with_file(self.config.with_file)
            .with_line_number(self.config.with_file)
            .with_span_events(FmtSpan::FULL);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(layer)
            .try_init()
            .map_err(|e| Error::Logging(e.to_string()))
    }
}

impl Default for LoggingBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logging_builder() {
        let builder = LoggingBuilder::new()
            .with_level(LogLevel::Debug)
            .with_format(LogFormat::Json)
            .with_ansi(false)
            .with_target(true)
            .with_filter("nxos_pim=trace");

        assert_eq!(builder.config.level, LogLevel::Debug);
        assert_eq!(builder.config.format, LogFormat::Json);
        assert!(!builder.config.ansi_colors);
        assert!(builder.config.with_target);
        assert_eq!(builder.config.filter.as_deref(), Some("nxos_pim=trace"));
    }

    #[test]
    fn test_file_writer_reports_bad_path() {
        let builder = LoggingBuilder::new().with_file_output("/nonexistent-dir/nxos-pim.log");
        let err = builder.build_writer().err().unwrap();
        assert!(matches!(err, Error::Logging(_)));
    }
}
