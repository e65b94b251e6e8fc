//! Telemetry module for nxos-pim observability.
//!
//! Structured logging using the `tracing` crate, with pretty, compact, JSON
//! and full formats. Library code only emits events; the binary installs the
//! subscriber once at startup.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use nxos_pim::telemetry::{LogFormat, LogLevel, LoggingBuilder};
//!
//! LoggingBuilder::new()
//!     .with_level(LogLevel::Debug)
//!     .with_format(LogFormat::Json)
//!     .init()?;
//!
//! tracing::info!(interface = %name, "Reconciling PIM interface");
//! ```

pub mod config;
pub mod logging;

// Re-exports for convenience
pub use config::{LogFormat, LogLevel, LoggingConfig};
pub use logging::LoggingBuilder;

use std::sync::OnceLock;

static INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize global logging with the given configuration.
///
/// Subsequent calls are ignored.
pub fn init_logging(config: LoggingConfig) -> crate::error::Result<()> {
    if INITIALIZED.get().is_some() {
        return Ok(());
    }
    LoggingBuilder::from_config(config).init()?;
    let _ = INITIALIZED.set(());
    Ok(())
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use super::config::{LogFormat, LogLevel, LoggingConfig};
    pub use super::init_logging;
    pub use tracing::{debug, error, info, instrument, trace, warn, Span};
}
