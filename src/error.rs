//! Error types for nxos-pim.
//!
//! Module-level failures are reported as [`ModuleError`]; this crate-level
//! error wraps them together with the configuration, parameter file and I/O
//! failures of the command-line front end.

use crate::modules::network::common::DeviceError;
use crate::modules::ModuleError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for nxos-pim operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for nxos-pim.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Module Errors
    // ========================================================================
    /// Module not found.
    #[error("Module '{0}' not found")]
    ModuleNotFound(String),

    /// Module execution failed.
    #[error("Module '{module}' failed: {source}")]
    ModuleExecution {
        /// Module name
        module: String,
        /// Underlying module error
        #[source]
        source: ModuleError,
    },

    /// Invalid module arguments.
    #[error("Invalid arguments for module '{module}': {message}")]
    ModuleArgs {
        /// Module name
        module: String,
        /// Error message
        message: String,
    },

    // ========================================================================
    // Device Errors
    // ========================================================================
    /// The device collaborator failed.
    #[error(transparent)]
    Device(#[from] DeviceError),

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Logging could not be initialized.
    #[error("Failed to initialize logging: {0}")]
    Logging(String),

    // ========================================================================
    // IO Errors
    // ========================================================================
    /// File not found.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ========================================================================
    // Serialization Errors
    // ========================================================================
    /// YAML parsing error.
    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl From<ModuleError> for Error {
    fn from(err: ModuleError) -> Self {
        match err {
            ModuleError::NotFound(name) => Error::ModuleNotFound(name),
            ModuleError::Device(device) => Error::Device(device),
            source => Error::ModuleExecution {
                module: "nxos_pim_interface".to_string(),
                source,
            },
        }
    }
}

impl Error {
    /// Creates a new module args error.
    pub fn module_args(module: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ModuleArgs {
            module: module.into(),
            message: message.into(),
        }
    }

    /// Creates a module execution error for a named module.
    pub fn module_execution(module: impl Into<String>, source: ModuleError) -> Self {
        Self::ModuleExecution {
            module: module.into(),
            source,
        }
    }

    /// Returns true if the failure was caused by the caller's input.
    pub fn is_input_error(&self) -> bool {
        match self {
            Error::ModuleArgs { .. } => true,
            Error::ModuleExecution { source, .. } => matches!(
                source,
                ModuleError::InvalidParameter(_) | ModuleError::MissingParameter(_)
            ),
            _ => false,
        }
    }

    /// Returns the error code for CLI exit status.
    pub fn exit_code(&self) -> i32 {
        match self {
            e if e.is_input_error() => 4,
            Error::ModuleExecution { .. } | Error::ModuleNotFound(_) => 2,
            Error::Device(_) => 3,
            Error::Config(_) => 5,
            _ => 1,
        }
    }
}
