//! # nxos-pim - Declarative PIM interface management for Cisco NX-OS
//!
//! nxos-pim reads the running configuration of one NX-OS interface, compares
//! its PIM settings with a requested state and produces the minimal ordered
//! list of configuration commands that converges the device.
//!
//! ## Core Concepts
//!
//! - **Modules**: Units of work driven by a parameter map (`nxos_pim_interface`)
//! - **Devices**: The [`NxosDevice`](modules::network::NxosDevice) collaborator
//!   that reads configuration, pushes commands and runs exec-mode commands
//! - **Snapshots**: A saved running-config served as a device
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                       CLI Interface                        │
//! │                (clap-based command parsing)                │
//! └───────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌───────────────────────────────────────────────────────────┐
//! │                      Module Registry                       │
//! └───────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌───────────────────────────────────────────────────────────┐
//! │                    nxos_pim_interface                      │
//! │   params ─► parser ─► planner ─► emitter ─► end state      │
//! └───────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌───────────────────────────────────────────────────────────┐
//! │            NxosDevice (snapshot file or mock)              │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Example
//!
//! ```rust,ignore
//! use nxos_pim::prelude::*;
//!
//! let device = SnapshotDevice::open("n9k-running.cfg")?;
//! let mut desired = DesiredState::new("Ethernet1/1");
//! desired.sparse = Some(true);
//! desired.dr_prio = Some(10);
//! desired.validate()?;
//!
//! let report = reconcile(&device, &desired, false)?;
//! for command in &report.commands {
//!     println!("{}", command);
//! }
//! ```

#![warn(clippy::all)]

// Re-export commonly used items in prelude
pub mod prelude {
    //! Convenient re-exports of commonly used types and traits.

    pub use crate::error::{Error, Result};
    pub use crate::modules::network::nxos_pim_interface::{
        BfdSetting, PimInterfaceState, PimState, PolicyType,
    };
    pub use crate::modules::network::{
        reconcile, DesiredState, DeviceError, NxosDevice, NxosPimInterfaceModule,
        ReconcileReport, SnapshotDevice,
    };
    pub use crate::modules::{
        Module, ModuleContext, ModuleError, ModuleOutput, ModuleParams, ModuleRegistry,
        ModuleResult, ModuleStatus, ParamExt,
    };
}

// ============================================================================
// Error Handling
// ============================================================================

/// Error types for nxos-pim.
pub mod error;

// ============================================================================
// Modules
// ============================================================================

/// Module system and the NX-OS network modules.
pub mod modules;

// ============================================================================
// Configuration
// ============================================================================

/// Configuration management for nxos-pim behavior.
///
/// Handles loading and merging configuration from multiple sources:
/// environment variables, config files, and command-line arguments.
pub mod config;

// ============================================================================
// Observability
// ============================================================================

/// Structured logging setup.
pub mod telemetry;

pub use error::{Error, Result};

// ============================================================================
// Version Information
// ============================================================================

/// Returns the current version of nxos-pim.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
