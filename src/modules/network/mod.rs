//! Network Device Modules
//!
//! Declarative configuration modules for Cisco NX-OS. Each module reads the
//! relevant part of the running configuration through an [`NxosDevice`],
//! compares it with the requested state and pushes only the commands needed
//! to converge.
//!
//! # Supported Modules
//!
//! - **nxos_pim_interface**: PIM settings of a single interface
//!
//! # Example Usage
//!
//! ```yaml
//! - name: Configure PIM on an uplink
//!   nxos_pim_interface:
//!     interface: Ethernet2/1
//!     sparse: true
//!     dr_prio: 10
//!     jp_policy_out: JPOUT
//!     jp_policy_in: JPIN
//!
//! - name: Remove all PIM configuration from the interface
//!   nxos_pim_interface:
//!     interface: Ethernet2/1
//!     state: absent
//! ```
//!
//! # Architecture
//!
//! ```text
//! +----------------------+     +-------------------+
//! |  nxos_pim_interface  |---->|    NxosDevice     |
//! |  parse/plan/emit     |     |  get_config       |
//! +----------------------+     |  load_config      |
//!                              |  run_commands     |
//!                              +-------------------+
//!                                        |
//!                              +-------------------+
//!                              |  SnapshotDevice   |
//!                              |  (running-config  |
//!                              |   file)           |
//!                              +-------------------+
//! ```

pub mod common;
pub mod nxos_pim_interface;
pub mod snapshot;

// Re-export main types for convenience
pub use common::{
    find_interface_section, generate_config_diff, get_interface_mode, get_interface_type,
    normalize_interface_name, ConfigSection, DeviceError, DeviceResult, InterfaceMode,
    InterfaceType, NxosDevice,
};
pub use nxos_pim_interface::{reconcile, DesiredState, NxosPimInterfaceModule, ReconcileReport};
pub use snapshot::SnapshotDevice;

use crate::modules::ModuleRegistry;
use std::sync::Arc;

/// Register all network modules with the registry
pub fn register_network_modules(registry: &mut ModuleRegistry) {
    registry.register(Arc::new(NxosPimInterfaceModule));
}

/// Get a list of all available network module names
pub fn network_module_names() -> Vec<&'static str> {
    vec!["nxos_pim_interface"]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_names() {
        let names = network_module_names();
        assert!(names.contains(&"nxos_pim_interface"));
    }

    #[test]
    fn test_registered_names_match() {
        let mut registry = ModuleRegistry::new();
        register_network_modules(&mut registry);
        for name in network_module_names() {
            assert!(registry.contains(name));
        }
    }

    #[test]
    fn test_interface_type_display() {
        assert_eq!(format!("{}", InterfaceType::Ethernet), "ethernet");
        assert_eq!(format!("{}", InterfaceType::PortChannel), "portchannel");
    }
}
