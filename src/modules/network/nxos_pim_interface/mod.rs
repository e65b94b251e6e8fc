//! NX-OS PIM interface module
//!
//! Declaratively manages the PIM settings of a single interface on a Cisco
//! NX-OS device: DR priority, hello interval, sparse mode, border, join/prune
//! and neighbor policies, and BFD.
//!
//! The module reads the interface's running configuration, compares it with
//! the requested state and pushes the minimal command list, or nothing when
//! the device is already converged.
//!
//! # Parameters
//!
//! | Name | Required | Description |
//! |------|----------|-------------|
//! | `interface` | yes | Interface name, used verbatim in the context line |
//! | `dr_prio` | no | Designated router priority |
//! | `hello_interval` | no | Hello interval, seconds unless `hello_interval_ms` |
//! | `hello_interval_ms` | no | Interpret `hello_interval` as milliseconds |
//! | `sparse` | no | Enable or disable sparse mode |
//! | `border` | no | Configure the interface as a PIM border |
//! | `bfd` | no | `enable`, `disable` or `default` |
//! | `jp_policy_in` / `jp_policy_out` | no | Join/prune policy name, `default` removes it |
//! | `jp_type_in` / `jp_type_out` | no | `routemap` or `prefix` |
//! | `neighbor_policy` | no | Neighbor policy name, `default` removes it |
//! | `neighbor_type` | no | `routemap` or `prefix` |
//! | `state` | no | `present` (default), `absent` or `default` |
//!
//! # Example
//!
//! ```yaml
//! - name: Enable sparse mode with a custom DR priority
//!   nxos_pim_interface:
//!     interface: Ethernet2/1
//!     dr_prio: 10
//!     sparse: true
//! ```

pub mod attributes;
pub mod emitter;
pub mod params;
pub mod parser;
pub mod planner;
pub mod state;

pub use attributes::{AttrValue, Attribute, AttributeDelta, BfdMode, DeltaAction, PolicyType};
pub use params::{BfdSetting, DesiredState, PimState};
pub use planner::{plan, CommandPlan};
pub use state::{PimInterfaceState, Setting};

use crate::modules::network::common::{
    generate_config_diff, get_interface_mode, get_interface_type, InterfaceMode, NxosDevice,
};
use crate::modules::{
    Module, ModuleContext, ModuleError, ModuleOutput, ModuleParams, ModuleResult,
};
use serde::Serialize;
use tracing::{debug, info, info_span};

/// Outcome of one reconcile pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub changed: bool,
    /// Commands pushed, or that would be pushed in check mode
    pub commands: Vec<String>,
    /// State parsed from the device before any change
    pub existing: PimInterfaceState,
    /// State expected once the commands are applied
    pub end_state: PimInterfaceState,
}

/// Reconcile one interface against the device.
///
/// The desired state must already be validated. Nothing is pushed when the
/// plan is empty or `check_mode` is set. Device failures are returned as-is.
pub fn reconcile(
    device: &dyn NxosDevice,
    desired: &DesiredState,
    check_mode: bool,
) -> ModuleResult<ReconcileReport> {
    let interface = desired.interface.as_str();

    if desired.state == PimState::Present {
        let mode = get_interface_mode(device, interface)?;
        debug!(
            interface = %interface,
            interface_type = %get_interface_type(interface),
            mode = ?mode,
            "Resolved interface mode"
        );
        if mode == InterfaceMode::Layer2 {
            return Err(ModuleError::InvalidParameter(format!(
                "PIM interface config can only be applied to L3 interfaces; {} is a layer 2 port",
                interface
            )));
        }
    }

    let config = device.get_config(&[format!("interface {}", interface)])?;
    let existing = parser::parse_config(config.as_deref());
    debug!(interface = %interface, existing = ?existing, "Parsed current PIM state");

    let plan = planner::plan(desired, &existing);
    let changed = plan.changed();
    let commands = plan.into_commands();
    let end_state = existing.apply_commands(commands.as_slice());

    if changed && !check_mode {
        info!(
            device = %device.identifier(),
            interface = %interface,
            count = commands.len(),
            "Pushing PIM interface configuration"
        );
        device.load_config(&commands)?;
    }

    Ok(ReconcileReport {
        changed,
        commands,
        existing,
        end_state,
    })
}

/// Module for NX-OS PIM interface configuration
pub struct NxosPimInterfaceModule;

impl NxosPimInterfaceModule {
    fn to_json<T: Serialize>(value: &T) -> ModuleResult<serde_json::Value> {
        serde_json::to_value(value).map_err(|e| ModuleError::ParseError(e.to_string()))
    }
}

impl Module for NxosPimInterfaceModule {
    fn name(&self) -> &'static str {
        "nxos_pim_interface"
    }

    fn description(&self) -> &'static str {
        "Manage PIM interface configuration on Cisco NX-OS devices"
    }

    fn required_params(&self) -> &[&'static str] {
        &["interface"]
    }

    fn validate_params(&self, params: &ModuleParams) -> ModuleResult<()> {
        DesiredState::from_params(params).map(|_| ())
    }

    fn execute(
        &self,
        params: &ModuleParams,
        context: &ModuleContext,
    ) -> ModuleResult<ModuleOutput> {
        let desired = DesiredState::from_params(params)?;
        let span = info_span!("nxos_pim_interface", interface = %desired.interface);
        let _enter = span.enter();

        let device = context.device.as_ref().ok_or_else(|| {
            ModuleError::ExecutionFailed(
                "No device connection available for nxos_pim_interface".to_string(),
            )
        })?;

        let report = reconcile(device.as_ref(), &desired, context.check_mode)?;

        let mut output = if !report.changed {
            ModuleOutput::ok(format!(
                "PIM configuration of {} is up to date",
                desired.interface
            ))
        } else if context.check_mode {
            ModuleOutput::changed(format!(
                "Would apply {} command(s) to {}",
                report.commands.len(),
                desired.interface
            ))
        } else {
            ModuleOutput::changed(format!(
                "Applied {} command(s) to {}",
                report.commands.len(),
                desired.interface
            ))
        };

        if context.diff_mode && report.changed {
            output = output.with_diff(generate_config_diff(
                &report.existing.render(&desired.interface),
                &report.end_state.render(&desired.interface),
            ));
        }

        Ok(output
            .with_data("commands", Self::to_json(&report.commands)?)
            .with_data("existing", Self::to_json(&report.existing)?)
            .with_data("proposed", Self::to_json(&desired)?)
            .with_data("end_state", Self::to_json(&report.end_state)?))
    }
}
