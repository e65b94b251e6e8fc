//! Reconcile planning: desired + current state into an ordered command list.

use super::attributes::{self, Attribute, AttributeDelta};
use super::emitter;
use super::params::DesiredState;
use super::state::PimInterfaceState;
use serde::Serialize;
use tracing::debug;

/// Ordered commands for one interface
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandPlan {
    interface: String,
    deltas: Vec<AttributeDelta>,
    commands: Vec<String>,
}

impl CommandPlan {
    fn build(interface: &str, deltas: Vec<AttributeDelta>) -> Self {
        let body: Vec<String> = deltas.iter().flat_map(emitter::render).collect();

        let mut commands = Vec::with_capacity(body.len() + 1);
        if !body.is_empty() {
            commands.push(format!("interface {}", interface));
            commands.extend(body);
        }

        Self {
            interface: interface.to_string(),
            deltas,
            commands,
        }
    }

    /// Whether any attribute command was produced
    pub fn changed(&self) -> bool {
        !self.commands.is_empty()
    }

    pub fn interface(&self) -> &str {
        &self.interface
    }

    /// Every delta that produced commands, in emission order
    pub fn deltas(&self) -> &[AttributeDelta] {
        &self.deltas
    }

    /// Full command list, interface context line first
    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    pub fn into_commands(self) -> Vec<String> {
        self.commands
    }
}

/// Plan the commands that move `current` to `desired`.
pub fn plan(desired: &DesiredState, current: &PimInterfaceState) -> CommandPlan {
    let deltas: Vec<AttributeDelta> = if desired.state.is_removal() {
        Attribute::teardown_order()
            .map(|attribute| attributes::teardown(attribute, current))
            .filter(|delta| !delta.is_noop())
            .collect()
    } else {
        Attribute::APPLY_ORDER
            .into_iter()
            .flat_map(|attribute| attributes::compare(attribute, desired, current))
            .filter(|delta| !delta.is_noop())
            .collect()
    };

    for delta in &deltas {
        debug!(
            attribute = %delta.attribute,
            action = ?delta.action,
            "Planned attribute change"
        );
    }

    CommandPlan::build(&desired.interface, deltas)
}
