//! Structured PIM state of one interface.

use super::attributes::{AttrValue, Attribute, BfdMode, Direction, PolicyBinding};
use super::emitter;
use super::parser::{self, PimCommand};
use serde::{Deserialize, Serialize};

/// A configured value as seen on the device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Setting<T> {
    /// Explicitly configured
    Set(T),
    /// An explicit `no ...` line
    Negated,
    /// Not configured; the device default applies
    Absent,
}

impl<T> Default for Setting<T> {
    fn default() -> Self {
        Setting::Absent
    }
}

impl<T> Setting<T> {
    pub fn is_set(&self) -> bool {
        matches!(self, Setting::Set(_))
    }

    /// The configured value, if any. Negated and absent both report `None`.
    pub fn value(&self) -> Option<&T> {
        match self {
            Setting::Set(v) => Some(v),
            _ => None,
        }
    }
}

/// How commands are folded into a state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FoldMode {
    /// Lines read back from running-config: `no` lines stay visible
    Config,
    /// Commands pushed to the device: `no` returns the attribute to default
    Commands,
}

/// Current PIM configuration of an interface
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PimInterfaceState {
    pub dr_prio: Setting<u32>,
    /// Milliseconds
    pub hello_interval: Setting<u32>,
    pub jp_policy_out: Setting<PolicyBinding>,
    pub jp_policy_in: Setting<PolicyBinding>,
    /// The join/prune policy was bound without a direction
    pub jp_bidir: bool,
    pub neighbor_policy: Setting<PolicyBinding>,
    pub sparse: Setting<()>,
    pub border: Setting<()>,
    pub bfd: Setting<BfdMode>,
}

impl PimInterfaceState {
    /// Whether every attribute is at its device default
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Fold one parsed line or command into the state.
    pub fn absorb(&mut self, command: PimCommand, mode: FoldMode) {
        match command {
            PimCommand::Set(value) => self.set(value),
            PimCommand::Negate { attribute, value } => {
                match value {
                    Some(AttrValue::JpPolicy(Direction::Both, _)) => {
                        self.jp_policy_in = cleared(mode);
                        self.jp_policy_out = cleared(mode);
                        self.jp_bidir = false;
                    }
                    _ => match attribute {
                        Attribute::DrPriority => self.dr_prio = cleared(mode),
                        Attribute::HelloInterval => self.hello_interval = cleared(mode),
                        Attribute::JpPolicyOut => {
                            self.jp_policy_out = cleared(mode);
                            self.jp_bidir = false;
                        }
                        Attribute::JpPolicyIn => {
                            self.jp_policy_in = cleared(mode);
                            self.jp_bidir = false;
                        }
                        Attribute::NeighborPolicy => self.neighbor_policy = cleared(mode),
                        Attribute::SparseMode => self.sparse = cleared(mode),
                        Attribute::Border => self.border = cleared(mode),
                        Attribute::Bfd => self.bfd = cleared(mode),
                    },
                }
            }
        }
    }

    fn set(&mut self, value: AttrValue) {
        match value {
            AttrValue::DrPriority(v) => self.dr_prio = Setting::Set(v),
            AttrValue::HelloInterval(v) => self.hello_interval = Setting::Set(v),
            AttrValue::JpPolicy(Direction::Both, binding) => {
                self.jp_policy_in = Setting::Set(binding.clone());
                self.jp_policy_out = Setting::Set(binding);
                self.jp_bidir = true;
            }
            AttrValue::JpPolicy(Direction::In, binding) => {
                self.jp_policy_in = Setting::Set(binding);
                self.jp_bidir = false;
            }
            AttrValue::JpPolicy(Direction::Out, binding) => {
                self.jp_policy_out = Setting::Set(binding);
                self.jp_bidir = false;
            }
            AttrValue::NeighborPolicy(binding) => self.neighbor_policy = Setting::Set(binding),
            AttrValue::SparseMode => self.sparse = Setting::Set(()),
            AttrValue::Border => self.border = Setting::Set(()),
            AttrValue::Bfd(mode) => self.bfd = Setting::Set(mode),
        }
    }

    /// Predict the state after the device accepts `commands`.
    ///
    /// Context lines such as `interface ...` are skipped.
    pub fn apply_commands<S: AsRef<str>>(&self, commands: &[S]) -> Self {
        let mut next = self.clone();
        for command in commands {
            if let Some(parsed) = parser::parse_line(command.as_ref()) {
                next.absorb(parsed, FoldMode::Commands);
            }
        }
        next
    }

    /// Render the state as running-config PIM lines, unindented.
    pub fn to_config_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();

        for attribute in Attribute::APPLY_ORDER {
            let value = match attribute {
                Attribute::DrPriority => self.dr_prio.clone().map_value(AttrValue::DrPriority),
                Attribute::HelloInterval => self
                    .hello_interval
                    .clone()
                    .map_value(AttrValue::HelloInterval),
                Attribute::JpPolicyOut if self.jp_bidir => self
                    .jp_policy_out
                    .clone()
                    .map_value(|b| AttrValue::JpPolicy(Direction::Both, b)),
                Attribute::JpPolicyIn if self.jp_bidir => Setting::Absent,
                Attribute::JpPolicyOut => self
                    .jp_policy_out
                    .clone()
                    .map_value(|b| AttrValue::JpPolicy(Direction::Out, b)),
                Attribute::JpPolicyIn => self
                    .jp_policy_in
                    .clone()
                    .map_value(|b| AttrValue::JpPolicy(Direction::In, b)),
                Attribute::NeighborPolicy => self
                    .neighbor_policy
                    .clone()
                    .map_value(AttrValue::NeighborPolicy),
                Attribute::SparseMode => self.sparse.clone().map_value(|_| AttrValue::SparseMode),
                Attribute::Border => self.border.clone().map_value(|_| AttrValue::Border),
                Attribute::Bfd => self.bfd.clone().map_value(AttrValue::Bfd),
            };

            match value {
                Setting::Set(v) => lines.push(emitter::set_command(&v)),
                // A negated policy line no longer names the binding.
                Setting::Negated
                    if !matches!(
                        attribute,
                        Attribute::JpPolicyOut
                            | Attribute::JpPolicyIn
                            | Attribute::NeighborPolicy
                    ) =>
                {
                    lines.push(emitter::negate_command(attribute, None))
                }
                _ => {}
            }
        }

        lines
    }

    /// Render the state as an interface block.
    pub fn render(&self, interface: &str) -> String {
        let mut out = format!("interface {}\n", interface);
        for line in self.to_config_lines() {
            out.push_str("  ");
            out.push_str(&line);
            out.push('\n');
        }
        out
    }
}

fn cleared<T>(mode: FoldMode) -> Setting<T> {
    match mode {
        FoldMode::Config => Setting::Negated,
        FoldMode::Commands => Setting::Absent,
    }
}

impl<T> Setting<T> {
    fn map_value<U>(self, f: impl FnOnce(T) -> U) -> Setting<U> {
        match self {
            Setting::Set(v) => Setting::Set(f(v)),
            Setting::Negated => Setting::Negated,
            Setting::Absent => Setting::Absent,
        }
    }
}
