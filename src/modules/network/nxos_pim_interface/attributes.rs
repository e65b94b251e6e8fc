//! Attribute model for PIM interface settings.
//!
//! Every manageable attribute has a rule: the CLI keyword it is configured
//! with, the value the device assumes when the line is absent, and how the
//! attribute is returned to that default. The comparison functions here turn a
//! desired/current pair into [`AttributeDelta`]s; rendering them into command
//! strings is the emitter's job.

use super::params::{BfdSetting, DesiredState};
use super::state::{PimInterfaceState, Setting};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Device default DR priority
pub const DEFAULT_DR_PRIORITY: u32 = 1;

/// Device default hello interval in milliseconds
pub const DEFAULT_HELLO_INTERVAL_MS: u32 = 30_000;

// ============================================================================
// Value Types
// ============================================================================

/// Manageable PIM interface attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    DrPriority,
    HelloInterval,
    JpPolicyOut,
    JpPolicyIn,
    NeighborPolicy,
    SparseMode,
    Border,
    Bfd,
}

impl Attribute {
    /// Order in which the device accepts attribute commands.
    pub const APPLY_ORDER: [Attribute; 8] = [
        Attribute::DrPriority,
        Attribute::HelloInterval,
        Attribute::JpPolicyOut,
        Attribute::JpPolicyIn,
        Attribute::NeighborPolicy,
        Attribute::SparseMode,
        Attribute::Border,
        Attribute::Bfd,
    ];

    /// Order used when tearing the interface configuration down.
    pub fn teardown_order() -> impl Iterator<Item = Attribute> {
        Self::APPLY_ORDER.into_iter().rev()
    }

    /// The rule table entry for this attribute
    pub fn rule(self) -> &'static AttributeRule {
        // APPLY_ORDER and ATTRIBUTE_RULES are kept index-aligned.
        let index = Self::APPLY_ORDER
            .iter()
            .position(|a| *a == self)
            .unwrap_or_default();
        &ATTRIBUTE_RULES[index]
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.rule().param)
    }
}

/// BFD state configured on the interface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BfdMode {
    Enable,
    Disable,
}

/// Kind of filter a policy name refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyType {
    #[default]
    #[serde(alias = "route-map")]
    Routemap,
    #[serde(alias = "prefix-list")]
    Prefix,
}

impl std::str::FromStr for PolicyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "routemap" | "route-map" => Ok(PolicyType::Routemap),
            "prefix" | "prefix-list" => Ok(PolicyType::Prefix),
            _ => Err(format!(
                "Invalid policy type '{}'. Valid options: routemap, prefix",
                s
            )),
        }
    }
}

/// A policy name together with its filter kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyBinding {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: PolicyType,
}

impl PolicyBinding {
    pub fn new(name: impl Into<String>, kind: PolicyType) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

impl fmt::Display for PolicyBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            PolicyType::Routemap => write!(f, "{}", self.name),
            PolicyType::Prefix => write!(f, "prefix-list {}", self.name),
        }
    }
}

/// Direction a join/prune policy is applied in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    In,
    Out,
    /// Bound without a direction keyword
    Both,
}

/// A concrete attribute value, as configured by one CLI line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttrValue {
    DrPriority(u32),
    /// Milliseconds
    HelloInterval(u32),
    JpPolicy(Direction, PolicyBinding),
    NeighborPolicy(PolicyBinding),
    SparseMode,
    Border,
    Bfd(BfdMode),
}

impl AttrValue {
    /// The attribute this value configures.
    ///
    /// A bidirectional join/prune binding reports as `JpPolicyIn`.
    pub fn attribute(&self) -> Attribute {
        match self {
            AttrValue::DrPriority(_) => Attribute::DrPriority,
            AttrValue::HelloInterval(_) => Attribute::HelloInterval,
            AttrValue::JpPolicy(Direction::Out, _) => Attribute::JpPolicyOut,
            AttrValue::JpPolicy(_, _) => Attribute::JpPolicyIn,
            AttrValue::NeighborPolicy(_) => Attribute::NeighborPolicy,
            AttrValue::SparseMode => Attribute::SparseMode,
            AttrValue::Border => Attribute::Border,
            AttrValue::Bfd(_) => Attribute::Bfd,
        }
    }
}

// ============================================================================
// Rule Table
// ============================================================================

/// Value the device assumes when the attribute is not configured
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceDefault {
    Value(u32),
    Off,
    Unbound,
}

/// How an attribute is returned to its device default
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetStyle {
    /// `no <keyword>`
    Negate,
    /// `no <keyword> <current binding>`, the device needs the bound name
    NegateBinding,
}

/// Rule table entry
#[derive(Debug)]
pub struct AttributeRule {
    pub attribute: Attribute,
    /// Module parameter name
    pub param: &'static str,
    /// CLI keyword
    pub keyword: &'static str,
    pub default: DeviceDefault,
    pub reset: ResetStyle,
}

pub static ATTRIBUTE_RULES: [AttributeRule; 8] = [
    AttributeRule {
        attribute: Attribute::DrPriority,
        param: "dr_prio",
        keyword: "ip pim dr-priority",
        default: DeviceDefault::Value(DEFAULT_DR_PRIORITY),
        reset: ResetStyle::Negate,
    },
    AttributeRule {
        attribute: Attribute::HelloInterval,
        param: "hello_interval",
        keyword: "ip pim hello-interval",
        default: DeviceDefault::Value(DEFAULT_HELLO_INTERVAL_MS),
        reset: ResetStyle::Negate,
    },
    AttributeRule {
        attribute: Attribute::JpPolicyOut,
        param: "jp_policy_out",
        keyword: "ip pim jp-policy",
        default: DeviceDefault::Unbound,
        reset: ResetStyle::NegateBinding,
    },
    AttributeRule {
        attribute: Attribute::JpPolicyIn,
        param: "jp_policy_in",
        keyword: "ip pim jp-policy",
        default: DeviceDefault::Unbound,
        reset: ResetStyle::NegateBinding,
    },
    AttributeRule {
        attribute: Attribute::NeighborPolicy,
        param: "neighbor_policy",
        keyword: "ip pim neighbor-policy",
        default: DeviceDefault::Unbound,
        reset: ResetStyle::NegateBinding,
    },
    AttributeRule {
        attribute: Attribute::SparseMode,
        param: "sparse",
        keyword: "ip pim sparse-mode",
        default: DeviceDefault::Off,
        reset: ResetStyle::Negate,
    },
    AttributeRule {
        attribute: Attribute::Border,
        param: "border",
        keyword: "ip pim border",
        default: DeviceDefault::Off,
        reset: ResetStyle::Negate,
    },
    AttributeRule {
        attribute: Attribute::Bfd,
        param: "bfd",
        keyword: "ip pim bfd-instance",
        default: DeviceDefault::Unbound,
        reset: ResetStyle::Negate,
    },
];

impl AttributeRule {
    /// Whether a configured numeric value equals the device default
    fn is_default_value(&self, value: u32) -> bool {
        self.default == DeviceDefault::Value(value)
    }

    /// Effective numeric value of a current setting, absent/negated meaning default
    fn effective(&self, current: &Setting<u32>) -> Option<u32> {
        match (current, self.default) {
            (Setting::Set(v), _) => Some(*v),
            (_, DeviceDefault::Value(v)) => Some(v),
            _ => None,
        }
    }
}

// ============================================================================
// Deltas
// ============================================================================

/// What has to happen to one attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeltaAction {
    Set,
    Negate,
    NoOp,
}

/// One attribute's desired/current comparison result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDelta {
    pub attribute: Attribute,
    /// Value to configure; `None` when the attribute goes back to default
    pub desired: Option<AttrValue>,
    /// Value currently configured; `None` when at device default
    pub current: Option<AttrValue>,
    pub action: DeltaAction,
}

impl AttributeDelta {
    fn set(attribute: Attribute, desired: AttrValue, current: Option<AttrValue>) -> Self {
        Self {
            attribute,
            desired: Some(desired),
            current,
            action: DeltaAction::Set,
        }
    }

    fn negate(attribute: Attribute, current: Option<AttrValue>) -> Self {
        Self {
            attribute,
            desired: None,
            current,
            action: DeltaAction::Negate,
        }
    }

    fn noop(attribute: Attribute, current: Option<AttrValue>) -> Self {
        Self {
            attribute,
            desired: None,
            current,
            action: DeltaAction::NoOp,
        }
    }

    pub fn is_noop(&self) -> bool {
        self.action == DeltaAction::NoOp
    }
}

/// What the caller asked for one policy slot
#[derive(Debug, Clone, PartialEq, Eq)]
enum PolicyIntent {
    /// Parameter not given
    Keep,
    /// Literal `default`: unbind whatever is bound
    Remove,
    Bind(PolicyBinding),
}

fn policy_intent(
    name: Option<&str>,
    kind: Option<PolicyType>,
    current: Option<&PolicyBinding>,
) -> PolicyIntent {
    match name {
        None => PolicyIntent::Keep,
        Some(name) if name.eq_ignore_ascii_case("default") => PolicyIntent::Remove,
        Some(name) => {
            // Keep the bound kind when only the name is repeated.
            let kind = kind
                .or_else(|| current.filter(|c| c.name == name).map(|c| c.kind))
                .unwrap_or_default();
            PolicyIntent::Bind(PolicyBinding::new(name, kind))
        }
    }
}

fn jp_value(direction: Direction, binding: &PolicyBinding) -> AttrValue {
    AttrValue::JpPolicy(direction, binding.clone())
}

/// Compare a single (non-bidirectional) policy slot.
fn compare_policy(
    attribute: Attribute,
    intent: PolicyIntent,
    current: Option<&PolicyBinding>,
    value: impl Fn(&PolicyBinding) -> AttrValue,
) -> AttributeDelta {
    let current_value = current.map(&value);
    match intent {
        PolicyIntent::Keep => AttributeDelta::noop(attribute, current_value),
        PolicyIntent::Remove if current.is_some() => {
            AttributeDelta::negate(attribute, current_value)
        }
        PolicyIntent::Remove => AttributeDelta::noop(attribute, None),
        PolicyIntent::Bind(binding) if current == Some(&binding) => {
            AttributeDelta::noop(attribute, current_value)
        }
        PolicyIntent::Bind(binding) => {
            AttributeDelta::set(attribute, value(&binding), current_value)
        }
    }
}

fn jp_intents(desired: &DesiredState, current: &PimInterfaceState) -> (PolicyIntent, PolicyIntent) {
    let out = policy_intent(
        desired.jp_policy_out.as_deref(),
        desired.jp_type_out,
        current.jp_policy_out.value(),
    );
    let inbound = policy_intent(
        desired.jp_policy_in.as_deref(),
        desired.jp_type_in,
        current.jp_policy_in.value(),
    );
    (out, inbound)
}

/// Handle both join/prune directions when the device holds a bidirectional binding.
///
/// Any change removes the bidirectional binding first, then rebinds each
/// direction explicitly. Unchanged directions keep the old binding.
fn compare_jp_bidir(
    attribute: Attribute,
    desired: &DesiredState,
    current: &PimInterfaceState,
    bound: &PolicyBinding,
) -> Vec<AttributeDelta> {
    let (out, inbound) = jp_intents(desired, current);
    let touches = |intent: &PolicyIntent| match intent {
        PolicyIntent::Keep => false,
        PolicyIntent::Remove => true,
        PolicyIntent::Bind(b) => b != bound,
    };

    let bidir_value = Some(jp_value(Direction::Both, bound));
    if !touches(&out) && !touches(&inbound) {
        return vec![AttributeDelta::noop(attribute, bidir_value)];
    }

    let (direction, intent) = match attribute {
        Attribute::JpPolicyOut => (Direction::Out, out),
        _ => (Direction::In, inbound),
    };

    let mut deltas = Vec::new();
    if attribute == Attribute::JpPolicyOut {
        deltas.push(AttributeDelta::negate(attribute, bidir_value.clone()));
    }
    match intent {
        PolicyIntent::Keep => deltas.push(AttributeDelta::set(
            attribute,
            jp_value(direction, bound),
            bidir_value,
        )),
        PolicyIntent::Remove => {}
        PolicyIntent::Bind(binding) => deltas.push(AttributeDelta::set(
            attribute,
            jp_value(direction, &binding),
            bidir_value,
        )),
    }
    deltas
}

fn compare_flag(attribute: Attribute, desired: Option<bool>, current: &Setting<()>) -> AttributeDelta {
    let value = match attribute {
        Attribute::Border => AttrValue::Border,
        _ => AttrValue::SparseMode,
    };
    let current_value = current.is_set().then(|| value.clone());

    match desired {
        Some(true) if !current.is_set() => AttributeDelta::set(attribute, value, None),
        Some(false) if current.is_set() => AttributeDelta::negate(attribute, current_value),
        _ => AttributeDelta::noop(attribute, current_value),
    }
}

/// Compare one attribute of the desired state against the current state.
///
/// Returns at least one delta; no-ops are returned as such so callers can
/// report them.
pub fn compare(
    attribute: Attribute,
    desired: &DesiredState,
    current: &PimInterfaceState,
) -> Vec<AttributeDelta> {
    let rule = attribute.rule();

    let delta = match attribute {
        Attribute::DrPriority => {
            let current_value = current.dr_prio.value().copied().map(AttrValue::DrPriority);
            match desired.dr_prio {
                Some(want) if rule.effective(&current.dr_prio) != Some(want) => {
                    AttributeDelta::set(attribute, AttrValue::DrPriority(want), current_value)
                }
                _ => AttributeDelta::noop(attribute, current_value),
            }
        }
        Attribute::HelloInterval => {
            let current_value = current
                .hello_interval
                .value()
                .copied()
                .map(AttrValue::HelloInterval);
            match desired.hello_interval_millis() {
                Some(want) if rule.effective(&current.hello_interval) != Some(want) => {
                    AttributeDelta::set(attribute, AttrValue::HelloInterval(want), current_value)
                }
                _ => AttributeDelta::noop(attribute, current_value),
            }
        }
        Attribute::JpPolicyOut | Attribute::JpPolicyIn => {
            if current.jp_bidir {
                if let Some(bound) = current.jp_policy_in.value().or(current.jp_policy_out.value()) {
                    return compare_jp_bidir(attribute, desired, current, bound);
                }
            }
            let (out, inbound) = jp_intents(desired, current);
            if attribute == Attribute::JpPolicyOut {
                compare_policy(attribute, out, current.jp_policy_out.value(), |b| {
                    jp_value(Direction::Out, b)
                })
            } else {
                compare_policy(attribute, inbound, current.jp_policy_in.value(), |b| {
                    jp_value(Direction::In, b)
                })
            }
        }
        Attribute::NeighborPolicy => {
            let intent = policy_intent(
                desired.neighbor_policy.as_deref(),
                desired.neighbor_type,
                current.neighbor_policy.value(),
            );
            compare_policy(attribute, intent, current.neighbor_policy.value(), |b| {
                AttrValue::NeighborPolicy(b.clone())
            })
        }
        Attribute::SparseMode => compare_flag(attribute, desired.sparse, &current.sparse),
        Attribute::Border => compare_flag(attribute, desired.border, &current.border),
        Attribute::Bfd => {
            let current_mode = current.bfd.value().copied();
            let current_value = current_mode.map(AttrValue::Bfd);
            match (desired.bfd, current_mode) {
                (Some(BfdSetting::Enable), Some(BfdMode::Enable))
                | (Some(BfdSetting::Disable), Some(BfdMode::Disable))
                | (Some(BfdSetting::Default), None)
                | (None, _) => AttributeDelta::noop(attribute, current_value),
                (Some(BfdSetting::Enable), _) => {
                    AttributeDelta::set(attribute, AttrValue::Bfd(BfdMode::Enable), current_value)
                }
                (Some(BfdSetting::Disable), _) => {
                    AttributeDelta::set(attribute, AttrValue::Bfd(BfdMode::Disable), current_value)
                }
                (Some(BfdSetting::Default), Some(_)) => {
                    AttributeDelta::negate(attribute, current_value)
                }
            }
        }
    };

    vec![delta]
}

/// Delta that returns one attribute to its device default, if it is not there already.
pub fn teardown(attribute: Attribute, current: &PimInterfaceState) -> AttributeDelta {
    let rule = attribute.rule();

    let configured = match attribute {
        Attribute::DrPriority => current
            .dr_prio
            .value()
            .filter(|v| !rule.is_default_value(**v))
            .map(|v| AttrValue::DrPriority(*v)),
        Attribute::HelloInterval => current
            .hello_interval
            .value()
            .filter(|v| !rule.is_default_value(**v))
            .map(|v| AttrValue::HelloInterval(*v)),
        // A bidirectional binding is removed once, from the in slot which
        // comes first in teardown order.
        Attribute::JpPolicyOut if current.jp_bidir => None,
        Attribute::JpPolicyOut => current
            .jp_policy_out
            .value()
            .map(|b| jp_value(Direction::Out, b)),
        Attribute::JpPolicyIn => {
            let direction = if current.jp_bidir {
                Direction::Both
            } else {
                Direction::In
            };
            current.jp_policy_in.value().map(|b| jp_value(direction, b))
        }
        Attribute::NeighborPolicy => current
            .neighbor_policy
            .value()
            .map(|b| AttrValue::NeighborPolicy(b.clone())),
        Attribute::SparseMode => current.sparse.is_set().then_some(AttrValue::SparseMode),
        Attribute::Border => current.border.is_set().then_some(AttrValue::Border),
        Attribute::Bfd => current.bfd.value().map(|m| AttrValue::Bfd(*m)),
    };

    match configured {
        Some(value) => AttributeDelta::negate(attribute, Some(value)),
        None => AttributeDelta::noop(attribute, None),
    }
}
