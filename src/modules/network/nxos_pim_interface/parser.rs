//! Running-config parser for PIM interface lines.
//!
//! A small table of line patterns, compiled once, recognizes every PIM line
//! the module manages. Each pattern is applied to the line with any leading
//! `no ` stripped, so the same table reads both device output and the commands
//! the module itself emits.

use super::attributes::{AttrValue, Attribute, BfdMode, Direction, PolicyBinding, PolicyType};
use super::state::{FoldMode, PimInterfaceState};
use crate::modules::network::common::dedent_config;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::{debug, trace, warn};

/// One recognized PIM line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PimCommand {
    /// A positive configuration line
    Set(AttrValue),
    /// A `no ...` line, with the value it named if any
    Negate {
        attribute: Attribute,
        value: Option<AttrValue>,
    },
}

struct LinePattern {
    attribute: Attribute,
    regex: Regex,
}

fn pattern(attribute: Attribute, re: &str) -> LinePattern {
    LinePattern {
        attribute,
        regex: Regex::new(re).expect("valid PIM line pattern"),
    }
}

static LINE_PATTERNS: Lazy<Vec<LinePattern>> = Lazy::new(|| {
    vec![
        pattern(Attribute::DrPriority, r"^ip pim dr-priority(?:\s+(\d+))?$"),
        pattern(Attribute::HelloInterval, r"^ip pim hello-interval(?:\s+(\d+))?$"),
        pattern(
            Attribute::JpPolicyIn,
            r"^ip pim jp-policy(?:\s+(prefix-list))?\s+(\S+)(?:\s+(in|out))?$",
        ),
        pattern(
            Attribute::NeighborPolicy,
            r"^ip pim neighbor-policy(?:\s+(prefix-list))?\s+(\S+)$",
        ),
        pattern(Attribute::SparseMode, r"^ip pim sparse-mode$"),
        pattern(Attribute::Border, r"^ip pim border$"),
        pattern(Attribute::Bfd, r"^ip pim bfd-instance(?:\s+(disable))?$"),
    ]
});

fn binding(caps: &Captures<'_>) -> Option<PolicyBinding> {
    let kind = if caps.get(1).is_some() {
        PolicyType::Prefix
    } else {
        PolicyType::Routemap
    };
    caps.get(2).map(|name| PolicyBinding::new(name.as_str(), kind))
}

fn number(caps: &Captures<'_>) -> Option<u32> {
    caps.get(1).and_then(|m| m.as_str().parse().ok())
}

/// Decode the captured value of a matched line.
fn decode(attribute: Attribute, caps: &Captures<'_>) -> Option<AttrValue> {
    match attribute {
        Attribute::DrPriority => number(caps).map(AttrValue::DrPriority),
        Attribute::HelloInterval => number(caps).map(AttrValue::HelloInterval),
        Attribute::JpPolicyIn | Attribute::JpPolicyOut => {
            let direction = match caps.get(3).map(|m| m.as_str()) {
                Some("in") => Direction::In,
                Some("out") => Direction::Out,
                _ => Direction::Both,
            };
            binding(caps).map(|b| AttrValue::JpPolicy(direction, b))
        }
        Attribute::NeighborPolicy => binding(caps).map(AttrValue::NeighborPolicy),
        Attribute::SparseMode => Some(AttrValue::SparseMode),
        Attribute::Border => Some(AttrValue::Border),
        Attribute::Bfd => Some(AttrValue::Bfd(if caps.get(1).is_some() {
            BfdMode::Disable
        } else {
            BfdMode::Enable
        })),
    }
}

/// Whether a line is a PIM interface line at all
pub fn is_pim_line(line: &str) -> bool {
    let line = line.trim();
    let line = line.strip_prefix("no ").unwrap_or(line).trim_start();
    line.starts_with("ip pim ")
}

/// Parse a single configuration line or command.
///
/// Returns `None` for lines that are not recognized PIM lines.
pub fn parse_line(line: &str) -> Option<PimCommand> {
    let trimmed = line.split_whitespace().collect::<Vec<_>>().join(" ");
    let (negated, body) = match trimmed.strip_prefix("no ") {
        Some(rest) => (true, rest),
        None => (false, trimmed.as_str()),
    };

    for pattern in LINE_PATTERNS.iter() {
        let Some(caps) = pattern.regex.captures(body) else {
            continue;
        };
        let value = decode(pattern.attribute, &caps);

        return if negated {
            let attribute = value
                .as_ref()
                .map(AttrValue::attribute)
                .unwrap_or(pattern.attribute);
            Some(PimCommand::Negate { attribute, value })
        } else {
            // A positive numeric line needs its argument.
            value.map(PimCommand::Set)
        };
    }

    None
}

/// Parse the configuration of one interface into its PIM state.
///
/// The text is what the device returns for a scoped `interface <name>`
/// request: the header line and indented body. `None` or empty text yields the
/// all-default state. Unrecognized `ip pim` lines are logged and skipped.
pub fn parse_config(text: Option<&str>) -> PimInterfaceState {
    let mut state = PimInterfaceState::default();
    let Some(text) = text else {
        debug!("No interface configuration returned");
        return state;
    };

    let mut seen_header = false;
    for line in dedent_config(text).lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('!') || line.starts_with('#') {
            continue;
        }

        if line.starts_with("interface ") {
            if seen_header {
                warn!(line = %line, "Ignoring configuration after a second interface header");
                break;
            }
            seen_header = true;
            continue;
        }

        if !is_pim_line(line) {
            trace!(line = %line, "Skipping non-PIM line");
            continue;
        }

        match parse_line(line) {
            Some(command) => {
                debug!(line = %line, "Parsed PIM line");
                state.absorb(command, FoldMode::Config);
            }
            None => warn!(line = %line, "Unrecognized PIM interface line"),
        }
    }

    state
}
