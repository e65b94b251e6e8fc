//! Common network device utilities and types
//!
//! This module provides shared functionality for network device modules including:
//! - The device collaborator trait used to read and write configuration
//! - Interface name classification and operational mode lookup
//! - Running-config sectioning
//! - Configuration diff generation

use crate::modules::Diff;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use similar::{ChangeTag, TextDiff};
use thiserror::Error;

// ============================================================================
// Device Collaborator
// ============================================================================

/// Errors raised by a device collaborator.
///
/// These are surfaced to the caller unchanged; the module layer never retries.
#[derive(Error, Debug)]
pub enum DeviceError {
    /// Reading the running configuration failed.
    #[error("Failed to read configuration from '{device}': {message}")]
    ConfigRead { device: String, message: String },

    /// Pushing a batch of configuration commands failed.
    #[error("Failed to load configuration on '{device}': {message}")]
    ConfigLoad { device: String, message: String },

    /// An exec-mode command failed.
    #[error("Command '{command}' failed: {message}")]
    CommandFailed { command: String, message: String },

    /// I/O error talking to the device or its snapshot.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for device operations
pub type DeviceResult<T> = Result<T, DeviceError>;

/// Capability to read and write configuration on an NX-OS device.
///
/// Implementations own the transport. `load_config` is expected to apply the
/// whole batch or fail.
pub trait NxosDevice: Send + Sync {
    /// Identifier used in logs and error messages
    fn identifier(&self) -> &str;

    /// Fetch running configuration, optionally scoped by section filters
    /// such as `interface Ethernet1/1`. `None` means the device returned nothing.
    fn get_config(&self, flags: &[String]) -> DeviceResult<Option<String>>;

    /// Push configuration commands as one batch
    fn load_config(&self, commands: &[String]) -> DeviceResult<()>;

    /// Run exec-mode commands and return one output per command
    fn run_commands(&self, commands: &[String]) -> DeviceResult<Vec<String>>;
}

// ============================================================================
// Interface Classification
// ============================================================================

/// Kind of interface, derived from its name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterfaceType {
    Ethernet,
    Svi,
    Loopback,
    Management,
    PortChannel,
    Nve,
    Unknown,
}

impl std::fmt::Display for InterfaceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InterfaceType::Ethernet => write!(f, "ethernet"),
            InterfaceType::Svi => write!(f, "svi"),
            InterfaceType::Loopback => write!(f, "loopback"),
            InterfaceType::Management => write!(f, "management"),
            InterfaceType::PortChannel => write!(f, "portchannel"),
            InterfaceType::Nve => write!(f, "nve"),
            InterfaceType::Unknown => write!(f, "unknown"),
        }
    }
}

/// Classify an interface by its (possibly abbreviated) name.
pub fn get_interface_type(interface: &str) -> InterfaceType {
    let name = interface.trim().to_lowercase();
    if name.starts_with("et") {
        InterfaceType::Ethernet
    } else if name.starts_with("vl") {
        InterfaceType::Svi
    } else if name.starts_with("lo") {
        InterfaceType::Loopback
    } else if name.starts_with("mg") || name.starts_with("ma") {
        InterfaceType::Management
    } else if name.starts_with("po") {
        InterfaceType::PortChannel
    } else if name.starts_with("nv") {
        InterfaceType::Nve
    } else {
        InterfaceType::Unknown
    }
}

/// Expand abbreviated interface names to the form NX-OS prints in running-config.
pub fn normalize_interface_name(interface: &str) -> String {
    let name = interface.trim();
    let split = name
        .find(|c: char| c.is_ascii_digit())
        .unwrap_or(name.len());
    let (prefix, suffix) = name.split_at(split);
    let prefix = prefix.trim();

    let full = match get_interface_type(prefix) {
        InterfaceType::Ethernet => "Ethernet",
        InterfaceType::Svi => "Vlan",
        InterfaceType::Loopback => "loopback",
        InterfaceType::Management => "mgmt",
        InterfaceType::PortChannel => "port-channel",
        InterfaceType::Nve => "nve",
        InterfaceType::Unknown => return name.to_string(),
    };
    format!("{}{}", full, suffix)
}

/// Switching mode of an interface as reported by `show interface`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterfaceMode {
    Layer2,
    Layer3,
    Unknown,
}

static PORT_MODE_TEXT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?im)^\s*port mode is (\S+)").expect("valid port mode regex"));

static PORT_MODE_JSON: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""eth_mode"\s*:\s*"([^"]+)""#).expect("valid eth_mode regex"));

/// Parse `show interface` output into an interface mode.
pub fn parse_interface_mode(interface_type: InterfaceType, output: &str) -> InterfaceMode {
    match interface_type {
        InterfaceType::Loopback | InterfaceType::Svi => InterfaceMode::Layer3,
        InterfaceType::Ethernet | InterfaceType::PortChannel => {
            let mode = PORT_MODE_TEXT
                .captures(output)
                .or_else(|| PORT_MODE_JSON.captures(output))
                .map(|caps| caps[1].to_lowercase());

            match mode.as_deref() {
                Some("access") | Some("trunk") | Some("fex-fabric") => InterfaceMode::Layer2,
                Some("routed") | Some("layer3") => InterfaceMode::Layer3,
                _ => InterfaceMode::Unknown,
            }
        }
        _ => InterfaceMode::Unknown,
    }
}

/// Look up the operational mode of an interface through the device.
///
/// Only ethernet and port-channel interfaces are queried; loopbacks and SVIs
/// are always layer 3.
pub fn get_interface_mode(
    device: &dyn NxosDevice,
    interface: &str,
) -> DeviceResult<InterfaceMode> {
    let interface_type = get_interface_type(interface);
    if !matches!(
        interface_type,
        InterfaceType::Ethernet | InterfaceType::PortChannel
    ) {
        return Ok(parse_interface_mode(interface_type, ""));
    }

    let outputs = device.run_commands(&[format!("show interface {}", interface)])?;
    let output = outputs.first().map(String::as_str).unwrap_or_default();
    Ok(parse_interface_mode(interface_type, output))
}

// ============================================================================
// Running-config Sections
// ============================================================================

/// A top-level block of configuration and its indented children
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigSection {
    /// The section header (e.g., "interface Ethernet1/1")
    pub path: String,
    /// The section content, header included
    pub content: String,
    /// First line of the section (zero-based)
    pub start_line: usize,
    /// Last line of the section, inclusive (zero-based)
    pub end_line: usize,
}

impl ConfigSection {
    /// Body lines of the section, without the header
    pub fn body(&self) -> impl Iterator<Item = &str> {
        self.content.lines().skip(1)
    }
}

/// Split configuration text into top-level sections.
///
/// Any non-blank line at column zero that is not a comment starts a section;
/// indented lines belong to the section above them.
pub fn parse_config_sections(content: &str) -> Vec<ConfigSection> {
    let mut sections: Vec<ConfigSection> = Vec::new();
    let mut current: Option<ConfigSection> = None;

    for (line_num, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        let top_level = !line.starts_with(char::is_whitespace)
            && !trimmed.is_empty()
            && !trimmed.starts_with('!')
            && !trimmed.starts_with('#');

        if top_level {
            if let Some(section) = current.take() {
                sections.push(section);
            }
            current = Some(ConfigSection {
                path: trimmed.to_string(),
                content: line.to_string(),
                start_line: line_num,
                end_line: line_num,
            });
        } else if let Some(ref mut section) = current {
            if trimmed.is_empty() || trimmed.starts_with('!') {
                continue;
            }
            section.content.push('\n');
            section.content.push_str(line);
            section.end_line = line_num;
        }
    }

    if let Some(section) = current {
        sections.push(section);
    }

    sections
}

/// Find the `interface <name>` section, tolerating abbreviated names.
pub fn find_interface_section(content: &str, interface: &str) -> Option<ConfigSection> {
    let wanted = normalize_interface_name(interface).to_lowercase();
    parse_config_sections(content).into_iter().find(|s| {
        s.path
            .strip_prefix("interface ")
            .map(|name| normalize_interface_name(name).to_lowercase() == wanted)
            .unwrap_or(false)
    })
}

/// Strip the common leading indentation the device adds when echoing a scoped config.
pub fn dedent_config(content: &str) -> String {
    let indent = content
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);

    content
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.get(indent..).unwrap_or(l.trim_start()))
        .collect::<Vec<_>>()
        .join("\n")
}

// ============================================================================
// Configuration Diff
// ============================================================================

/// Generate a unified diff between two configurations
pub fn generate_config_diff(before: &str, after: &str) -> Diff {
    let text_diff = TextDiff::from_lines(before, after);

    let mut details = String::new();
    let mut additions = 0;
    let mut deletions = 0;

    for change in text_diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => {
                deletions += 1;
                "-"
            }
            ChangeTag::Insert => {
                additions += 1;
                "+"
            }
            ChangeTag::Equal => " ",
        };
        details.push_str(sign);
        details.push_str(change.value());
        if !change.value().ends_with('\n') {
            details.push('\n');
        }
    }

    Diff {
        before: before.to_string(),
        after: after.to_string(),
        details: Some(format!(
            "{} additions, {} deletions\n{}",
            additions, deletions, details
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RUNNING: &str = "\
hostname n9k
feature pim
!
interface Ethernet2/1
  description uplink
  ip pim sparse-mode
  ip pim dr-priority 10

interface loopback0
  ip address 10.0.0.1/32
";

    #[test]
    fn test_interface_type() {
        assert_eq!(get_interface_type("Ethernet1/1"), InterfaceType::Ethernet);
        assert_eq!(get_interface_type("eth2/1"), InterfaceType::Ethernet);
        assert_eq!(get_interface_type("Vlan10"), InterfaceType::Svi);
        assert_eq!(get_interface_type("loopback0"), InterfaceType::Loopback);
        assert_eq!(get_interface_type("mgmt0"), InterfaceType::Management);
        assert_eq!(get_interface_type("port-channel5"), InterfaceType::PortChannel);
        assert_eq!(get_interface_type("nve1"), InterfaceType::Nve);
        assert_eq!(get_interface_type("tunnel1"), InterfaceType::Unknown);
    }

    #[test]
    fn test_normalize_interface_name() {
        assert_eq!(normalize_interface_name("eth2/1"), "Ethernet2/1");
        assert_eq!(normalize_interface_name("Ethernet9/2"), "Ethernet9/2");
        assert_eq!(normalize_interface_name("po10"), "port-channel10");
        assert_eq!(normalize_interface_name("lo0"), "loopback0");
        assert_eq!(normalize_interface_name("tunnel1"), "tunnel1");
    }

    #[test]
    fn test_parse_interface_mode() {
        let routed = "Ethernet1/1 is up\n  Port mode is routed\n";
        let access = "Ethernet1/2 is up\n  Port mode is access\n";
        let json = r#"{"TABLE_interface": {"ROW_interface": {"eth_mode": "trunk"}}}"#;

        assert_eq!(
            parse_interface_mode(InterfaceType::Ethernet, routed),
            InterfaceMode::Layer3
        );
        assert_eq!(
            parse_interface_mode(InterfaceType::Ethernet, access),
            InterfaceMode::Layer2
        );
        assert_eq!(
            parse_interface_mode(InterfaceType::PortChannel, json),
            InterfaceMode::Layer2
        );
        assert_eq!(
            parse_interface_mode(InterfaceType::Ethernet, ""),
            InterfaceMode::Unknown
        );
        assert_eq!(
            parse_interface_mode(InterfaceType::Loopback, ""),
            InterfaceMode::Layer3
        );
    }

    #[test]
    fn test_parse_config_sections() {
        let sections = parse_config_sections(RUNNING);
        let paths: Vec<_> = sections.iter().map(|s| s.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "hostname n9k",
                "feature pim",
                "interface Ethernet2/1",
                "interface loopback0"
            ]
        );
        assert_eq!(sections[2].start_line, 3);
        assert_eq!(sections[2].end_line, 6);
        assert_eq!(sections[2].body().count(), 3);
    }

    #[test]
    fn test_find_interface_section() {
        let section = find_interface_section(RUNNING, "eth2/1").unwrap();
        assert_eq!(section.path, "interface Ethernet2/1");
        assert!(section.content.contains("ip pim dr-priority 10"));
        assert!(find_interface_section(RUNNING, "Ethernet3/1").is_none());
    }

    #[test]
    fn test_dedent_config() {
        let scoped = "\n            interface Ethernet9/2\n              ip pim bfd-instance\n        ";
        assert_eq!(
            dedent_config(scoped),
            "interface Ethernet9/2\n  ip pim bfd-instance"
        );
    }

    #[test]
    fn test_config_diff() {
        let before = "interface Ethernet1/1\n  ip pim dr-priority 1\n";
        let after = "interface Ethernet1/1\n  ip pim dr-priority 5\n";

        let diff = generate_config_diff(before, after);
        let details = diff.details.unwrap();
        assert!(details.starts_with("1 additions, 1 deletions"));
        assert!(details.contains("-  ip pim dr-priority 1"));
        assert!(details.contains("+  ip pim dr-priority 5"));
    }
}
