//! File-backed device collaborator.
//!
//! [`SnapshotDevice`] serves a saved NX-OS running-config as if it were a live
//! switch. Scoped reads return the matching `interface` section; pushed
//! batches are recorded and folded back into the text so a second run sees
//! the converged configuration.

use super::common::{
    find_interface_section, normalize_interface_name, parse_config_sections, DeviceError,
    DeviceResult, NxosDevice,
};
use super::nxos_pim_interface::parser::{is_pim_line, parse_config};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

/// A running-config snapshot acting as a device
#[derive(Debug)]
pub struct SnapshotDevice {
    identifier: String,
    path: Option<PathBuf>,
    content: RwLock<String>,
    pushed: RwLock<Vec<Vec<String>>>,
    command_outputs: RwLock<HashMap<String, String>>,
}

impl SnapshotDevice {
    /// Create a device over in-memory configuration text
    pub fn new(identifier: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            path: None,
            content: RwLock::new(content.into()),
            pushed: RwLock::new(Vec::new()),
            command_outputs: RwLock::new(HashMap::new()),
        }
    }

    /// Load a running-config file. A missing file is an empty configuration.
    pub fn open(path: impl AsRef<Path>) -> DeviceResult<Self> {
        let path = path.as_ref();
        let content = if path.exists() {
            std::fs::read_to_string(path)?
        } else {
            debug!(path = %path.display(), "Snapshot file does not exist, starting empty");
            String::new()
        };

        let mut device = Self::new(path.display().to_string(), content);
        device.path = Some(path.to_path_buf());
        Ok(device)
    }

    /// Preset the output returned for an exec-mode command
    pub fn with_command_output(self, command: impl Into<String>, output: impl Into<String>) -> Self {
        self.command_outputs
            .write()
            .insert(command.into(), output.into());
        self
    }

    /// Current configuration text, including folded pushes
    pub fn content(&self) -> String {
        self.content.read().clone()
    }

    /// Every batch accepted by `load_config`, in order
    pub fn pushed(&self) -> Vec<Vec<String>> {
        self.pushed.read().clone()
    }

    /// Write the configuration back to the file it was opened from.
    pub fn save(&self) -> DeviceResult<()> {
        let path = self.path.as_ref().ok_or_else(|| DeviceError::ConfigLoad {
            device: self.identifier.clone(),
            message: "snapshot has no backing file".to_string(),
        })?;
        std::fs::write(path, self.content.read().as_bytes())?;
        debug!(path = %path.display(), "Saved snapshot");
        Ok(())
    }

    /// Synthesize `show interface` output from the section's switchport lines.
    fn show_interface(&self, interface: &str) -> String {
        let content = self.content.read();
        let Some(section) = find_interface_section(&content, interface) else {
            return String::new();
        };

        let mut mode = None;
        for line in section.body().map(str::trim) {
            if line == "no switchport" {
                mode = Some("routed");
            } else if line == "switchport" {
                mode = mode.or(Some("access"));
            } else if let Some(m) = line.strip_prefix("switchport mode ") {
                mode = Some(match m {
                    "trunk" => "trunk",
                    "fex-fabric" => "fex-fabric",
                    _ => "access",
                });
            }
        }

        match mode {
            Some(mode) => format!("{} is up\n  Port mode is {}\n", section.path, mode),
            None => String::new(),
        }
    }

    /// Fold a batch of PIM commands for one interface into the text.
    fn fold_interface(content: &str, interface: &str, commands: &[String]) -> String {
        let mut lines: Vec<String> = content.lines().map(String::from).collect();

        match find_interface_section(content, interface) {
            Some(section) => {
                let state = parse_config(Some(section.content.as_str())).apply_commands(commands);
                let mut block = vec![section.path.clone()];
                block.extend(
                    section
                        .body()
                        .filter(|line| !is_pim_line(line))
                        .map(String::from),
                );
                block.extend(state.to_config_lines().into_iter().map(|l| format!("  {}", l)));

                lines.splice(section.start_line..=section.end_line, block);
            }
            None => {
                let state = parse_config(None).apply_commands(commands);
                lines.push(format!("interface {}", normalize_interface_name(interface)));
                lines.extend(state.to_config_lines().into_iter().map(|l| format!("  {}", l)));
            }
        }

        let mut out = lines.join("\n");
        out.push('\n');
        out
    }
}

impl NxosDevice for SnapshotDevice {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn get_config(&self, flags: &[String]) -> DeviceResult<Option<String>> {
        let content = self.content.read();
        if flags.is_empty() {
            return Ok(Some(content.clone()));
        }

        let mut matched = Vec::new();
        for flag in flags {
            if let Some(interface) = flag.strip_prefix("interface ") {
                if let Some(section) = find_interface_section(&content, interface) {
                    matched.push(section.content);
                }
            } else {
                matched.extend(
                    parse_config_sections(&content)
                        .into_iter()
                        .filter(|s| s.path.starts_with(flag.as_str()))
                        .map(|s| s.content),
                );
            }
        }

        trace!(flags = ?flags, sections = matched.len(), "Scoped config read");
        Ok((!matched.is_empty()).then(|| matched.join("\n")))
    }

    fn load_config(&self, commands: &[String]) -> DeviceResult<()> {
        let mut content = self.content.write();
        let mut interface: Option<&str> = None;
        let mut batch: Vec<String> = Vec::new();

        let flush = |interface: Option<&str>, batch: &mut Vec<String>, content: &mut String| {
            if batch.is_empty() {
                return;
            }
            match interface {
                Some(name) => *content = Self::fold_interface(content, name, batch),
                None => warn!(commands = ?batch, "Dropping commands outside interface context"),
            }
            batch.clear();
        };

        for command in commands {
            let command = command.trim();
            if let Some(name) = command.strip_prefix("interface ") {
                flush(interface, &mut batch, &mut *content);
                interface = Some(name.trim());
            } else if is_pim_line(command) {
                batch.push(command.to_string());
            } else {
                warn!(command = %command, "Snapshot ignores non-PIM command");
            }
        }
        flush(interface, &mut batch, &mut *content);

        self.pushed.write().push(commands.to_vec());
        Ok(())
    }

    fn run_commands(&self, commands: &[String]) -> DeviceResult<Vec<String>> {
        let outputs = self.command_outputs.read();
        Ok(commands
            .iter()
            .map(|command| match outputs.get(command) {
                Some(output) => output.clone(),
                None => command
                    .strip_prefix("show interface ")
                    .map(|interface| self.show_interface(interface.trim()))
                    .unwrap_or_default(),
            })
            .collect())
    }
}
