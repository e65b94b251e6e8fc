//! Subcommands module for nxos-pim CLI
//!
//! This module contains all the subcommand implementations.

pub mod apply;
pub mod parse;

use crate::cli::output::{OutputFormatter, Palette};
use crate::cli::{Cli, OutputFormat};
use anyhow::Result;
use nxos_pim::config::Config;
use nxos_pim::modules::network::SnapshotDevice;
use nxos_pim::modules::{ModuleError, ModuleParams, ModuleRegistry};
use nxos_pim::Error;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Common context shared between commands
pub struct CommandContext {
    /// Configuration
    pub config: Config,
    /// Output formatter
    pub output: OutputFormatter,
    /// Selected output format
    pub format: OutputFormat,
    /// Check mode (dry-run)
    pub check_mode: bool,
    /// Diff mode
    pub diff_mode: bool,
}

impl CommandContext {
    /// Create a new command context from CLI arguments
    pub fn new(cli: &Cli, config: Config) -> Self {
        let format = cli.output_format(&config.defaults.output);
        let use_color = !cli.no_color && config.colors.enabled;
        let output = OutputFormatter::new(use_color, format, cli.verbosity())
            .with_palette(Palette::from_config(&config.colors));

        Self {
            check_mode: cli.check_mode || config.defaults.check_mode,
            diff_mode: cli.diff_mode || config.defaults.diff_mode,
            config,
            output,
            format,
        }
    }

    /// Open the running-config snapshot that stands in for the device.
    ///
    /// The explicit path wins over the configured one; canned command
    /// outputs from the configuration are preloaded.
    pub fn open_device(&self, running_config: Option<&PathBuf>) -> Result<Arc<SnapshotDevice>> {
        let path = running_config
            .or(self.config.running_config())
            .ok_or_else(|| {
                Error::Config(
                    "no running-config given; pass --running-config or set device.running_config"
                        .to_string(),
                )
            })?;

        let snapshot = SnapshotDevice::open(path).map_err(Error::from)?;
        let device = self
            .config
            .device
            .command_outputs
            .iter()
            .fold(snapshot, |device, (command, output)| {
                device.with_command_output(command.clone(), output.clone())
            });

        self.output
            .debug(&format!("Loaded running-config from {}", path.display()));
        Ok(Arc::new(device))
    }

    /// Name used for the device in output
    pub fn device_name(&self, path: Option<&PathBuf>) -> String {
        self.config
            .device
            .name
            .clone()
            .or_else(|| {
                path.or(self.config.running_config())
                    .and_then(|p| p.file_stem())
                    .map(|s| s.to_string_lossy().into_owned())
            })
            .unwrap_or_else(|| "device".to_string())
    }
}

/// Parse module parameters given as `key=value` pairs or `@file.yml`.
///
/// Values are read as YAML scalars so `dr_prio=10` arrives as a number and
/// `sparse=true` as a boolean; anything unparsable is kept as a string.
pub fn parse_module_args(args: &[String]) -> Result<ModuleParams> {
    let mut params = ModuleParams::new();

    for arg in args {
        if let Some(file_path) = arg.strip_prefix('@') {
            let path = Path::new(file_path);
            if !path.exists() {
                return Err(Error::FileNotFound(path.to_path_buf()).into());
            }
            let content = std::fs::read_to_string(path).map_err(Error::from)?;
            let file_params: HashMap<String, serde_yaml::Value> =
                serde_yaml::from_str(&content).map_err(Error::from)?;
            for (key, value) in file_params {
                params.insert(key, serde_json::to_value(value).map_err(Error::from)?);
            }
        } else if let Some((key, value)) = arg.split_once('=') {
            let parsed: serde_yaml::Value = serde_yaml::from_str(value)
                .unwrap_or_else(|_| serde_yaml::Value::String(value.to_string()));
            let parsed = match parsed {
                serde_yaml::Value::Mapping(_) | serde_yaml::Value::Sequence(_) => {
                    serde_yaml::Value::String(value.to_string())
                }
                scalar => scalar,
            };
            params.insert(
                key.trim().to_string(),
                serde_json::to_value(parsed).map_err(Error::from)?,
            );
        } else {
            return Err(Error::module_args(
                "nxos_pim_interface",
                format!("expected key=value or @file, got '{}'", arg),
            )
            .into());
        }
    }

    Ok(params)
}

/// Convert a module failure into the crate error, keeping the module name.
pub fn module_error(module: &str, err: ModuleError) -> Error {
    match err {
        ModuleError::NotFound(_) | ModuleError::Device(_) => err.into(),
        other => Error::module_execution(module, other),
    }
}

/// Print the registered module names
pub fn list_modules(ctx: &CommandContext) -> Result<i32> {
    let registry = ModuleRegistry::with_builtins();
    let mut names: Vec<String> = registry.names().into_iter().map(String::from).collect();
    names.sort();

    if ctx.format == OutputFormat::Human {
        ctx.output.list("modules", &names);
    } else {
        ctx.output.structured(&names)?;
    }
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_key_value_args() {
        let params = parse_module_args(&strings(&[
            "interface=eth1/33",
            "dr_prio=10",
            "sparse=true",
            "jp_policy_in=default",
        ]))
        .unwrap();

        assert_eq!(params.get("interface"), Some(&json!("eth1/33")));
        assert_eq!(params.get("dr_prio"), Some(&json!(10)));
        assert_eq!(params.get("sparse"), Some(&json!(true)));
        assert_eq!(params.get("jp_policy_in"), Some(&json!("default")));
    }

    #[test]
    fn test_parse_flow_values_stay_strings() {
        let params = parse_module_args(&strings(&["neighbor_policy=[a, b]"])).unwrap();
        assert_eq!(params.get("neighbor_policy"), Some(&json!("[a, b]")));
    }

    #[test]
    fn test_parse_args_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("params.yml");
        std::fs::write(&path, "interface: Ethernet1/1\nhello_interval: 30\nbfd: enable\n").unwrap();

        let params = parse_module_args(&[format!("@{}", path.display())]).unwrap();
        assert_eq!(params.len(), 3);
        assert_eq!(params.get("hello_interval"), Some(&json!(30)));
        assert_eq!(params.get("bfd"), Some(&json!("enable")));
    }

    #[test]
    fn test_parse_args_missing_file() {
        let err = parse_module_args(&strings(&["@/nonexistent/params.yml"])).unwrap_err();
        let err = err.downcast::<Error>().unwrap();
        assert!(matches!(err, Error::FileNotFound(_)));
    }

    #[test]
    fn test_parse_args_rejects_bare_words() {
        let err = parse_module_args(&strings(&["sparse"])).unwrap_err();
        let err = err.downcast::<Error>().unwrap();
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn test_module_error_keeps_name() {
        let err = module_error(
            "nxos_pim_interface",
            ModuleError::InvalidParameter("bad".into()),
        );
        assert!(err.to_string().contains("nxos_pim_interface"));

        let err = module_error("nope", ModuleError::NotFound("nope".into()));
        assert!(matches!(err, Error::ModuleNotFound(_)));
    }
}
