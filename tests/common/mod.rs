//! Shared test utilities and fixtures for the nxos-pim test suite.
//!
//! This module provides:
//! - A mock [`NxosDevice`] that records reads, pushes and exec commands
//! - Failure injection for the read and write paths
//! - Helpers to build module parameters and run the module
//!
//! # Usage
//!
//! ```rust,ignore
//! mod common;
//! use common::*;
//! ```

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use nxos_pim::modules::network::{DeviceError, DeviceResult, NxosDevice};
use nxos_pim::modules::{ModuleContext, ModuleOutput, ModuleParams, ModuleRegistry, ModuleResult};

// ============================================================================
// Mock Device Implementation
// ============================================================================

/// A mock device for testing purposes.
///
/// Every `get_config` call returns the same configuration text regardless of
/// the requested scope, and nothing pushed is ever folded back.
///
/// # Example
///
/// ```rust,ignore
/// let mock = MockDevice::with_config("interface Ethernet9/2\n  ip pim bfd-instance\n");
/// let output = run_module(&mock, json!({"interface": "Ethernet9/2", "bfd": "disable"})).unwrap();
/// assert_eq!(mock.push_count(), 1);
/// ```
#[derive(Debug)]
pub struct MockDevice {
    identifier: String,
    config: RwLock<Option<String>>,
    command_outputs: RwLock<HashMap<String, String>>,
    config_requests: RwLock<Vec<Vec<String>>>,
    commands_run: RwLock<Vec<String>>,
    pushed: RwLock<Vec<Vec<String>>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    read_count: AtomicU32,
}

impl MockDevice {
    /// Create a mock device that returns no configuration.
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            config: RwLock::new(None),
            command_outputs: RwLock::new(HashMap::new()),
            config_requests: RwLock::new(Vec::new()),
            commands_run: RwLock::new(Vec::new()),
            pushed: RwLock::new(Vec::new()),
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
            read_count: AtomicU32::new(0),
        }
    }

    /// Create a mock device that returns the given configuration text.
    pub fn with_config(config: &str) -> Self {
        let mock = Self::new("mock-n9k");
        mock.set_config(Some(config));
        mock
    }

    /// Replace the configuration returned by `get_config`.
    pub fn set_config(&self, config: Option<&str>) {
        *self.config.write() = config.map(String::from);
    }

    /// Preset the output of an exec-mode command.
    pub fn set_command_output(&self, command: impl Into<String>, output: impl Into<String>) {
        self.command_outputs
            .write()
            .insert(command.into(), output.into());
    }

    /// Make every configuration read fail.
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every configuration push fail.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Batches pushed so far.
    pub fn pushed(&self) -> Vec<Vec<String>> {
        self.pushed.read().clone()
    }

    /// Number of batches pushed.
    pub fn push_count(&self) -> usize {
        self.pushed.read().len()
    }

    /// Section filters passed to `get_config`, one entry per call.
    pub fn config_requests(&self) -> Vec<Vec<String>> {
        self.config_requests.read().clone()
    }

    /// Number of `get_config` calls.
    pub fn read_count(&self) -> u32 {
        self.read_count.load(Ordering::SeqCst)
    }

    /// Exec-mode commands run so far.
    pub fn commands_run(&self) -> Vec<String> {
        self.commands_run.read().clone()
    }

    /// Forget recorded calls, keeping configuration and outputs.
    pub fn reset(&self) {
        self.config_requests.write().clear();
        self.commands_run.write().clear();
        self.pushed.write().clear();
        self.read_count.store(0, Ordering::SeqCst);
    }
}

impl NxosDevice for MockDevice {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn get_config(&self, flags: &[String]) -> DeviceResult<Option<String>> {
        self.read_count.fetch_add(1, Ordering::SeqCst);
        self.config_requests.write().push(flags.to_vec());

        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(DeviceError::ConfigRead {
                device: self.identifier.clone(),
                message: "connection reset by peer".to_string(),
            });
        }
        Ok(self.config.read().clone())
    }

    fn load_config(&self, commands: &[String]) -> DeviceResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DeviceError::ConfigLoad {
                device: self.identifier.clone(),
                message: "% Invalid command at '^' marker".to_string(),
            });
        }
        self.pushed.write().push(commands.to_vec());
        Ok(())
    }

    fn run_commands(&self, commands: &[String]) -> DeviceResult<Vec<String>> {
        let outputs = self.command_outputs.read();
        let mut results = Vec::with_capacity(commands.len());
        for command in commands {
            self.commands_run.write().push(command.clone());
            results.push(outputs.get(command).cloned().unwrap_or_default());
        }
        Ok(results)
    }
}

// ============================================================================
// Module Helpers
// ============================================================================

/// Build module parameters from a JSON object.
pub fn params(value: serde_json::Value) -> ModuleParams {
    serde_json::from_value(value).expect("module params must be a JSON object")
}

/// Run `nxos_pim_interface` against a shared mock device.
pub fn run_with(
    device: &Arc<MockDevice>,
    args: serde_json::Value,
    check_mode: bool,
    diff_mode: bool,
) -> ModuleResult<ModuleOutput> {
    let context = ModuleContext::new()
        .with_check_mode(check_mode)
        .with_diff_mode(diff_mode)
        .with_device(device.clone());
    ModuleRegistry::with_builtins().execute("nxos_pim_interface", &params(args), &context)
}

/// Run `nxos_pim_interface` in normal mode.
pub fn run_module(device: &Arc<MockDevice>, args: serde_json::Value) -> ModuleResult<ModuleOutput> {
    run_with(device, args, false, false)
}

/// Assert the module reported `changed` and exactly `expected` commands.
pub fn assert_commands(output: &ModuleOutput, changed: bool, expected: &[&str]) {
    assert_eq!(
        output.changed, changed,
        "unexpected changed flag for commands {:?}",
        output.commands()
    );
    let expected: Vec<String> = expected.iter().map(|s| s.to_string()).collect();
    pretty_assertions::assert_eq!(output.commands(), expected);
}

/// Assert the module reported no change and pushed nothing new.
pub fn assert_unchanged(device: &MockDevice, output: &ModuleOutput, pushes_before: usize) {
    assert_commands(output, false, &[]);
    assert_eq!(device.push_count(), pushes_before);
}
