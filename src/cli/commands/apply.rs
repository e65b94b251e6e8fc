//! Apply and check commands
//!
//! `apply` reconciles one interface against a running-config snapshot and,
//! when asked, writes the converged configuration back. `check` is the same
//! run with check mode forced on.

use super::{module_error, parse_module_args, CommandContext};
use anyhow::Result;
use clap::Args;
use nxos_pim::modules::{ModuleContext, ModuleRegistry, ParamExt};
use nxos_pim::Error;
use std::path::PathBuf;
use tracing::{debug, info};

/// Arguments shared by apply and check
#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    /// Module parameters (key=value or @file.yml)
    #[arg(short = 'a', long = "arg", action = clap::ArgAction::Append)]
    pub args: Vec<String>,

    /// Running-config file acting as the device
    #[arg(short = 'r', long)]
    pub running_config: Option<PathBuf>,

    /// Module to run
    #[arg(short = 'm', long, default_value = "nxos_pim_interface")]
    pub module: String,
}

/// Arguments for the apply command
#[derive(Args, Debug, Clone)]
pub struct ApplyArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Write the pushed commands back into the running-config file
    #[arg(short = 'w', long)]
    pub write: bool,
}

/// Arguments for the check command
#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    #[command(flatten)]
    pub target: TargetArgs,
}

impl ApplyArgs {
    /// Execute the apply command
    pub fn execute(&self, ctx: &mut CommandContext) -> Result<i32> {
        let target = &self.target;
        let params = parse_module_args(&target.args)?;
        let device = ctx.open_device(target.running_config.as_ref())?;
        let device_name = ctx.device_name(target.running_config.as_ref());

        let interface = params
            .get_string("interface")
            .map_err(|e| module_error(&target.module, e))?
            .unwrap_or_default();
        ctx.output
            .task_header(&format!("{} : {}", target.module, interface));

        let module_ctx = ModuleContext::new()
            .with_check_mode(ctx.check_mode)
            .with_diff_mode(ctx.diff_mode)
            .with_device(device.clone());

        debug!(module = %target.module, params = ?params, "Executing module");
        let output = ModuleRegistry::with_builtins()
            .execute(&target.module, &params, &module_ctx)
            .map_err(|e| module_error(&target.module, e))?;

        ctx.output.module_output(&device_name, &output)?;

        let write_back = self.write || ctx.config.defaults.write_back;
        if self.write && ctx.check_mode {
            ctx.output
                .warning("--write is ignored in check mode; nothing was pushed");
        }
        if output.changed && write_back && !ctx.check_mode {
            device.save().map_err(Error::from)?;
            info!(device = %device_name, "Wrote converged running-config");
            ctx.output.info(&format!(
                "Wrote running-config for {}",
                device_name
            ));
        }

        ctx.output.elapsed();
        Ok(0)
    }
}

impl CheckArgs {
    /// Execute the check command
    pub fn execute(&self, ctx: &mut CommandContext) -> Result<i32> {
        // Force check mode
        ctx.check_mode = true;

        let apply = ApplyArgs {
            target: self.target.clone(),
            write: false,
        };
        apply.execute(ctx)
    }
}
