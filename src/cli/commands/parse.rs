//! Parse command - show the PIM state of an interface

use super::CommandContext;
use crate::cli::OutputFormat;
use anyhow::Result;
use clap::Args;
use nxos_pim::modules::network::nxos_pim_interface::parser::parse_config;
use nxos_pim::modules::network::{NxosDevice, SnapshotDevice};
use nxos_pim::Error;
use serde::Serialize;
use std::path::PathBuf;

/// Arguments for the parse command
#[derive(Args, Debug, Clone)]
pub struct ParseArgs {
    /// Running-config file to read
    pub file: PathBuf,

    /// Interface whose PIM settings are parsed
    #[arg(short = 'i', long)]
    pub interface: String,
}

#[derive(Serialize)]
struct ParsedInterface<'a> {
    interface: &'a str,
    state: &'a nxos_pim::modules::network::nxos_pim_interface::PimInterfaceState,
}

impl ParseArgs {
    /// Execute the parse command
    pub fn execute(&self, ctx: &mut CommandContext) -> Result<i32> {
        if !self.file.exists() {
            return Err(Error::FileNotFound(self.file.clone()).into());
        }

        let device = SnapshotDevice::open(&self.file).map_err(Error::from)?;
        let section = device
            .get_config(&[format!("interface {}", self.interface)])
            .map_err(Error::from)?;
        let state = parse_config(section.as_deref());

        if ctx.format != OutputFormat::Human {
            ctx.output.structured(&ParsedInterface {
                interface: &self.interface,
                state: &state,
            })?;
            return Ok(0);
        }

        let lines = state.to_config_lines();
        if lines.is_empty() {
            ctx.output.section(&format!("interface {}", self.interface));
            println!("(no PIM configuration)");
        } else {
            ctx.output
                .list(&format!("interface {}", self.interface), &lines);
        }
        Ok(0)
    }
}
