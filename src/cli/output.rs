//! Output formatting module for nxos-pim
//!
//! Provides colored human output plus JSON and YAML renderings of module
//! results. Messages and errors go to stderr so structured output on stdout
//! stays machine-readable.

use crate::cli::OutputFormat;
use anyhow::Result;
use colored::{Color, Colorize};
use nxos_pim::config::ColorsConfig;
use nxos_pim::modules::{Diff, ModuleOutput, ModuleStatus};
use serde::Serialize;
use std::io::{self, Write};
use std::time::{Duration, Instant};

/// Task execution status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    /// Nothing to change
    Ok,
    /// Commands were pushed (or would be, in check mode)
    Changed,
}

impl TaskStatus {
    /// Get the colored string representation
    pub fn colored_string(&self, palette: &Palette) -> String {
        match self {
            TaskStatus::Ok => "ok".color(palette.ok).to_string(),
            TaskStatus::Changed => "changed".color(palette.changed).to_string(),
        }
    }

    /// Get the plain string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Ok => "ok",
            TaskStatus::Changed => "changed",
        }
    }
}

impl From<ModuleStatus> for TaskStatus {
    fn from(status: ModuleStatus) -> Self {
        match status {
            ModuleStatus::Ok => TaskStatus::Ok,
            ModuleStatus::Changed => TaskStatus::Changed,
        }
    }
}

/// Colors resolved from the `[colors]` configuration section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub ok: Color,
    pub changed: Color,
    pub error: Color,
    pub diff_add: Color,
    pub diff_remove: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            ok: Color::Green,
            changed: Color::Yellow,
            error: Color::Red,
            diff_add: Color::Green,
            diff_remove: Color::Red,
        }
    }
}

impl Palette {
    /// Resolve configured color names, keeping the default for unknown names
    pub fn from_config(colors: &ColorsConfig) -> Self {
        let defaults = Self::default();
        Self {
            ok: parse_color("ok", &colors.ok, defaults.ok),
            changed: parse_color("changed", &colors.changed, defaults.changed),
            error: parse_color("error", &colors.error, defaults.error),
            diff_add: parse_color("diff_add", &colors.diff_add, defaults.diff_add),
            diff_remove: parse_color("diff_remove", &colors.diff_remove, defaults.diff_remove),
        }
    }
}

fn parse_color(key: &str, name: &str, fallback: Color) -> Color {
    name.parse().unwrap_or_else(|_| {
        tracing::warn!(key = %key, color = %name, "Unknown color name, using default");
        fallback
    })
}

/// Output formatter for different output modes
pub struct OutputFormatter {
    /// Use colored output
    use_color: bool,
    /// Colors for statuses and diffs
    palette: Palette,
    /// Selected output format
    format: OutputFormat,
    /// Verbosity level
    verbosity: u8,
    /// Start time for duration calculations
    start_time: Instant,
}

impl OutputFormatter {
    /// Create a new output formatter
    pub fn new(use_color: bool, format: OutputFormat, verbosity: u8) -> Self {
        // Respect NO_COLOR environment variable
        let use_color = use_color && std::env::var("NO_COLOR").is_err();

        Self {
            use_color,
            palette: Palette::default(),
            format,
            verbosity,
            start_time: Instant::now(),
        }
    }

    /// Use the given colors instead of the defaults
    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    fn is_structured(&self) -> bool {
        self.format != OutputFormat::Human
    }

    /// Print a section header
    pub fn section(&self, title: &str) {
        if self.is_structured() {
            return;
        }

        if self.use_color {
            println!("\n{}", title.cyan().bold());
            println!("{}", "-".repeat(title.len()).cyan());
        } else {
            println!("\n{}", title);
            println!("{}", "-".repeat(title.len()));
        }
    }

    /// Print a task header
    pub fn task_header(&self, task_name: &str) {
        if self.is_structured() {
            return;
        }

        let header = format!("TASK [{}]", task_name);
        let stars = "*".repeat(80_usize.saturating_sub(header.len()));

        if self.use_color {
            println!(
                "\n{} {}",
                header.bright_white().bold(),
                stars.bright_black()
            );
        } else {
            println!("\n{} {}", header, stars);
        }
    }

    /// Print task result
    pub fn task_result(&self, device: &str, status: TaskStatus, message: Option<&str>) {
        let status_str = if self.use_color {
            status.colored_string(&self.palette)
        } else {
            status.as_str().to_string()
        };

        let device_str = if self.use_color {
            device.bright_white().bold().to_string()
        } else {
            device.to_string()
        };

        match message {
            Some(msg) if self.verbosity > 0 || status != TaskStatus::Ok => {
                println!("{}: [{}] => {}", status_str, device_str, msg)
            }
            _ => println!("{}: [{}]", status_str, device_str),
        }
    }

    /// Print the result of a module run in the selected format
    pub fn module_output(&self, device: &str, output: &ModuleOutput) -> Result<()> {
        match self.format {
            OutputFormat::Json => self.structured(output),
            OutputFormat::Yaml => self.structured(output),
            OutputFormat::Human => {
                self.task_result(device, output.status.into(), Some(&output.msg));

                let commands = output.commands();
                if !commands.is_empty() {
                    self.list("commands", &commands);
                }
                if let Some(ref diff) = output.diff {
                    self.diff(diff);
                }
                if self.verbosity > 1 {
                    if let Some(end_state) = output.data.get("end_state") {
                        self.debug(&format!("end_state: {}", end_state));
                    }
                }
                Ok(())
            }
        }
    }

    /// Serialize a value to stdout as JSON or YAML
    pub fn structured<T: Serialize>(&self, value: &T) -> Result<()> {
        let rendered = match self.format {
            OutputFormat::Yaml => serde_yaml::to_string(value)?,
            _ => serde_json::to_string_pretty(value)? + "\n",
        };
        let mut stdout = io::stdout().lock();
        stdout.write_all(rendered.as_bytes())?;
        stdout.flush()?;
        Ok(())
    }

    /// Print an error message
    pub fn error(&self, message: &str) {
        if self.is_structured() {
            let err = serde_json::json!({
                "type": "error",
                "message": message
            });
            eprintln!("{}", err);
            return;
        }

        if self.use_color {
            eprintln!("{} {}", "ERROR:".color(self.palette.error).bold(), message);
        } else {
            eprintln!("ERROR: {}", message);
        }
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if self.is_structured() {
            let warn = serde_json::json!({
                "type": "warning",
                "message": message
            });
            eprintln!("{}", warn);
            return;
        }

        if self.use_color {
            eprintln!("{} {}", "WARNING:".yellow().bold(), message);
        } else {
            eprintln!("WARNING: {}", message);
        }
    }

    /// Print an info message (respects verbosity)
    pub fn info(&self, message: &str) {
        if self.verbosity < 1 || self.is_structured() {
            return;
        }

        if self.use_color {
            println!("{} {}", "INFO:".blue(), message);
        } else {
            println!("INFO: {}", message);
        }
    }

    /// Print a debug message (requires higher verbosity)
    pub fn debug(&self, message: &str) {
        if self.verbosity < 2 || self.is_structured() {
            return;
        }

        if self.use_color {
            println!("{} {}", "DEBUG:".magenta(), message);
        } else {
            println!("DEBUG: {}", message);
        }
    }

    /// Print a configuration diff
    pub fn diff(&self, diff: &Diff) {
        if self.is_structured() {
            return;
        }

        println!();
        match diff.details {
            Some(ref details) => {
                for line in details.lines() {
                    println!("{}", self.diff_line(line));
                }
            }
            None => {
                for line in diff.before.lines() {
                    println!("{}", self.diff_line(&format!("-{}", line)));
                }
                for line in diff.after.lines() {
                    println!("{}", self.diff_line(&format!("+{}", line)));
                }
            }
        }
        println!();
    }

    fn diff_line(&self, line: &str) -> String {
        if !self.use_color {
            return line.to_string();
        }
        if line.starts_with('+') {
            line.color(self.palette.diff_add).to_string()
        } else if line.starts_with('-') {
            line.color(self.palette.diff_remove).to_string()
        } else {
            line.to_string()
        }
    }

    /// Print a list of items
    pub fn list(&self, title: &str, items: &[String]) {
        if self.is_structured() {
            return;
        }

        if self.use_color {
            println!("\n{}:", title.bright_white().bold());
        } else {
            println!("\n{}:", title);
        }

        for item in items {
            if self.use_color {
                println!("  {} {}", "-".bright_black(), item);
            } else {
                println!("  - {}", item);
            }
        }
    }

    /// Print the elapsed time since the formatter was created
    pub fn elapsed(&self) {
        if self.verbosity < 1 || self.is_structured() {
            return;
        }
        println!("\nFinished in {}", format_duration(self.start_time.elapsed()));
    }
}

fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    if millis < 1000 {
        format!("{}ms", millis)
    } else {
        format!("{:.3}s", duration.as_secs_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_status_display() {
        assert_eq!(TaskStatus::Ok.as_str(), "ok");
        assert_eq!(TaskStatus::Changed.as_str(), "changed");

        let palette = Palette::default();
        assert!(TaskStatus::Ok.colored_string(&palette).contains("ok"));
        assert!(TaskStatus::Changed.colored_string(&palette).contains("changed"));
    }

    #[test]
    fn test_status_from_module() {
        assert_eq!(TaskStatus::from(ModuleStatus::Changed), TaskStatus::Changed);
        assert_eq!(TaskStatus::from(ModuleStatus::Ok), TaskStatus::Ok);
    }

    #[test]
    fn test_plain_diff_lines() {
        let formatter = OutputFormatter::new(false, OutputFormat::Human, 0);
        assert_eq!(formatter.diff_line("+  ip pim sparse-mode"), "+  ip pim sparse-mode");
        assert_eq!(formatter.diff_line(" interface Ethernet1/1"), " interface Ethernet1/1");
    }

    #[test]
    fn test_palette_from_config() {
        let colors = ColorsConfig {
            diff_add: "blue".to_string(),
            diff_remove: "magenta".to_string(),
            error: "not-a-color".to_string(),
            ..ColorsConfig::default()
        };
        let palette = Palette::from_config(&colors);
        assert_eq!(palette.diff_add, Color::Blue);
        assert_eq!(palette.diff_remove, Color::Magenta);
        assert_eq!(palette.error, Color::Red);
        assert_eq!(palette.ok, Color::Green);
        assert_eq!(palette.changed, Color::Yellow);
    }

    #[test]
    fn test_diff_lines_use_palette() {
        let palette = Palette {
            diff_add: Color::Blue,
            diff_remove: Color::Magenta,
            ..Palette::default()
        };
        let mut formatter = OutputFormatter::new(true, OutputFormat::Human, 0).with_palette(palette);
        formatter.use_color = true;
        colored::control::set_override(true);

        assert_eq!(
            formatter.diff_line("+  ip pim border"),
            "+  ip pim border".blue().to_string()
        );
        assert_eq!(
            formatter.diff_line("-  ip pim dr-priority 5"),
            "-  ip pim dr-priority 5".magenta().to_string()
        );
        assert_ne!(
            formatter.diff_line("+  ip pim border"),
            "+  ip pim border".green().to_string()
        );
        colored::control::unset_override();
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(500)), "500ms");
        assert_eq!(format_duration(Duration::from_secs(5)), "5.000s");
    }
}
