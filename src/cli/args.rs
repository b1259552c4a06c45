//! Command-line argument definitions for the bench report processor
//!
//! This module defines the complete CLI interface using the clap derive
//! API.

use crate::{Error, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI arguments for the bench report processor
///
/// Converts raw bench test-measurement exports into a structured JSON
/// report document plus diagnostic side-reports.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "bench-report-processor",
    version,
    about = "Convert bench test-measurement CSV exports into structured JSON reports",
    long_about = "Normalizes raw bench measurement exports (tabular text files with embedded \
                  metadata headers) into a canonical sequence of value and limit records, \
                  links correlated screenshot and waveform artifacts, and writes one JSON \
                  report document plus CSV diagnostic side-reports per run."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands for the bench report processor
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Convert a test-flow directory into a JSON report (default command)
    Convert(ConvertArgs),
    /// Inspect a specification-limits file
    Limits(LimitsArgs),
}

/// Arguments for the convert command (main conversion)
#[derive(Debug, Clone, Parser)]
pub struct ConvertArgs {
    /// Input test-flow directory
    ///
    /// Scanned recursively for measurement exports (.csv), screenshot
    /// and waveform artifacts (.png/.mat), the limits file, and the
    /// configuration file. Defaults to the current directory.
    #[arg(
        short = 'i',
        long = "input",
        value_name = "PATH",
        help = "Input test-flow directory"
    )]
    pub input_path: Option<PathBuf>,

    /// Output directory for the report and side-reports
    ///
    /// If not specified, a timestamped directory is created inside the
    /// input directory.
    #[arg(
        short = 'o',
        long = "output",
        value_name = "PATH",
        help = "Output directory for the generated report"
    )]
    pub output_path: Option<PathBuf>,

    /// Path to the specification-limits file
    ///
    /// If not specified, the input directory is searched for
    /// testlimits.txt. A run without any limits file still succeeds;
    /// affected parameters receive empty-bound limit records.
    #[arg(
        short = 'l',
        long = "limits",
        value_name = "FILE",
        help = "Path to the specification-limits file"
    )]
    pub limits_file: Option<PathBuf>,

    /// Path to the conversion configuration file
    ///
    /// If not specified, the input directory is searched for
    /// Config_Tembo.txt.
    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        help = "Path to the conversion configuration file"
    )]
    pub config_file: Option<PathBuf>,

    /// Report name override
    ///
    /// Names the generated JSON document. Defaults to the configured
    /// report name, or the input directory name.
    #[arg(
        long = "report-name",
        value_name = "NAME",
        help = "Name for the generated report document"
    )]
    pub report_name: Option<String>,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Suppress output (quiet mode)
    ///
    /// Only show errors and critical messages. Overrides verbose settings.
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Suppress output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,
}

/// Arguments for the limits command (table inspection)
#[derive(Debug, Clone, Parser)]
pub struct LimitsArgs {
    /// Path to the specification-limits file to inspect
    #[arg(value_name = "FILE", help = "Specification-limits file")]
    pub limits_file: PathBuf,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,
}

impl Args {
    /// Get the command if one was specified
    pub fn get_command(&self) -> Commands {
        self.command
            .clone()
            .expect("Command should be present when get_command() is called")
    }
}

impl ConvertArgs {
    /// Validate the convert command arguments for consistency
    pub fn validate(&self) -> Result<()> {
        if let Some(input_path) = &self.input_path {
            if !input_path.exists() {
                return Err(Error::configuration(format!(
                    "Input path does not exist: {}",
                    input_path.display()
                )));
            }
            if !input_path.is_dir() {
                return Err(Error::configuration(format!(
                    "Input path is not a directory: {}",
                    input_path.display()
                )));
            }
        }

        if let Some(limits_file) = &self.limits_file {
            if !limits_file.exists() {
                return Err(Error::configuration(format!(
                    "Limits file does not exist: {}",
                    limits_file.display()
                )));
            }
        }

        if let Some(config_file) = &self.config_file {
            if !config_file.exists() {
                return Err(Error::configuration(format!(
                    "Config file does not exist: {}",
                    config_file.display()
                )));
            }
        }

        Ok(())
    }

    /// The effective input directory
    pub fn input_dir(&self) -> PathBuf {
        self.input_path
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Determine the appropriate log level based on verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }

    /// Check if we should show progress bars (not in quiet mode)
    pub fn show_progress(&self) -> bool {
        !self.quiet
    }
}

impl LimitsArgs {
    /// Validate the limits command arguments for consistency
    pub fn validate(&self) -> Result<()> {
        if !self.limits_file.exists() {
            return Err(Error::configuration(format!(
                "Limits file does not exist: {}",
                self.limits_file.display()
            )));
        }
        Ok(())
    }

    /// Determine the appropriate log level based on verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

impl Default for ConvertArgs {
    fn default() -> Self {
        Self {
            input_path: None,
            output_path: None,
            limits_file: None,
            config_file: None,
            report_name: None,
            verbose: 0,
            quiet: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_convert_args_validation() {
        let temp_dir = TempDir::new().unwrap();

        let args = ConvertArgs {
            input_path: Some(temp_dir.path().to_path_buf()),
            ..Default::default()
        };
        assert!(args.validate().is_ok());

        // Nonexistent input path
        let args = ConvertArgs {
            input_path: Some(PathBuf::from("/nonexistent/path")),
            ..Default::default()
        };
        assert!(args.validate().is_err());

        // Input path is a file, not a directory
        let file_path = temp_dir.path().join("file.csv");
        std::fs::write(&file_path, b"x").unwrap();
        let args = ConvertArgs {
            input_path: Some(file_path),
            ..Default::default()
        };
        assert!(args.validate().is_err());

        // Nonexistent limits file
        let args = ConvertArgs {
            input_path: Some(temp_dir.path().to_path_buf()),
            limits_file: Some(PathBuf::from("/nonexistent/testlimits.txt")),
            ..Default::default()
        };
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = ConvertArgs::default();
        assert_eq!(args.get_log_level(), "warn");

        args.verbose = 1;
        assert_eq!(args.get_log_level(), "info");

        args.verbose = 2;
        assert_eq!(args.get_log_level(), "debug");

        args.verbose = 3;
        assert_eq!(args.get_log_level(), "trace");

        args.quiet = true;
        assert_eq!(args.get_log_level(), "error");
    }

    #[test]
    fn test_show_progress() {
        let mut args = ConvertArgs::default();
        assert!(args.show_progress());

        args.quiet = true;
        assert!(!args.show_progress());
    }

    #[test]
    fn test_input_dir_defaults_to_current() {
        let args = ConvertArgs::default();
        assert_eq!(args.input_dir(), PathBuf::from("."));
    }
}
