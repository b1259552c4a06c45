//! Command implementations for the bench report processor CLI
//!
//! This module contains the main command execution logic, progress
//! reporting, and error handling for the CLI interface.

use crate::app::adapters::filesystem;
use crate::app::models::{Recipe, ReportDocument};
use crate::app::services::eff_normalizer::EffNormalizer;
use crate::app::services::limits_table::LimitsTable;
use crate::app::services::report_writer::ReportWriter;
use crate::app::services::row_normalizer::{NormalizedOutput, RowNormalizer};
use crate::cli::args::{Args, Commands, ConvertArgs, LimitsArgs};
use crate::config::ReportConfig;
use crate::constants::OUTPUT_DIR_TIMESTAMP_FORMAT;
use crate::{Error, Result};
use colored::Colorize;
use indicatif::{HumanDuration, ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Run statistics for reporting
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    /// Number of source files processed
    pub files_processed: usize,
    /// Number of value records in the report
    pub value_records: usize,
    /// Number of limit records in the report
    pub limit_records: usize,
    /// Number of limits-table entries loaded
    pub limit_entries: usize,
    /// Number of diagnostic side-reports written
    pub side_reports: usize,
    /// Total processing time
    pub processing_time: std::time::Duration,
    /// Path of the written report document
    pub report_path: Option<PathBuf>,
}

impl RunStats {
    /// Total records emitted into the report document
    pub fn total_records(&self) -> usize {
        self.value_records + self.limit_records
    }
}

/// Main command runner for the bench report processor
pub fn run(args: Args) -> Result<RunStats> {
    match args.get_command() {
        Commands::Convert(convert_args) => {
            setup_logging(convert_args.get_log_level(), convert_args.quiet)?;
            let stats = run_convert(&convert_args)?;
            if !convert_args.quiet {
                print_convert_summary(&stats);
            }
            Ok(stats)
        }
        Commands::Limits(limits_args) => {
            setup_logging(limits_args.get_log_level(), false)?;
            run_limits(&limits_args)
        }
    }
}

/// Set up structured logging based on CLI arguments
fn setup_logging(log_level: &str, quiet: bool) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("bench_report_processor={}", log_level)));

    if quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .init();
    }

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

/// Execute the convert command: discover inputs, convert every EFF export
/// into its own document, normalize the CSV sources into the main report,
/// and write the side-reports
pub fn run_convert(args: &ConvertArgs) -> Result<RunStats> {
    let start_time = Instant::now();

    args.validate()?;
    let input_dir = args.input_dir();
    info!("Starting conversion of {}", input_dir.display());

    let inputs = filesystem::discover_inputs(&input_dir)?;
    if !inputs.has_sources() && !inputs.has_effs() {
        return Err(Error::data_validation(format!(
            "no source data files found under {}",
            input_dir.display()
        )));
    }

    let config = load_configuration(args, &inputs)?;
    if config.is_manual_measurement() {
        info!("Manual measurement dataset, product identity comes from configuration");
    }

    let output_dir = match &args.output_path {
        Some(path) => path.clone(),
        None => input_dir.join(format!(
            "Report_{}",
            chrono::Local::now().format(OUTPUT_DIR_TIMESTAMP_FORMAT)
        )),
    };
    let writer = ReportWriter::new(output_dir);
    writer.prepare()?;

    let mut stats = RunStats {
        files_processed: inputs.sources.len() + inputs.effs.len(),
        ..Default::default()
    };

    // EFF exports come first, each yielding a standalone document named
    // after its file stem
    let eff_normalizer = EffNormalizer::new(&config);
    for eff in &inputs.effs {
        let outcome = eff_normalizer.normalize_file(eff)?;
        let recipe = Recipe {
            report_template: config.report_template.clone(),
            report_name: outcome.report_name.clone(),
            project: config.project.clone(),
        };
        let document =
            ReportDocument::new(outcome.common_meta_data, outcome.data_objects, recipe);
        let path = writer.write_document(&document, &outcome.report_name)?;
        stats.value_records += document.data_objects.iter().filter(|o| o.is_value()).count();
        stats.limit_records += document.data_objects.iter().filter(|o| o.is_limit()).count();
        if writer
            .write_repeated_conditions(&outcome.report_name, &outcome.diagnostics)?
            .is_some()
        {
            stats.side_reports += 1;
        }
        stats.report_path = Some(path);
    }

    if inputs.has_sources() {
        let limits = load_limits(args, &inputs)?;
        stats.limit_entries = limits.len();

        let progress_bar = if args.show_progress() {
            let pb = ProgressBar::new(inputs.sources.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template(
                        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                    )
                    .unwrap()
                    .progress_chars("#>-"),
            );
            pb.set_message("Normalizing source files");
            Some(pb)
        } else {
            None
        };

        let mut normalizer =
            RowNormalizer::new(&limits, &config, &inputs.pictures, &inputs.waveforms);
        normalizer.normalize_files(&inputs.sources, progress_bar.as_ref())?;

        if let Some(pb) = &progress_bar {
            pb.finish_with_message("Normalization complete");
        }

        let NormalizedOutput {
            data_objects,
            common_meta_data,
            diagnostics,
        } = normalizer.finish();

        let report_name = args
            .report_name
            .clone()
            .unwrap_or_else(|| config.report_name_or_default(&input_dir));
        let recipe = Recipe {
            report_template: config.report_template.clone(),
            report_name: report_name.clone(),
            project: config.project.clone(),
        };
        let document = ReportDocument::new(common_meta_data, data_objects, recipe);

        let report_path = writer.write_document(&document, &report_name)?;
        stats.value_records += document.data_objects.iter().filter(|o| o.is_value()).count();
        stats.limit_records += document.data_objects.iter().filter(|o| o.is_limit()).count();
        stats.side_reports += writer.write_side_reports(&diagnostics)?.len();
        stats.report_path = Some(report_path);
    }

    stats.processing_time = start_time.elapsed();
    Ok(stats)
}

/// Execute the limits command: load the table and print its entries
pub fn run_limits(args: &LimitsArgs) -> Result<RunStats> {
    args.validate()?;
    let table = LimitsTable::load(&args.limits_file)?;

    println!(
        "{} ({} entries)",
        args.limits_file.display().to_string().bold(),
        table.len()
    );
    for (parameter, entry) in table.iter() {
        println!(
            "  {}  [{} .. {}] {}  TestNr {}  {}",
            parameter.cyan(),
            entry.lower_limit(),
            entry.upper_limit(),
            entry.unit(),
            entry.test_number(),
            entry.description().trim()
        );
    }

    Ok(RunStats {
        limit_entries: table.len(),
        ..Default::default()
    })
}

/// Resolve the run configuration: explicit path, discovered file, or
/// defaults when neither exists
fn load_configuration(args: &ConvertArgs, inputs: &filesystem::DiscoveredInputs) -> Result<ReportConfig> {
    let config_path = args.config_file.clone().or_else(|| inputs.config_file.clone());
    match config_path {
        Some(path) => {
            info!("Using config file: {}", path.display());
            ReportConfig::load(&path)
        }
        None => {
            info!(
                "No {} found, deriving all metadata from the data files",
                ReportConfig::file_name()
            );
            Ok(ReportConfig::default())
        }
    }
}

/// Resolve the limits table: explicit path, discovered file, or an empty
/// table when neither exists
fn load_limits(args: &ConvertArgs, inputs: &filesystem::DiscoveredInputs) -> Result<LimitsTable> {
    let limits_path = args.limits_file.clone().or_else(|| inputs.limits_file.clone());
    match limits_path {
        Some(path) => {
            info!("Using limits file: {}", path.display());
            LimitsTable::load(&path)
        }
        None => {
            warn!("No limits file found, all parameters get empty-bound limit records");
            Ok(LimitsTable::default())
        }
    }
}

/// Print a human-readable conversion summary
fn print_convert_summary(stats: &RunStats) {
    println!();
    println!("{}", "Conversion complete".green().bold());
    println!("   Files processed: {}", stats.files_processed);
    println!("   Value records:   {}", stats.value_records);
    println!("   Limit records:   {}", stats.limit_records);
    if let Some(path) = &stats.report_path {
        println!("   Report:          {}", path.display());
    }
    if stats.side_reports > 0 {
        println!(
            "   {} {}",
            "Diagnostic side-reports:".yellow(),
            stats.side_reports
        );
    }
    println!(
        "   Processing time: {}",
        HumanDuration(stats.processing_time)
    );
    println!();
}
