use bench_report_processor::cli::{args::Args, commands};
use clap::Parser;
use std::process;

fn main() {
    // Parse command line arguments
    let args = Args::parse();

    // If no subcommand was provided, show help and available commands
    if args.command.is_none() {
        show_help_and_commands();
        process::exit(0);
    }

    match commands::run(args) {
        Ok(_stats) => {
            // Success - the summary has already been printed by the command
            process::exit(0);
        }
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

/// Show help information and available commands when no subcommand is provided
fn show_help_and_commands() {
    println!("Bench Report Processor - Measurement Export Converter");
    println!("=====================================================");
    println!();
    println!("Normalize raw bench test-measurement CSV exports into a structured");
    println!("JSON report document with linked screenshot and waveform artifacts.");
    println!();
    println!("USAGE:");
    println!("    bench-report-processor <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    convert     Convert a test-flow directory into a JSON report (main command)");
    println!("    limits      Inspect a specification-limits file");
    println!("    help        Show this help message or help for specific commands");
    println!();
    println!("OPTIONS:");
    println!("    -h, --help       Show help information");
    println!("    -V, --version    Show version information");
    println!();
    println!("EXAMPLES:");
    println!("    # Convert the current directory:");
    println!("    bench-report-processor convert");
    println!();
    println!("    # Convert a specific test-flow directory with an explicit output:");
    println!("    bench-report-processor convert --input /data/flow_42 --output /data/reports");
    println!();
    println!("    # Inspect a limits file:");
    println!("    bench-report-processor limits testlimits.txt");
    println!();
    println!("For detailed help on any command, use:");
    println!("    bench-report-processor <COMMAND> --help");
}
