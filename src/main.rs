use std::fs::OpenOptions;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{Level, info};
use simplelog::{ConfigBuilder, WriteLogger};

use stockroom::AuditLog;
use stockroom::cli::{self, Command};
use stockroom::core::config::{self, CliOverrides, PendingLog, ResolvedConfig};

#[derive(Parser)]
#[command(name = "stockroom", about = "Track stock levels in a JSON file")]
struct Args {
    /// Stock file to read and write
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Config file (defaults to ~/.stockroom/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the audit trail after the command finishes
    #[arg(long)]
    audit: bool,

    #[command(subcommand)]
    command: Command,
}

fn main() -> ExitCode {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Nothing can be logged until the log file is known; hold records until then.
    let mut pending = PendingLog::new();
    let file_config = match &args.config {
        Some(path) => config::load_config_from(path, &mut pending),
        None => config::load_config(&mut pending),
    };
    let file_config = file_config.unwrap_or_else(|e| {
        eprintln!("Warning: {e}; using default settings");
        pending.push(Level::Warn, format!("{e}; using default settings"));
        Default::default()
    });

    let resolved = config::resolve(
        &file_config,
        &CliOverrides {
            data_file: args.file.clone(),
            low_stock_threshold: args.command.threshold(),
        },
        &mut pending,
    );
    init_logging(&resolved);
    pending.replay();

    let mut audit = AuditLog::new();
    let ok = cli::run(args.command, &resolved, &mut audit);

    if args.audit {
        for line in audit.lines() {
            println!("{line}");
        }
    }
    info!("Program executed {}.", if ok { "successfully" } else { "with errors" });

    if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}

/// Append log records to the configured log file.
fn init_logging(config: &ResolvedConfig) {
    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();

    match OpenOptions::new().create(true).append(true).open(&config.log_file) {
        Ok(log_file) => {
            let _ = WriteLogger::init(config.log_level, log_config, log_file);
        }
        Err(e) => eprintln!(
            "Warning: cannot open log file {}: {e}",
            config.log_file.display()
        ),
    }
}
