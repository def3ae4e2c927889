use std::process::ExitCode;

use clap::Parser;
use measurement_poster::config::{AppConfig, Cli};
use measurement_poster::replay;
use measurement_poster::transport::HttpTransport;
use measurement_poster::Poster;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::fmt;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match AppConfig::from_cli(cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // Set up logging; the guard must live until main returns or buffered lines are lost
    let _guard = setup_logging(&config);
    info!("Starting measurement poster with configuration: {:?}", config);

    let transport = HttpTransport::with_timeout(config.timeout);
    let server_type = config.server_type.clone();
    let poster = match Poster::with_transport(&config.target_url, server_type, transport) {
        Ok(poster) => poster,
        Err(e) => {
            error!("Failed to create poster: {}", e);
            eprintln!("Failed to create poster: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let records = match replay::load_records(&config.input) {
        Ok(records) => records,
        Err(e) => {
            error!("Failed to load measurements: {}", e);
            eprintln!("Failed to load measurements: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let summary = replay::replay(&poster, &records, config.delay);
    println!(
        "Posted {} of {} measurements to {}",
        summary.posted,
        records.len(),
        poster.target()
    );

    info!("Application shutting down");
    if summary.all_posted() {
        ExitCode::SUCCESS
    } else {
        eprintln!(
            "{} measurements failed to post, see logs in {}",
            summary.failed,
            config.log_dir.display()
        );
        ExitCode::FAILURE
    }
}

fn setup_logging(config: &AppConfig) -> WorkerGuard {
    // Set up file-based logging with rotation
    let file_appender = rolling::daily(&config.log_dir, "measurement-poster.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_writer(non_blocking)
        .with_env_filter(filter)
        .with_ansi(false) // Disable ANSI colors in log files
        .with_level(true)
        .init();

    guard
}
