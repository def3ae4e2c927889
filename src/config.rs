use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use serde::Deserialize;
use thiserror::Error;

use crate::poster::ServerType;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Missing required setting: {0}")]
    Missing(&'static str),
}

/// Command-line flags; anything given here overrides the config file
#[derive(Parser, Debug, Default)]
#[command(name = "measurement-poster", version, about = "Replay sensor readings to an HTTP back-end")]
pub struct Cli {
    /// JSON config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// URL to POST measurements to
    #[arg(short, long)]
    pub target: Option<String>,

    /// Back-end type: diana or spark
    #[arg(short, long)]
    pub server_type: Option<String>,

    /// CSV file of readings (sensor_id,time,value,unit)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Per-request timeout in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Pause between posts in milliseconds
    #[arg(long)]
    pub delay_ms: Option<u64>,

    /// Directory for log files
    #[arg(long)]
    pub log_dir: Option<PathBuf>,
}

/// Settings as they appear in the JSON config file
#[derive(Deserialize, Debug, Default)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub target_url: Option<String>,
    pub server_type: Option<String>,
    pub input: Option<PathBuf>,
    pub timeout_ms: Option<u64>,
    pub delay_ms: Option<u64>,
    pub log_dir: Option<PathBuf>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Fully resolved settings for one run
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub target_url: String,
    pub server_type: ServerType,
    pub input: PathBuf,
    pub timeout: Duration,
    pub delay: Duration,
    pub log_dir: PathBuf,
}

impl AppConfig {
    pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
    pub const DEFAULT_LOG_DIR: &'static str = "logs";

    /// Load the config file named by `--config` (if any) and apply flags on top
    pub fn from_cli(cli: Cli) -> Result<Self, ConfigError> {
        let file = match &cli.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        Self::merge(file, cli)
    }

    pub fn merge(file: FileConfig, cli: Cli) -> Result<Self, ConfigError> {
        let target_url = cli
            .target
            .or(file.target_url)
            .ok_or(ConfigError::Missing("target"))?;
        let input = cli.input.or(file.input).ok_or(ConfigError::Missing("input"))?;
        let server_type = cli
            .server_type
            .or(file.server_type)
            .map(|name| ServerType::from(name.as_str()))
            .unwrap_or(ServerType::Diana);

        Ok(AppConfig {
            target_url,
            server_type,
            input,
            timeout: Duration::from_millis(
                cli.timeout_ms
                    .or(file.timeout_ms)
                    .unwrap_or(Self::DEFAULT_TIMEOUT_MS),
            ),
            delay: Duration::from_millis(cli.delay_ms.or(file.delay_ms).unwrap_or(0)),
            log_dir: cli
                .log_dir
                .or(file.log_dir)
                .unwrap_or_else(|| PathBuf::from(Self::DEFAULT_LOG_DIR)),
        })
    }
}
