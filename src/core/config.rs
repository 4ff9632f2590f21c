//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.stockroom/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.
//!
//! Config is read before the logger exists (the log file is itself a
//! setting), so everything worth logging here goes into a `PendingLog`
//! that the caller replays once logging is up.

use log::Level;
use serde::{Deserialize, Serialize};
use simplelog::LevelFilter;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::persist::DEFAULT_DATA_FILE;
use crate::core::store::DEFAULT_LOW_STOCK_THRESHOLD;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct StockroomConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub data_file: Option<String>,
    pub low_stock_threshold: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub file: Option<String>,
    pub level: Option<String>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_LOG_FILE: &str = "inventory.log";
pub const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Info;

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub data_file: PathBuf,
    pub log_file: PathBuf,
    pub low_stock_threshold: u64,
    pub log_level: LevelFilter,
}

/// Values taken from CLI flags (None = not specified).
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub data_file: Option<PathBuf>,
    pub low_stock_threshold: Option<u64>,
}

// ============================================================================
// Deferred Log Records
// ============================================================================

/// Log records held back until a logger is installed.
#[derive(Debug, Default)]
pub struct PendingLog {
    records: Vec<(Level, String)>,
}

impl PendingLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, level: Level, message: impl Into<String>) {
        self.records.push((level, message.into()));
    }

    pub fn records(&self) -> &[(Level, String)] {
        &self.records
    }

    /// Emit every held record through the `log` facade, oldest first.
    pub fn replay(self) {
        for (level, message) in self.records {
            log::log!(level, "{}", message);
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.stockroom/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".stockroom").join("config.toml"))
}

/// Load config from `~/.stockroom/config.toml`.
pub fn load_config(pending: &mut PendingLog) -> Result<StockroomConfig, ConfigError> {
    match config_path() {
        Some(path) => load_config_from(&path, pending),
        None => {
            pending.push(
                Level::Warn,
                "Could not determine home directory, using default config",
            );
            Ok(StockroomConfig::default())
        }
    }
}

/// Load config from an explicit path.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `StockroomConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config_from(
    path: &Path,
    pending: &mut PendingLog,
) -> Result<StockroomConfig, ConfigError> {
    if !path.exists() {
        pending.push(
            Level::Info,
            format!("No config file found, generating default at {}", path.display()),
        );
        generate_default_config(path, pending);
        return Ok(StockroomConfig::default());
    }

    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: StockroomConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    pending.push(Level::Info, format!("Loaded config from {}", path.display()));
    pending.push(Level::Debug, format!("Config: {:?}", config));
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path, pending: &mut PendingLog) {
    let default_content = r#"# Stockroom Configuration
# All settings are optional. Defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# data_file = "inventory.json"       # Or set STOCKROOM_FILE env var
# low_stock_threshold = 5            # Or set STOCKROOM_LOW_STOCK env var

# [logging]
# file = "inventory.log"             # Or set STOCKROOM_LOG_FILE env var
# level = "info"                     # "off", "error", "warn", "info", "debug", "trace"
"#;

    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            pending.push(Level::Warn, format!("Failed to create config directory: {}", e));
            return;
        }
    }
    if let Err(e) = fs::write(path, default_content) {
        pending.push(Level::Warn, format!("Failed to write default config: {}", e));
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(
    config: &StockroomConfig,
    cli: &CliOverrides,
    pending: &mut PendingLog,
) -> ResolvedConfig {
    // Data file: CLI → env → config → default
    let data_file = cli
        .data_file
        .clone()
        .or_else(|| std::env::var("STOCKROOM_FILE").ok().map(PathBuf::from))
        .or_else(|| config.general.data_file.as_ref().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_FILE));

    // Threshold: CLI → env → config → default
    let low_stock_threshold = cli
        .low_stock_threshold
        .or_else(|| env_parse("STOCKROOM_LOW_STOCK", pending))
        .or(config.general.low_stock_threshold)
        .unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD);

    // Log file: env → config → default
    let log_file = std::env::var("STOCKROOM_LOG_FILE")
        .ok()
        .or_else(|| config.logging.file.clone())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE));

    // Log level: env → config → default
    let log_level = env_parse("STOCKROOM_LOG_LEVEL", pending)
        .or_else(|| {
            config
                .logging
                .level
                .as_deref()
                .and_then(|raw| parse_level(raw, pending))
        })
        .unwrap_or(DEFAULT_LOG_LEVEL);

    ResolvedConfig {
        data_file,
        log_file,
        low_stock_threshold,
        log_level,
    }
}

/// Parses an env var, ignoring (with a warning) values that don't parse.
fn env_parse<T: std::str::FromStr>(key: &str, pending: &mut PendingLog) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            pending.push(Level::Warn, format!("Ignoring unparseable {}={:?}", key, raw));
            None
        }
    }
}

fn parse_level(raw: &str, pending: &mut PendingLog) -> Option<LevelFilter> {
    match raw.trim().parse() {
        Ok(level) => Some(level),
        Err(_) => {
            pending.push(
                Level::Warn,
                format!("Unknown log level {:?}, using default", raw),
            );
            None
        }
    }
}
