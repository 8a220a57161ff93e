//! Configuration for the Tempo CLI.
//!
//! Layered with the following priority (highest first):
//! 1. CLI arguments
//! 2. Environment variables (via clap `env` attributes)
//! 3. TOML config file (`~/.config/tempo/config.toml`)
//! 4. Compiled defaults

use std::path::PathBuf;

use chrono::NaiveTime;
use tempo_engine::EngineConfig;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to parse the TOML configuration.
    #[error("failed to parse config file: {0}")]
    ParseToml(#[from] toml::de::Error),

    /// A config value is out of range or unparsable.
    #[error("invalid config value for {key}: {value}")]
    InvalidValue {
        /// Which setting was invalid.
        key: &'static str,
        /// The offending value.
        value: String,
    },
}

// ---------------------------------------------------------------------------
// TOML file structs (all fields Option for partial overrides)
// ---------------------------------------------------------------------------

/// Top-level TOML config file structure.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ConfigFile {
    store: StoreFileConfig,
    scheduler: SchedulerFileConfig,
}

/// `[store]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct StoreFileConfig {
    data_file: Option<PathBuf>,
}

/// `[scheduler]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct SchedulerFileConfig {
    day_start: Option<String>,
    day_end: Option<String>,
    min_gap_minutes: Option<i64>,
    forecast_days: Option<u32>,
}

// ---------------------------------------------------------------------------
// CLI arguments
// ---------------------------------------------------------------------------

/// Global CLI options that feed configuration.
#[derive(clap::Args, Debug, Default)]
pub struct ConfigArgs {
    /// Path to the task data file (default: `~/.local/share/tempo/tasks.json`).
    #[arg(long, env = "TEMPO_DATA")]
    pub data_file: Option<PathBuf>,

    /// Path to config file (default: `~/.config/tempo/config.toml`).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Start of the scheduling window, `HH:MM`.
    #[arg(long)]
    pub day_start: Option<String>,

    /// End of the scheduling window, `HH:MM`.
    #[arg(long)]
    pub day_end: Option<String>,

    /// Smallest free gap worth filling, in minutes.
    #[arg(long)]
    pub min_gap_minutes: Option<i64>,

    /// How many days ahead recurring tasks are generated.
    #[arg(long)]
    pub forecast_days: Option<u32>,

    /// Log level filter (trace, debug, info, warn, error).
    #[arg(long, default_value = "warn", env = "TEMPO_LOG")]
    pub log_level: String,
}

// ---------------------------------------------------------------------------
// Resolved configuration
// ---------------------------------------------------------------------------

/// Fully resolved CLI configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Where the JSON task store lives.
    pub data_file: PathBuf,
    /// Engine knobs (working window, min gap, forecast).
    pub engine: EngineConfig,
    /// Log level filter string.
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            engine: EngineConfig::default(),
            log_level: "warn".to_string(),
        }
    }
}

impl Config {
    /// Load configuration by merging CLI args, env vars, and a TOML file.
    ///
    /// If `--config` is given and the file does not exist, that is an
    /// error; the default path is allowed to be missing.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the explicit config file cannot be
    /// read or parsed, or a time/number value is invalid.
    pub fn load(cli: &ConfigArgs) -> Result<Self, ConfigError> {
        let file = load_config_file(cli.config.as_deref())?;
        Self::resolve(cli, &file)
    }

    /// Resolve a `Config` from CLI args and a parsed config file.
    ///
    /// Priority: CLI > file > default.
    fn resolve(cli: &ConfigArgs, file: &ConfigFile) -> Result<Self, ConfigError> {
        let defaults = EngineConfig::default();

        let day_start = resolve_time(
            "day_start",
            cli.day_start.as_deref(),
            file.scheduler.day_start.as_deref(),
            defaults.day_start,
        )?;
        let day_end = resolve_time(
            "day_end",
            cli.day_end.as_deref(),
            file.scheduler.day_end.as_deref(),
            defaults.day_end,
        )?;
        let min_gap_minutes = cli
            .min_gap_minutes
            .or(file.scheduler.min_gap_minutes)
            .unwrap_or(defaults.min_gap_minutes);
        if min_gap_minutes < 0 {
            return Err(ConfigError::InvalidValue {
                key: "min_gap_minutes",
                value: min_gap_minutes.to_string(),
            });
        }

        Ok(Self {
            data_file: cli
                .data_file
                .clone()
                .or_else(|| file.store.data_file.clone())
                .unwrap_or_else(default_data_file),
            engine: EngineConfig {
                day_start,
                day_end,
                min_gap_minutes,
                forecast_days: cli
                    .forecast_days
                    .or(file.scheduler.forecast_days)
                    .unwrap_or(defaults.forecast_days),
            },
            log_level: cli.log_level.clone(),
        })
    }
}

/// Default location of the JSON task store.
fn default_data_file() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tempo")
        .join("tasks.json")
}

/// Picks the first present `HH:MM` string and parses it.
fn resolve_time(
    key: &'static str,
    cli: Option<&str>,
    file: Option<&str>,
    default: NaiveTime,
) -> Result<NaiveTime, ConfigError> {
    let Some(text) = cli.or(file) else {
        return Ok(default);
    };
    NaiveTime::parse_from_str(text, "%H:%M").map_err(|_| ConfigError::InvalidValue {
        key,
        value: text.to_string(),
    })
}

/// Load and parse a TOML config file.
fn load_config_file(explicit_path: Option<&std::path::Path>) -> Result<ConfigFile, ConfigError> {
    let path = if let Some(p) = explicit_path {
        let contents = std::fs::read_to_string(p).map_err(|e| ConfigError::ReadFile {
            path: p.to_path_buf(),
            source: e,
        })?;
        return Ok(toml::from_str(&contents)?);
    } else {
        let Some(config_dir) = dirs::config_dir() else {
            return Ok(ConfigFile::default());
        };
        config_dir.join("tempo").join("config.toml")
    };

    match std::fs::read_to_string(&path) {
        Ok(contents) => Ok(toml::from_str(&contents)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ConfigFile::default()),
        Err(e) => Err(ConfigError::ReadFile { path, source: e }),
    }
}
