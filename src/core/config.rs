//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.parley/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::Level;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ParleyConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub demo: DemoConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub log_level: Option<String>,
    pub log_file: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct UiConfig {
    pub scroll_step: Option<i64>,
    pub resize_poll_ms: Option<u64>,
    pub show_help_on_start: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct DemoConfig {
    pub stream_delay_ms: Option<u64>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_LOG_FILE: &str = "parley.log";
pub const DEFAULT_SCROLL_STEP: i64 = 10;
pub const DEFAULT_RESIZE_POLL_MS: u64 = 250;
pub const DEFAULT_STREAM_DELAY_MS: u64 = 35;

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub log_level: log::LevelFilter,
    pub log_file: PathBuf,
    pub scroll_step: i64,
    pub resize_poll_ms: u64,
    pub show_help_on_start: bool,
    pub stream_delay_ms: u64,
}

/// Values given on the command line; `None` means "not specified".
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub log_level: Option<String>,
    pub log_file: Option<PathBuf>,
    pub show_help: bool,
}

// ============================================================================
// Startup Log
// ============================================================================

/// Log lines produced while loading config, before a logger exists.
///
/// The log file itself comes from config, so loading can't log directly.
/// Call [`StartupLog::replay`] once the logger is installed.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StartupLog {
    entries: Vec<(Level, String)>,
}

impl StartupLog {
    fn push(&mut self, level: Level, message: impl Into<String>) {
        self.entries.push((level, message.into()));
    }

    pub fn entries(&self) -> &[(Level, String)] {
        &self.entries
    }

    pub fn replay(self) {
        for (level, message) in self.entries {
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

/// Returns the path to `~/.parley/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".parley").join("config.toml"))
}

/// Load config from `explicit` or, when `None`, from `~/.parley/config.toml`.
///
/// If the default file doesn't exist, generates a commented-out default and
/// returns `ParleyConfig::default()`. An explicit path must exist. A file that
/// exists but is malformed returns `ConfigError::Parse`.
pub fn load_config(
    explicit: Option<&Path>,
    startup: &mut StartupLog,
) -> Result<ParleyConfig, ConfigError> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => match config_path() {
            Some(p) => p,
            None => {
                startup.push(
                    Level::Warn,
                    "Could not determine home directory, using default config",
                );
                return Ok(ParleyConfig::default());
            }
        },
    };

    if explicit.is_none() && !path.exists() {
        startup.push(
            Level::Info,
            format!("No config file found, generating default at {}", path.display()),
        );
        if let Err(e) = generate_default_config(&path) {
            startup.push(Level::Warn, format!("Failed to write default config: {e}"));
        }
        return Ok(ParleyConfig::default());
    }

    let contents = fs::read_to_string(&path).map_err(ConfigError::Io)?;
    let config = parse_config(&contents)?;
    startup.push(Level::Info, format!("Loaded config from {}", path.display()));
    startup.push(Level::Debug, format!("Config: {config:?}"));
    Ok(config)
}

pub fn parse_config(contents: &str) -> Result<ParleyConfig, ConfigError> {
    toml::from_str(contents).map_err(ConfigError::Parse)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) -> std::io::Result<()> {
    let default_content = r#"# Parley Configuration
# All settings are optional. Defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# log_level = "info"                 # "off", "error", "warn", "info", "debug", "trace"
# log_file = "parley.log"            # Or set PARLEY_LOG_FILE

# [ui]
# scroll_step = 10                   # Lines moved by Ctrl+d / Ctrl+u
# resize_poll_ms = 250               # How often the terminal size is checked
# show_help_on_start = false

# [demo]
# stream_delay_ms = 35               # Pause between streamed reply chunks
"#;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, default_content)
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(
    config: &ParleyConfig,
    cli: &CliOverrides,
    startup: &mut StartupLog,
) -> ResolvedConfig {
    // Log level: CLI → env → config → default
    let level_name = cli
        .log_level
        .clone()
        .or_else(|| std::env::var("PARLEY_LOG_LEVEL").ok())
        .or_else(|| config.general.log_level.clone())
        .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());
    let log_level = parse_level(&level_name).unwrap_or_else(|| {
        startup.push(
            Level::Warn,
            format!("Unknown log level '{level_name}', using {DEFAULT_LOG_LEVEL}"),
        );
        log::LevelFilter::Info
    });

    // Log file: CLI → env → config → default
    let log_file = cli
        .log_file
        .clone()
        .or_else(|| std::env::var("PARLEY_LOG_FILE").ok().map(PathBuf::from))
        .or_else(|| config.general.log_file.as_ref().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE));

    let scroll_step = match config.ui.scroll_step {
        Some(step) if step > 0 => step,
        Some(step) => {
            startup.push(Level::Warn, format!("Ignoring non-positive scroll_step {step}"));
            DEFAULT_SCROLL_STEP
        }
        None => DEFAULT_SCROLL_STEP,
    };

    ResolvedConfig {
        log_level,
        log_file,
        scroll_step,
        resize_poll_ms: config
            .ui
            .resize_poll_ms
            .filter(|ms| *ms > 0)
            .unwrap_or(DEFAULT_RESIZE_POLL_MS),
        show_help_on_start: cli.show_help || config.ui.show_help_on_start.unwrap_or(false),
        stream_delay_ms: config
            .demo
            .stream_delay_ms
            .unwrap_or(DEFAULT_STREAM_DELAY_MS),
    }
}

fn parse_level(name: &str) -> Option<log::LevelFilter> {
    name.parse::<log::LevelFilter>().ok()
}
