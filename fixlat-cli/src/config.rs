//! Configuration file support
//!
//! TOML profiles are the primary interface for batch report runs; CLI
//! arguments are quick overrides on top. Profiles name the input directory,
//! the window size, and the zone the naive log timestamps are interpreted
//! in.

use anyhow::{anyhow, bail, Context, Result};
use chrono_tz::Tz;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level profile configuration for a report run
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct ProfileConfig {
    /// Directory whose immediate subdirectories each hold one source's log
    pub input_dir: PathBuf,
    /// Tumbling window size in seconds
    #[serde(default = "default_window_size_seconds")]
    pub window_size_seconds: u32,
    /// IANA zone id the naive log timestamps are interpreted in
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Log file name expected inside each source subdirectory
    #[serde(default = "default_log_file_name")]
    pub log_file_name: String,
    #[serde(default)]
    pub output: OutputConfig,
}

fn default_window_size_seconds() -> u32 {
    1
}

fn default_timezone() -> String {
    "America/Argentina/Buenos_Aires".to_string()
}

fn default_log_file_name() -> String {
    "delay.log".to_string()
}

/// Report output destinations (the human-readable summary always prints)
#[derive(Debug, Clone, Default, Deserialize, Serialize, JsonSchema)]
pub struct OutputConfig {
    /// Write the summary as pretty JSON to this path
    #[serde(default)]
    pub json: Option<PathBuf>,
    /// Write summary and per-window CSV files into this directory
    #[serde(default)]
    pub csv_dir: Option<PathBuf>,
}

impl ProfileConfig {
    /// Load and validate a profile from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read profile: {}", path.display()))?;
        let config: ProfileConfig = toml::from_str(&content)
            .with_context(|| format!("failed to parse profile: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate semantic constraints that serde cannot express
    pub fn validate(&self) -> Result<()> {
        if self.window_size_seconds == 0 {
            bail!("window_size_seconds must be positive");
        }
        if self.log_file_name.is_empty() {
            bail!("log_file_name must not be empty");
        }
        self.zone()?;
        Ok(())
    }

    /// The configured timezone, parsed
    pub fn zone(&self) -> Result<Tz> {
        parse_zone(&self.timezone)
    }
}

/// Parse an IANA zone id
pub fn parse_zone(name: &str) -> Result<Tz> {
    name.parse::<Tz>()
        .map_err(|_| anyhow!("unknown timezone: {name}"))
}
