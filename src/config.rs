//! Settings: defaults, optional TOML file, `POWERWATCH_*` environment.
//!
//! Precedence (lowest first): built-in defaults, settings file, environment
//! variables. CLI flags are applied on top by the binary.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

/// Runtime settings for the monitor.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Endpoint probed every tick. Must be set via file, env or CLI.
    pub url: String,
    /// Scheduler tick interval in seconds.
    pub tick_interval_secs: u64,
    /// Per-probe timeout in seconds.
    pub probe_timeout_secs: u64,
    /// Directory holding the live history document and monthly archives.
    pub storage_dir: PathBuf,
    /// Minutes of real time per pixel of timeline height.
    pub minutes_per_pixel: f64,
    /// Text line height in pixels, for timeline label placement.
    pub line_height: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            url: String::new(),
            tick_interval_secs: 60,
            probe_timeout_secs: 5,
            storage_dir: PathBuf::from("."),
            minutes_per_pixel: 4.0,
            line_height: 24.0,
        }
    }
}

impl Settings {
    /// Load settings from an optional file plus the environment.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(File::from(path));
        }
        let config = builder
            .add_source(Environment::with_prefix("POWERWATCH"))
            .build()
            .context("failed to load settings")?;

        config
            .try_deserialize()
            .context("failed to interpret settings")
    }
}
