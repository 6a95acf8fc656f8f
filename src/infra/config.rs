//! Configuration file support (`relogic.toml`).

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::cli::{AppContext, InitArgs};
use crate::core::timer::TimerOptions;

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Nominal system frequency in Hz, used when converting timer
    /// thresholds from cycles to seconds.
    pub frequency_hz: f64,

    /// Timer-family conversion settings
    pub timer: TimerConfig,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct TimerConfig {
    /// Lowest sequencing-timer number conversion may allocate
    pub dest_floor: u16,
    /// Lowest helper-variable number the polarity fixup may allocate
    pub helper_floor: u16,
    /// System-blocking guard appended to dropoff enable expressions
    pub blocking_term: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            frequency_hz: 50.0,
            timer: TimerConfig::default(),
        }
    }
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            dest_floor: 1,
            helper_floor: 1,
            blocking_term: "HALARM".to_string(),
        }
    }
}

impl Config {
    pub fn timer_options(&self) -> TimerOptions {
        TimerOptions {
            frequency_hz: self.frequency_hz,
            dest_floor: self.timer.dest_floor,
            helper_floor: self.timer.helper_floor,
            blocking_term: self.timer.blocking_term.clone(),
        }
    }
}

/// Load `relogic.toml` from the working directory, falling back to the
/// built-in defaults when absent.
pub fn load_config() -> Result<Config> {
    let path = Path::new("relogic.toml");
    if !path.exists() {
        return Ok(Config::default());
    }
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Write a default config file, refusing to clobber without `--force`.
pub fn init(args: InitArgs, ctx: &AppContext) -> Result<()> {
    let config_path = args.path.join("relogic.toml");

    if config_path.exists() && !args.force {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    let toml_string = toml::to_string_pretty(&Config::default())
        .context("Failed to serialize default config")?;
    std::fs::write(&config_path, toml_string).context("Failed to write config file")?;

    if !ctx.quiet {
        println!("Created config file at {}", config_path.display());
    }
    Ok(())
}
