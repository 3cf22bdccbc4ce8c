use anyhow::Context;
use log::{info, warn};
use serde::Deserialize;
use std::{fs::File, path::PathBuf};

#[derive(Debug, Deserialize)]
pub struct Config {
    /// Where settings are persisted between runs
    #[serde(default = "default_settings_path")]
    pub settings_path: PathBuf,
    /// Show hours 0-23 instead of 1-12
    #[serde(default = "default_clock_24h")]
    pub clock_24h: bool,
    /// File containing the battery charge percentage, e.g.
    /// /sys/class/power_supply/BAT0/capacity
    #[serde(default)]
    pub battery_path: Option<PathBuf>,
    /// Needed to fetch weather. Without it, refresh requests fail.
    #[serde(default)]
    pub weather: Option<WeatherConfig>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct WeatherConfig {
    pub api_key: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Config {
    const PATH: &'static str = "./config.json";

    /// Load config from the working directory. A missing file gives the
    /// defaults, but a broken one is an error.
    pub fn load() -> anyhow::Result<Self> {
        info!("Loading config from `{}`", Self::PATH);
        let file = match File::open(Self::PATH) {
            Ok(file) => file,
            Err(err) => {
                warn!("Error opening {}, using defaults: {err}", Self::PATH);
                return Ok(Self::default());
            }
        };
        serde_json::from_reader(file)
            .context(format!("Error parsing config file {}", Self::PATH))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            settings_path: default_settings_path(),
            clock_24h: default_clock_24h(),
            battery_path: None,
            weather: None,
        }
    }
}

fn default_settings_path() -> PathBuf {
    "./settings.json".into()
}

fn default_clock_24h() -> bool {
    true
}
