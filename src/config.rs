use std::fs;
use log::LevelFilter;
use serde::Deserialize;
use crate::errors::ConfigError;
use crate::metrics::UnitSystem;

#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct Location {
    pub name: String,
    pub lat: f64,
    pub long: f64,
}

#[derive(Deserialize, Debug)]
pub struct ForecastParameters {
    pub user_agent: String,
    #[serde(default)]
    pub units: UnitSystem,
    #[serde(default = "default_cache_ttl_minutes")]
    pub cache_ttl_minutes: i64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,
}

#[derive(Deserialize, Debug)]
pub struct General {
    pub log_path: String,
    pub log_level: LevelFilter,
    pub log_to_stdout: bool,
    #[serde(default)]
    pub refresh_minutes: Option<u64>,
}

#[derive(Deserialize, Debug)]
pub struct Config {
    pub general: General,
    pub forecast: ForecastParameters,
    #[serde(default)]
    pub locations: Vec<Location>,
}

fn default_cache_ttl_minutes() -> i64 { 30 }
fn default_timeout_secs() -> u64 { 30 }
fn default_max_retries() -> usize { crate::MAX_RETRIES }

/// Loads the configuration file and returns a struct with all configuration items
///
/// # Arguments
///
/// * 'config_path' - path to the configuration file
pub fn load_config(config_path: &str) -> Result<Config, ConfigError> {
    let toml = fs::read_to_string(config_path)?;
    parse_config(&toml)
}

/// Parses and validates configuration given as a toml string
///
/// # Arguments
///
/// * 'toml' - the configuration document
pub fn parse_config(toml: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(toml)?;

    if config.locations.is_empty() {
        return Err(ConfigError::from("no locations configured"));
    }
    if config.forecast.cache_ttl_minutes <= 0 {
        return Err(ConfigError::from("cache_ttl_minutes must be positive"));
    }
    if config.forecast.max_retries == 0 {
        return Err(ConfigError::from("max_retries must be at least 1"));
    }
    if let Some(l) = config.locations.iter().find(|l| !(-90.0..=90.0).contains(&l.lat) || !(-180.0..=180.0).contains(&l.long)) {
        return Err(ConfigError(format!("coordinates out of range for {}", l.name)));
    }

    Ok(config)
}
