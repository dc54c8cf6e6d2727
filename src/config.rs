use std::path::{Path, PathBuf};

use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub processes: ProcessesConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub refresh_interval_secs: u64,
    /// Signed so a negative value reaches capture validation instead of failing the parse.
    pub top_n: i64,
    pub sample_interval_ms: i64,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        GeneralConfig {
            refresh_interval_secs: 2,
            top_n: 10,
            sample_interval_ms: 500,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProcessesConfig {
    /// Extra process names hidden from the ranking, case-insensitive.
    pub hide: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "warn".to_string(),
            json: false,
        }
    }
}

pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("hostwatch").join("config.toml"))
}

pub fn load_config() -> Config {
    match config_path() {
        Some(path) if path.exists() => load_config_from_path(&path),
        _ => Config::default(),
    }
}

pub fn load_config_from_path(path: &Path) -> Config {
    match std::fs::read_to_string(path) {
        Ok(contents) => toml::from_str(&contents).unwrap_or_else(|err| {
            eprintln!(
                "warning: ignoring invalid config {}: {err}",
                path.display()
            );
            Config::default()
        }),
        Err(_) => Config::default(),
    }
}
