//! Configuration file support for the BMI tracker.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/bmi/config.toml`.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub display: DisplayConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_store_file")]
    pub store_file: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            store_file: default_store_file(),
        }
    }
}

/// Logging configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Terminal output configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Tint results with the category color when writing to a terminal
    #[serde(default = "default_color")]
    pub color: bool,

    /// Width of the longest bar in the history chart
    #[serde(default = "default_chart_width")]
    pub chart_width: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            color: default_color(),
            chart_width: default_chart_width(),
        }
    }
}

// Default value functions
fn home_dir() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| home_dir().join(".local/share"));
    base.join("bmi")
}

fn default_store_file() -> String {
    "bmi_records.jsonl".into()
}

fn default_log_level() -> String {
    "warn".into()
}

fn default_color() -> bool {
    true
}

fn default_chart_width() -> usize {
    40
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| home_dir().join(".config"));
        base.join("bmi").join("config.toml")
    }

    /// Full path of the record store file
    pub fn store_path(&self) -> PathBuf {
        self.data.data_dir.join(&self.data.store_file)
    }

    fn validate(&self) -> Result<()> {
        let file = Path::new(&self.data.store_file);
        if self.data.store_file.trim().is_empty() || file.components().count() != 1 {
            return Err(Error::Config(format!(
                "store_file must be a plain file name, got {:?}",
                self.data.store_file
            )));
        }
        if self.display.chart_width == 0 {
            return Err(Error::Config("chart_width must be at least 1".into()));
        }
        Ok(())
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Save the current configuration to a specific path
    ///
    /// Writes to a temp file in the same directory and renames it over the target.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let parent = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(parent)?;

        let contents = self.to_toml_string()?;
        let mut temp = NamedTempFile::new_in(parent)?;
        temp.write_all(contents.as_bytes())?;
        temp.as_file().sync_all()?;
        temp.persist(path).map_err(|e| Error::Io(e.error))?;

        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}
