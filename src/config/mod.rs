//! Configuration management
//!
//! Loads and saves configuration from XDG-compliant paths.
//! Config location: ~/.config/wilder/config.toml

pub mod defaults;

use crate::error::{Error, Result};
use defaults::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Default values for ranking and aggregation
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Dataset file locations
    #[serde(default)]
    pub data: DataConfig,

    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Map visualization flags
    #[serde(default)]
    pub viz: VizConfig,

    /// URL generation settings
    #[serde(default)]
    pub url: UrlConfig,
}

/// Default values for ranking and aggregation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Shortlist size
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Sort mode: timeless or season
    #[serde(default = "default_sort_mode")]
    pub sort_mode: String,

    /// Local proximity radius in kilometers
    #[serde(default = "default_radius_km")]
    pub radius_km: f64,

    /// Debounce threshold for proximity recomputes in kilometers
    #[serde(default = "default_movement_threshold_km")]
    pub movement_threshold_km: f64,

    /// Hotspot grid cell edge length in kilometers
    #[serde(default = "default_grid_km")]
    pub grid_km: f64,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: String,
}

/// Dataset file locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Compact occurrence dataset
    #[serde(default = "default_dataset_path")]
    pub dataset: String,

    /// Optional Wikimedia images map
    #[serde(default = "default_images_path")]
    pub images: String,
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Map visualization flags
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VizConfig {
    /// Show density hotspot cells
    #[serde(default = "default_true")]
    pub hotspots: bool,

    /// Show raw occurrence points
    #[serde(default)]
    pub points: bool,
}

/// URL generation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlConfig {
    /// Default URL provider
    #[serde(default = "default_url_provider")]
    pub default: String,

    /// URL provider templates
    #[serde(default = "default_url_providers")]
    pub providers: HashMap<String, String>,
}

// Default value functions for serde
fn default_top_n() -> usize {
    DEFAULT_TOP_N
}
fn default_sort_mode() -> String {
    DEFAULT_SORT_MODE.to_string()
}
fn default_radius_km() -> f64 {
    DEFAULT_RADIUS_KM
}
fn default_movement_threshold_km() -> f64 {
    DEFAULT_MOVEMENT_THRESHOLD_KM
}
fn default_grid_km() -> f64 {
    DEFAULT_GRID_KM
}
fn default_format() -> String {
    DEFAULT_FORMAT.to_string()
}
fn default_dataset_path() -> String {
    DEFAULT_DATASET_PATH.to_string()
}
fn default_images_path() -> String {
    DEFAULT_IMAGES_PATH.to_string()
}
fn default_host() -> String {
    DEFAULT_HOST.to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_true() -> bool {
    true
}
fn default_url_provider() -> String {
    DEFAULT_URL_PROVIDER.to_string()
}
fn default_url_providers() -> HashMap<String, String> {
    let mut providers = HashMap::new();
    providers.insert(
        "google".to_string(),
        "https://www.google.com/maps/@{lat},{lon},15z".to_string(),
    );
    providers.insert(
        "openstreetmap".to_string(),
        "https://www.openstreetmap.org/#map=16/{lat}/{lon}".to_string(),
    );
    providers.insert(
        "apple".to_string(),
        "https://maps.apple.com/?ll={lat},{lon}".to_string(),
    );
    providers
}

// Implement Default traits
impl Default for Config {
    fn default() -> Self {
        Self {
            defaults: DefaultsConfig::default(),
            data: DataConfig::default(),
            server: ServerConfig::default(),
            viz: VizConfig::default(),
            url: UrlConfig::default(),
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
            sort_mode: default_sort_mode(),
            radius_km: default_radius_km(),
            movement_threshold_km: default_movement_threshold_km(),
            grid_km: default_grid_km(),
            format: default_format(),
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dataset: default_dataset_path(),
            images: default_images_path(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for VizConfig {
    fn default() -> Self {
        Self {
            hotspots: true,
            points: false,
        }
    }
}

impl Default for UrlConfig {
    fn default() -> Self {
        Self {
            default: default_url_provider(),
            providers: default_url_providers(),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(APP_DIR_NAME))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from the default path
    ///
    /// Creates default config if file doesn't exist
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if path.exists() {
            let content = fs::read_to_string(&path)
                .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;

            toml::from_str(&content)
                .map_err(|e| Error::Config(format!("Failed to parse config file: {}", e)))
        } else {
            // Create default config
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        // Ensure directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| Error::Config(format!("Failed to create config directory: {}", e)))?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(&path, content)
            .map_err(|e| Error::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Get a configuration value by key path
    ///
    /// Key format: "section.key"
    /// Returns the value as a string, or None if not found
    pub fn get(&self, key: &str) -> Option<String> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["defaults", "top_n"] => Some(self.defaults.top_n.to_string()),
            ["defaults", "sort_mode"] => Some(self.defaults.sort_mode.clone()),
            ["defaults", "radius_km"] => Some(self.defaults.radius_km.to_string()),
            ["defaults", "movement_threshold_km"] => {
                Some(self.defaults.movement_threshold_km.to_string())
            }
            ["defaults", "grid_km"] => Some(self.defaults.grid_km.to_string()),
            ["defaults", "format"] => Some(self.defaults.format.clone()),

            ["data", "dataset"] => Some(self.data.dataset.clone()),
            ["data", "images"] => Some(self.data.images.clone()),

            ["server", "host"] => Some(self.server.host.clone()),
            ["server", "port"] => Some(self.server.port.to_string()),

            ["viz", "hotspots"] => Some(self.viz.hotspots.to_string()),
            ["viz", "points"] => Some(self.viz.points.to_string()),

            ["url", "default"] => Some(self.url.default.clone()),

            _ => None,
        }
    }

    /// Set a configuration value by key path
    ///
    /// Key format: "section.key"
    /// Returns error if key is invalid or value type is wrong
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["defaults", "top_n"] => {
                let n: i64 = value
                    .parse()
                    .map_err(|_| Error::Config(format!("Invalid top_n value: {}", value)))?;
                // shortlist is never empty
                self.defaults.top_n = n.max(1) as usize;
            }
            ["defaults", "sort_mode"] => {
                value
                    .parse::<crate::rank::SortMode>()
                    .map_err(Error::Config)?;
                self.defaults.sort_mode = value.to_string();
            }
            ["defaults", "radius_km"] => {
                self.defaults.radius_km = value
                    .parse()
                    .map_err(|_| Error::Config(format!("Invalid radius value: {}", value)))?;
            }
            ["defaults", "movement_threshold_km"] => {
                self.defaults.movement_threshold_km = value
                    .parse()
                    .map_err(|_| Error::Config(format!("Invalid threshold value: {}", value)))?;
            }
            ["defaults", "grid_km"] => {
                let grid: f64 = value
                    .parse()
                    .map_err(|_| Error::Config(format!("Invalid grid size value: {}", value)))?;
                if !grid.is_finite() || grid <= 0.0 {
                    return Err(Error::InvalidGridSize(format!(
                        "Grid size must be positive, got {}",
                        value
                    )));
                }
                self.defaults.grid_km = grid;
            }
            ["defaults", "format"] => {
                self.defaults.format = value.to_string();
            }

            ["data", "dataset"] => {
                self.data.dataset = value.to_string();
            }
            ["data", "images"] => {
                self.data.images = value.to_string();
            }

            ["server", "host"] => {
                self.server.host = value.to_string();
            }
            ["server", "port"] => {
                self.server.port = value
                    .parse()
                    .map_err(|_| Error::Config(format!("Invalid port value: {}", value)))?;
            }

            ["viz", "hotspots"] => {
                self.viz.hotspots = value
                    .parse()
                    .map_err(|_| Error::Config(format!("Invalid boolean value: {}", value)))?;
            }
            ["viz", "points"] => {
                self.viz.points = value
                    .parse()
                    .map_err(|_| Error::Config(format!("Invalid boolean value: {}", value)))?;
            }

            ["url", "default"] => {
                self.url.default = value.to_string();
            }

            _ => {
                return Err(Error::Config(format!("Unknown config key: {}", key)));
            }
        }

        Ok(())
    }

    /// List all available config keys
    pub fn available_keys() -> Vec<&'static str> {
        vec![
            "defaults.top_n",
            "defaults.sort_mode",
            "defaults.radius_km",
            "defaults.movement_threshold_km",
            "defaults.grid_km",
            "defaults.format",
            "data.dataset",
            "data.images",
            "server.host",
            "server.port",
            "viz.hotspots",
            "viz.points",
            "url.default",
        ]
    }

    /// Format a map URL using the specified provider
    ///
    /// Replaces {lat} and {lon} placeholders with actual values
    pub fn format_url(&self, provider: Option<&str>, lat: f64, lon: f64) -> Result<String> {
        let provider_name = provider.unwrap_or(&self.url.default);

        let template = self
            .url
            .providers
            .get(provider_name)
            .ok_or_else(|| Error::Config(format!("Unknown URL provider: {}", provider_name)))?;

        Ok(template
            .replace("{lat}", &lat.to_string())
            .replace("{lon}", &lon.to_string()))
    }

    /// Get server address as "host:port"
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
