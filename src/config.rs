use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

pub const CONFIG_PATH: &str = "config.toml";
pub const API_KEY_ENV: &str = "IPIFY_API_KEY";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub provider: ProviderConfig,
    pub map: MapConfig,
    pub ui: UiConfig,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ProviderConfig {
    pub base_url: String,     // Scheme + host of the geolocation API
    pub api_key: String,      // Overridden by IPIFY_API_KEY when set
    pub timeout_seconds: u64, // Per-request timeout
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct MapConfig {
    pub zoom: u8,             // Initial zoom; re-centering keeps whatever zoom is current
    pub marker_glyph: String, // Drawn at the resolved coordinate
    pub marker_color: String, // Any color name ratatui understands ("red", "#ff8800", ...)
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct UiConfig {
    pub tick_rate_ms: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://geo.ipify.org".to_string(),
            api_key: String::new(),
            timeout_seconds: 10,
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            zoom: crate::map::DEFAULT_ZOOM,
            marker_glyph: "◉".to_string(),
            marker_color: "red".to_string(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self { tick_rate_ms: 150 }
    }
}

impl Config {
    /// Loads config.toml from the working directory, then applies the
    /// IPIFY_API_KEY override.
    pub fn load() -> Self {
        let mut config = Self::load_from(Path::new(CONFIG_PATH));
        config.apply_api_key_override(std::env::var(API_KEY_ENV).ok());
        config
    }

    /// Reads `path`. If it doesn't exist, writes the defaults there for the
    /// user to edit later. A file that fails to parse is left alone.
    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => {
                    info!("Loaded configuration from {}", path.display());
                    return config;
                }
                Err(e) => {
                    warn!("Failed to parse {}: {}. Using defaults.", path.display(), e);
                    return Self::default();
                }
            },
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => {
                warn!("Could not read {}: {}. Using defaults.", path.display(), e);
                return Self::default();
            }
            Err(_) => {}
        }

        let default_config = Self::default();
        match toml::to_string_pretty(&default_config) {
            Ok(toml_string) => {
                if fs::write(path, toml_string).is_err() {
                    warn!("Could not write default {} to disk.", path.display());
                }
            }
            Err(e) => warn!("Could not serialize default configuration: {}", e),
        }

        info!("Loaded default configuration.");
        default_config
    }

    pub fn apply_api_key_override(&mut self, key: Option<String>) {
        if let Some(key) = key.filter(|k| !k.trim().is_empty()) {
            info!("Using API key from {}", API_KEY_ENV);
            self.provider.api_key = key;
        }
    }
}
