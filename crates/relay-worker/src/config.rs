//! Configuration for the relay: logging plus one listener per vendor

use serde::Deserialize;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

// Main config structure
#[derive(Debug, Deserialize)]
pub struct RelayConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    // one UDP listener per vendor dialect
    #[serde(default = "default_listeners")]
    pub listeners: Vec<ListenerConfig>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            listeners: default_listeners(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    // tracing filter directive, RUST_LOG wins when set
    #[serde(default = "default_level")]
    pub level: String,

    // optional log file, written alongside stdout
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            file: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListenerConfig {
    // vendor tag of the decoder, e.g. "stormshield"
    pub vendor: String,

    pub listen: SocketAddr,

    // downstream JSON listener
    pub forward: SocketAddr,

    // receive buffer size, vendor default when unset
    #[serde(default)]
    pub max_datagram: Option<usize>,

    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl ListenerConfig {
    pub fn new(vendor: &str, listen: SocketAddr, forward: SocketAddr) -> Self {
        Self {
            vendor: vendor.to_string(),
            listen,
            forward,
            max_datagram: None,
            enabled: true,
        }
    }

    pub fn max_datagram(&self) -> usize {
        self.max_datagram
            .unwrap_or_else(|| default_max_datagram(&self.vendor))
    }
}

impl RelayConfig {
    pub fn enabled_listeners(&self) -> impl Iterator<Item = &ListenerConfig> {
        self.listeners.iter().filter(|l| l.enabled)
    }

    /// Check the config against the vendors the relay knows about.
    pub fn validate(&self, vendors: &[&str]) -> Result<(), ConfigError> {
        if self.enabled_listeners().next().is_none() {
            return Err(ConfigError::Invalid("no enabled listener".to_string()));
        }
        for listener in self.enabled_listeners() {
            if !vendors.contains(&listener.vendor.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "unknown vendor '{}' (known: {})",
                    listener.vendor,
                    vendors.join(", ")
                )));
            }
            if listener.max_datagram == Some(0) {
                return Err(ConfigError::Invalid(format!(
                    "max_datagram must be positive for '{}'",
                    listener.vendor
                )));
            }
        }
        Ok(())
    }
}

// defaults - the ports the appliances were already pointed at
fn default_listeners() -> Vec<ListenerConfig> {
    vec![
        ListenerConfig::new(
            "stormshield",
            SocketAddr::from(([0, 0, 0, 0], 5514)),
            SocketAddr::from(([127, 0, 0, 1], 5515)),
        ),
        ListenerConfig::new(
            "synology",
            SocketAddr::from(([0, 0, 0, 0], 9513)),
            SocketAddr::from(([127, 0, 0, 1], 9514)),
        ),
    ]
}

fn default_max_datagram(vendor: &str) -> usize {
    match vendor {
        "synology" => 8192,
        _ => 65535,
    }
}

fn default_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

// Load configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<RelayConfig, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config: RelayConfig = toml::from_str(&content)?;
    Ok(config)
}
