//! ==============================================================================
//! config.rs - runtime configuration loader
//! ==============================================================================
//!
//! purpose:
//!     defines the schema for `sensor.toml` (how the service runs) and reads
//!     the device identity from `PI_*` environment variables (who this node is).
//!
//! structure:
//!     - HostConfig: server bind, stream cadence, camera tool, log level.
//!     - DeviceConfig: device id, location, version. immutable after startup.
//!
//! ==============================================================================

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_DEVICE_ID: &str = "localsense-pi-1";
pub const DEFAULT_LAT: f64 = 12.9716;
pub const DEFAULT_LON: f64 = 77.5946;
pub const DEFAULT_LABEL: &str = "home-node";

/// Root configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct HostConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub stream: StreamConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// file this config was read from, `None` when running on defaults
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StreamConfig {
    pub interval_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CameraConfig {
    /// capture binary, looked up on PATH at startup
    pub tool: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: "0.0.0.0".to_string(), port: 8000 }
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self { interval_seconds: 5 }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self { tool: "rpicam-still".to_string(), timeout_seconds: 20 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string() }
    }
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            stream: StreamConfig::default(),
            camera: CameraConfig::default(),
            logging: LoggingConfig::default(),
            source: None,
        }
    }
}

impl HostConfig {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;

        let mut config: HostConfig = toml::from_str(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        config.source = Some(path.to_path_buf());

        Ok(config)
    }

    /// Load the first config file present, defaults if there is none.
    /// a file that exists but does not parse is an error.
    pub fn load_or_default() -> Result<Self> {
        let paths = [
            PathBuf::from("config").join("sensor.toml"),
            PathBuf::from("..").join("config").join("sensor.toml"),
        ];

        for path in &paths {
            if path.exists() {
                return Self::load(path);
            }
        }

        Ok(Self::default())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.bind, self.server.port)
    }

    pub fn stream_interval(&self) -> Duration {
        Duration::from_secs(self.stream.interval_seconds.max(1))
    }

    pub fn capture_timeout(&self) -> Duration {
        Duration::from_secs(self.camera.timeout_seconds.max(1))
    }

    /// Log configuration summary
    pub fn log_summary(&self) {
        match &self.source {
            Some(path) => tracing::info!("[CONFIG] loaded from {}", path.display()),
            None => tracing::warn!("[CONFIG] no config file found - using defaults"),
        }
        tracing::info!(
            bind = %self.bind_addr(),
            stream_interval_s = self.stream.interval_seconds,
            camera_tool = %self.camera.tool,
            capture_timeout_s = self.camera.timeout_seconds,
            log_level = %self.logging.level,
            "[CONFIG] host configuration"
        );
    }
}

// ==============================================================================
// device identity
// ==============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub lat: f64,
    pub lon: f64,
    pub label: String,
}

/// static identity of this node, reported by `/config` and `/health`
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceConfig {
    pub device_id: String,
    pub location: Location,
    pub version: String,
}

impl DeviceConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// builds the config from any key lookup; `from_env` passes the process
    /// environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let device_id = lookup("PI_DEVICE_ID").unwrap_or_else(|| DEFAULT_DEVICE_ID.to_string());
        let lat = parse_coord(&lookup, "PI_LOCATION_LAT", DEFAULT_LAT)?;
        let lon = parse_coord(&lookup, "PI_LOCATION_LON", DEFAULT_LON)?;
        let label = lookup("PI_LOCATION_LABEL").unwrap_or_else(|| DEFAULT_LABEL.to_string());

        Ok(Self {
            device_id,
            location: Location { lat, lon, label },
            version: env!("CARGO_PKG_VERSION").to_string(),
        })
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            device_id: DEFAULT_DEVICE_ID.to_string(),
            location: Location {
                lat: DEFAULT_LAT,
                lon: DEFAULT_LON,
                label: DEFAULT_LABEL.to_string(),
            },
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

fn parse_coord<F>(lookup: &F, key: &str, default: f64) -> Result<f64>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<f64>()
            .with_context(|| format!("invalid {} '{}'", key, raw)),
        None => Ok(default),
    }
}
