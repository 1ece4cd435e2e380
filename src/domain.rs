use serde::{Deserialize, Serialize};

/// one synthetic temperature/humidity sample
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Reading {
    /// unix timestamp in seconds
    pub ts: u64,
    /// temperature in celsius
    pub temperature: f64,
    /// relative humidity (0-100%)
    pub humidity: f64,
}

/// derived metrics from the latest snapshot
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Metric {
    pub ts: u64,
    /// normalized grayscale brightness, 0-10
    pub brightness: f64,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct LocationInfo {
    pub lat: f64,
    pub lon: f64,
    pub label: String,
}

/// capability flags advertised for discovery
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct SensorFlags {
    pub brightness: bool,
    pub camera: bool,
    pub temp_humidity: bool,
}

/// body of `GET /config`
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct ConfigReport {
    pub device_id: String,
    pub location: LocationInfo,
    pub sensors: SensorFlags,
    pub version: String,
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Ok,
    Degraded,
}

/// body of `GET /health`
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub uptime_sec: u64,
    pub last_snapshot_ok: bool,
    pub last_snapshot_ts: Option<u64>,
    pub last_snapshot_age_sec: Option<u64>,
    pub device_id: String,
    pub camera_available: bool,
}

/// error body for failed requests
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct ApiError {
    pub error: String,
    pub message: String,
}
