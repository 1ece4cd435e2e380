use crate::camera::{Camera, SnapshotState};
use crate::config::DeviceConfig;
use crate::domain::{ConfigReport, HealthReport, HealthStatus, LocationInfo, SensorFlags};
use crate::sensor;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// everything the handlers share, built once in main and cloned per request
pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub device: DeviceConfig,
    pub camera: Camera,
    /// written only by capture attempts
    pub snapshot: RwLock<SnapshotState>,
    pub stream_interval: Duration,
    started_at: Instant,
}

impl AppState {
    pub fn new(
        device: DeviceConfig,
        camera: Camera,
        snapshot: SnapshotState,
        stream_interval: Duration,
    ) -> Self {
        Self {
            device,
            camera,
            snapshot: RwLock::new(snapshot),
            stream_interval,
            started_at: Instant::now(),
        }
    }

    pub fn shared(self) -> SharedState {
        Arc::new(self)
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    pub fn config_report(&self) -> ConfigReport {
        ConfigReport {
            device_id: self.device.device_id.clone(),
            location: LocationInfo {
                lat: self.device.location.lat,
                lon: self.device.location.lon,
                label: self.device.location.label.clone(),
            },
            sensors: SensorFlags {
                brightness: true,
                camera: self.camera.is_available(),
                // simulated for now
                temp_humidity: true,
            },
            version: self.device.version.clone(),
        }
    }

    /// status is "degraded" until a capture succeeds, including when none
    /// has been attempted yet
    pub async fn health_report(&self) -> HealthReport {
        let snap = self.snapshot.read().await.clone();
        let now = sensor::now_secs();

        HealthReport {
            status: if snap.ok { HealthStatus::Ok } else { HealthStatus::Degraded },
            uptime_sec: self.uptime().as_secs(),
            last_snapshot_ok: snap.ok,
            last_snapshot_ts: snap.timestamp,
            last_snapshot_age_sec: snap.timestamp.map(|ts| now.saturating_sub(ts)),
            device_id: self.device.device_id.clone(),
            camera_available: self.camera.is_available(),
        }
    }
}
