//! ==============================================================================
//! main.rs - pi sensor service entry point
//! ==============================================================================
//!
//! purpose:
//!     small http service running on a raspberry pi edge node. consumers
//!     (dashboards, relay nodes) poll it for environment readings, camera
//!     snapshots, a brightness metric derived from the last snapshot, and
//!     device identity/health for discovery.
//!
//! responsibilities:
//!     - load host configuration (sensor.toml) and device identity (PI_* env)
//!     - probe for the camera tool once at startup
//!     - build the shared state handed to every handler
//!     - serve the api
//!
//! relationships:
//!     - config.rs: HostConfig + DeviceConfig
//!     - camera.rs: snapshot capture + last-attempt state
//!     - brightness.rs: brightness score with synthetic fallback
//!     - sensor.rs / stream.rs: readings, one-shot and ndjson
//!     - state.rs: shared context (Arc) behind the handlers
//!     - server.rs: router and handlers
//!
//! architecture:
//!
//!     ┌──────────────────────────────────────────────────────────┐
//!     │                   pi-sensor (this binary)                │
//!     │  ┌────────────┐   ┌───────────────┐   ┌──────────────┐   │
//!     │  │ web server │──▶│ shared state  │◀──│ camera probe │   │
//!     │  │ (axum)     │   │ Arc<AppState> │   │ (startup)    │   │
//!     │  └─────┬──────┘   └───────────────┘   └──────────────┘   │
//!     │        │ per-request                                     │
//!     │   ┌────┴─────┬──────────────┬─────────────┐              │
//!     │   ▼          ▼              ▼             ▼              │
//!     │ sensor   stream feed   rpicam-still   brightness         │
//!     │ (rand)   (interval)    (subprocess)   (image decode)     │
//!     └──────────────────────────────────────────────────────────┘
//!
//! ==============================================================================

mod brightness;
mod camera;
mod config;
mod domain;
mod sensor;
mod server;
mod state;
mod stream;

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // step 1: load configuration (logging level lives in it)
    let config = config::HostConfig::load_or_default()?;

    // step 2: initialize tracing, RUST_LOG wins over the config file
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("pi_sensor={},tower_http=info", config.logging.level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("===========================================================");
    tracing::info!("  Pi Sensor Service v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("===========================================================");
    config.log_summary();

    // step 3: device identity from the environment
    let device = config::DeviceConfig::from_env().context("invalid device configuration")?;
    tracing::info!(
        device_id = %device.device_id,
        lat = device.location.lat,
        lon = device.location.lon,
        label = %device.location.label,
        "[STARTUP] device identity"
    );

    // step 4: camera probe, fixed for the life of the process
    let camera = camera::Camera::detect(&config.camera.tool, config.capture_timeout());

    // step 5: shared state
    let state = state::AppState::new(
        device,
        camera,
        camera::SnapshotState::default(),
        config.stream_interval(),
    )
    .shared();
    tracing::info!("[STARTUP] snapshot path {}", camera::SNAPSHOT_PATH);

    // step 6: serve until the process is stopped
    if let Err(e) = server::run_server(state, &config.bind_addr()).await {
        tracing::error!("[ERROR] web server error: {:#}", e);
        return Err(e);
    }
    Ok(())
}
