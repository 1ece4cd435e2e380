//! ==============================================================================
//! camera.rs - snapshot capture via the camera cli
//! ==============================================================================
//!
//! purpose:
//!     takes a still with `rpicam-still` (or whatever tool is configured) into
//!     a fixed path and keeps the last-attempt bookkeeping that `/health` and
//!     `/metrics` read.
//!
//! relationships:
//!     - used by: server.rs (`/snapshot`)
//!     - state read by: server.rs (`/health`), brightness via the snapshot path
//!
//! why subprocess?:
//!     the libcamera stack is C++ with no stable rust bindings. the cli tool
//!     is what the pi os ships and it handles sensor tuning for us.
//!
//! state machine:
//!     ok <-> degraded, only moved by capture attempts. a fresh process starts
//!     "degraded" (ok = false, no timestamp) until the first good capture.
//!
//!     capture calls are NOT serialized against each other. two overlapping
//!     requests write the same output file and race on the state fields; the
//!     lock below only makes each field update atomic.
//!
//! ==============================================================================

use crate::sensor;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tokio::sync::RwLock;

/// where every capture lands; overwritten each time
pub const SNAPSHOT_PATH: &str = "/tmp/pi_snapshot.jpg";

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("camera not available or {tool} not installed")]
    CameraUnavailable { tool: String },

    #[error("capture tool exited with {status}: {stderr}")]
    Exited { status: ExitStatus, stderr: String },

    #[error("capture tool timed out after {0:?}")]
    TimedOut(Duration),

    #[error("capture i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl SnapshotError {
    /// everything past the availability check counts as a failed capture
    pub fn is_capture_failure(&self) -> bool {
        !matches!(self, SnapshotError::CameraUnavailable { .. })
    }
}

/// outcome of the most recent capture attempt
#[derive(Debug, Clone)]
pub struct SnapshotState {
    pub ok: bool,
    /// unix seconds of the last successful capture
    pub timestamp: Option<u64>,
    pub path: PathBuf,
}

impl SnapshotState {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { ok: false, timestamp: None, path: path.into() }
    }
}

impl Default for SnapshotState {
    fn default() -> Self {
        Self::new(SNAPSHOT_PATH)
    }
}

/// the capture tool, resolved once at startup
#[derive(Debug, Clone)]
pub struct Camera {
    name: String,
    tool: Option<PathBuf>,
    timeout: Duration,
}

impl Camera {
    /// probe for `name` on PATH (or as a direct path if it contains a separator)
    pub fn detect(name: &str, timeout: Duration) -> Self {
        let tool = find_tool(name);
        match &tool {
            Some(path) => tracing::info!("[CAMERA] ✓ using {}", path.display()),
            None => tracing::warn!("[CAMERA] ⚠ {} not found, /snapshot disabled", name),
        }
        Self { name: name.to_string(), tool, timeout }
    }

    #[cfg(test)]
    pub fn with_tool(tool: impl Into<PathBuf>, timeout: Duration) -> Self {
        let tool = tool.into();
        Self { name: tool.display().to_string(), tool: Some(tool), timeout }
    }

    #[cfg(test)]
    pub fn unavailable(name: &str) -> Self {
        Self { name: name.to_string(), tool: None, timeout: Duration::from_secs(20) }
    }

    pub fn is_available(&self) -> bool {
        self.tool.is_some()
    }

    /// run the capture tool and return the jpeg bytes
    ///
    /// state is left untouched when the camera is unavailable. any other
    /// failure marks the state not-ok and keeps the previous timestamp.
    pub async fn capture(&self, state: &RwLock<SnapshotState>) -> Result<Vec<u8>, SnapshotError> {
        let tool = self.tool.as_deref().ok_or_else(|| SnapshotError::CameraUnavailable {
            tool: self.name.clone(),
        })?;

        let path = state.read().await.path.clone();

        match self.run_tool(tool, &path).await {
            Ok(bytes) => {
                let mut s = state.write().await;
                s.ok = true;
                s.timestamp = Some(sensor::now_secs());
                tracing::info!("[SNAPSHOT] ✓ captured {} bytes to {}", bytes.len(), path.display());
                Ok(bytes)
            }
            Err(e) => {
                state.write().await.ok = false;
                match &e {
                    SnapshotError::Exited { status, stderr } => {
                        tracing::warn!("[SNAPSHOT] ⚠ {} failed ({}), stderr: {}", self.name, status, stderr)
                    }
                    other => tracing::warn!("[SNAPSHOT] ⚠ capture error: {}", other),
                }
                Err(e)
            }
        }
    }

    async fn run_tool(&self, tool: &Path, output: &Path) -> Result<Vec<u8>, SnapshotError> {
        let child = Command::new(tool)
            .arg("-o")
            .arg(output)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // dropping the future (timeout, aborted request) kills the child
            .kill_on_drop(true)
            .spawn()?;

        let out = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| SnapshotError::TimedOut(self.timeout))??;

        let stdout = String::from_utf8_lossy(&out.stdout);
        let stderr = String::from_utf8_lossy(&out.stderr);

        if !out.status.success() {
            return Err(SnapshotError::Exited {
                status: out.status,
                stderr: stderr.trim().to_string(),
            });
        }

        if !stdout.trim().is_empty() {
            tracing::debug!("[SNAPSHOT] {} stdout: {}", self.name, stdout.trim());
        }
        if !stderr.trim().is_empty() {
            // rpicam-still writes its normal progress chatter to stderr
            tracing::debug!("[SNAPSHOT] {} stderr: {}", self.name, stderr.trim());
        }

        Ok(tokio::fs::read(output).await?)
    }
}

/// locate an executable the way a shell would
fn find_tool(name: &str) -> Option<PathBuf> {
    let candidate = Path::new(name);
    if candidate.components().count() > 1 {
        return is_executable(candidate).then(|| candidate.to_path_buf());
    }

    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths)
        .map(|dir| dir.join(name))
        .find(|p| is_executable(p))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
