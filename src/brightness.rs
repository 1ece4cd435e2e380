//! brightness score from the latest snapshot
//!
//! the score is the mean grayscale intensity scaled to 0-10. `/metrics`
//! never fails: any problem reading the image falls back to a random score.

use crate::sensor;
use image::{GrayImage, ImageReader};
use std::path::Path;
use thiserror::Error;

pub const MAX_SCORE: f64 = 10.0;

#[derive(Debug, Error)]
pub enum ImageReadError {
    #[error("cannot open snapshot: {0}")]
    Open(#[from] std::io::Error),

    #[error("cannot decode snapshot: {0}")]
    Decode(#[from] image::ImageError),

    #[error("snapshot has no pixels")]
    Empty,
}

/// mean grayscale intensity of the image at `path`, scaled to [0, 10]
pub fn compute_brightness(path: &Path) -> Result<f64, ImageReadError> {
    let img = ImageReader::open(path)?.with_guessed_format()?.decode()?;
    score(&img.to_luma8())
}

/// mean intensity of a grayscale image, scaled to [0, 10]
pub fn score(gray: &GrayImage) -> Result<f64, ImageReadError> {
    let pixels = gray.as_raw();

    if pixels.is_empty() {
        return Err(ImageReadError::Empty);
    }

    let sum: u64 = pixels.iter().map(|&p| u64::from(p)).sum();
    let mean = sum as f64 / pixels.len() as f64;
    Ok(sensor::round2(mean / 255.0 * MAX_SCORE))
}

/// brightness for `/metrics`: computed from `path` when possible, random otherwise
pub async fn brightness_or_fallback(path: &Path) -> f64 {
    match tokio::fs::try_exists(path).await {
        Ok(true) => {}
        Ok(false) => {
            tracing::debug!("[METRICS] no snapshot yet, using synthetic brightness");
            return synthetic();
        }
        Err(e) => {
            tracing::warn!(
                "[METRICS] cannot check snapshot {}, falling back to synthetic: {}",
                path.display(),
                e
            );
            return synthetic();
        }
    }

    let owned = path.to_path_buf();
    match tokio::task::spawn_blocking(move || compute_brightness(&owned)).await {
        Ok(Ok(value)) => value,
        Ok(Err(e)) => {
            tracing::warn!("[METRICS] error computing brightness, falling back to synthetic: {}", e);
            synthetic()
        }
        Err(e) => {
            tracing::warn!("[METRICS] brightness task failed, falling back to synthetic: {}", e);
            synthetic()
        }
    }
}

fn synthetic() -> f64 {
    sensor::random_score(0.0, MAX_SCORE)
}
