//! Startup helper that guarantees `/static/placeholder_image.png` resolves.

use std::path::{Path, PathBuf};

use image::{ImageFormat, Rgb, RgbImage};
use tracing::info;

use crate::illustration::provider::ImageError;

pub const PLACEHOLDER_FILE_NAME: &str = "placeholder_image.png";
/// 3:4, matching the requested illustration aspect ratio.
const WIDTH: u32 = 384;
const HEIGHT: u32 = 512;

/// Writes a soft sky-to-meadow gradient placeholder into `static_dir` unless
/// one is already there. Returns the placeholder's path.
pub fn ensure_placeholder(static_dir: &Path) -> Result<PathBuf, ImageError> {
    let path = static_dir.join(PLACEHOLDER_FILE_NAME);
    if path.exists() {
        return Ok(path);
    }

    std::fs::create_dir_all(static_dir)?;

    let sky = [186.0, 224.0, 255.0];
    let meadow = [196.0, 236.0, 176.0];
    let image = RgbImage::from_fn(WIDTH, HEIGHT, |_, y| {
        let t = y as f32 / (HEIGHT - 1) as f32;
        let mix = |channel: usize| (sky[channel] * (1.0 - t) + meadow[channel] * t) as u8;
        Rgb([mix(0), mix(1), mix(2)])
    });
    image.save_with_format(&path, ImageFormat::Png)?;

    info!("Wrote placeholder illustration to {}", path.display());
    Ok(path)
}
