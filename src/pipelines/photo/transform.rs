// SPDX-License-Identifier: GPL-3.0-only

//! Rotate, scale and re-encode a captured JPEG in place
//!
//! ```text
//! raw bytes ──▶ destination ──▶ decode + EXIF ──▶ rotate ──▶ scale ──▶ JPEG ──▶ destination
//! ```
//!
//! The raw frame is written first so the file can be decoded and its EXIF
//! tag read, then the transformed image overwrites it. Callers must make
//! sure nothing else writes the destination between the two writes.

use super::orientation::{OrientationHint, Rotation, read_exif_orientation, resolve_rotation};
use super::scaling::{needs_resize, scale_dimension};
use crate::errors::CaptureResult;
use image::DynamicImage;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Convert a quality fraction to the JPEG encoder's 1..=100 scale
pub fn jpeg_quality_percent(quality: f64) -> u8 {
    (100.0 * quality).round().clamp(1.0, 100.0) as u8
}

/// Per-axis scale applied after rotation
///
/// Factors are taken from the unrotated size, so for a quarter turn each
/// factor lands on the other axis. Both are equal up to truncation.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Scale {
    x: f32,
    y: f32,
}

impl Scale {
    fn for_bound(width: u32, height: u32, max_size: u32) -> Option<Self> {
        if !needs_resize(width, height, max_size) {
            return None;
        }
        let (scaled_width, scaled_height) = scale_dimension(width, height, max_size);
        debug!(scaled_width, scaled_height, "Scaling output");
        Some(Self {
            x: scaled_width as f32 / width as f32,
            y: scaled_height as f32 / height as f32,
        })
    }

    fn target(&self, width: u32, height: u32) -> (u32, u32) {
        let w = (width as f32 * self.x).round().max(1.0) as u32;
        let h = (height as f32 * self.y).round().max(1.0) as u32;
        (w, h)
    }
}

/// JPEG transformer for one capture request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageTransformer {
    max_size: u32,
    quality: f64,
}

impl ImageTransformer {
    pub fn new(max_size: u32, quality: f64) -> Self {
        Self { max_size, quality }
    }

    /// Write `raw` to `destination`, then overwrite it with the transformed JPEG
    ///
    /// `degrees` is the session-reported frame orientation. Returns the
    /// absolute path of the written file. A partially written file is left
    /// in place on failure.
    pub fn transform(&self, raw: &[u8], destination: &Path, degrees: i32) -> CaptureResult<PathBuf> {
        std::fs::write(destination, raw)?;

        let image = image::ImageReader::open(destination)?
            .with_guessed_format()?
            .decode()?;

        let hint = OrientationHint::from_degrees(degrees).with_exif(read_exif_orientation(destination));
        debug!(orientation = degrees, exif = ?hint.exif, "Resolving rotation");
        let rotation = resolve_rotation(&hint);

        let output = self.apply(image, rotation);

        Self::write_jpeg(&output, destination, jpeg_quality_percent(self.quality))?;

        let path = std::path::absolute(destination)?;
        info!(
            path = %path.display(),
            width = output.width(),
            height = output.height(),
            rotation = rotation.degrees(),
            "Photo written"
        );
        Ok(path)
    }

    /// Rotation first, then the scale computed on the unrotated size
    fn apply(&self, image: DynamicImage, rotation: Rotation) -> DynamicImage {
        let scale = Scale::for_bound(image.width(), image.height(), self.max_size);
        let rotated = rotation.apply(image);

        match scale {
            Some(scale) => {
                let (width, height) = scale.target(rotated.width(), rotated.height());
                rotated.resize_exact(width, height, FilterType::Triangle)
            }
            None => rotated,
        }
    }

    fn write_jpeg(image: &DynamicImage, path: &Path, quality: u8) -> CaptureResult<()> {
        let rgb = image.to_rgb8();
        let mut writer = BufWriter::new(File::create(path)?);

        {
            let mut encoder = JpegEncoder::new_with_quality(&mut writer, quality);
            encoder.encode(
                rgb.as_raw(),
                rgb.width(),
                rgb.height(),
                image::ExtendedColorType::Rgb8,
            )?;
        }

        writer.flush()?;
        let file = writer.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;
        Ok(())
    }
}
