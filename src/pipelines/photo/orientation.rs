// SPDX-License-Identifier: GPL-3.0-only

//! Rotation needed to display a captured frame upright
//!
//! The session reports how far the sensor image is turned. The EXIF
//! orientation tag of the written JPEG can veto that rotation: a tag that is
//! present but "undefined" means the frame is left as delivered.

use crate::backends::camera::CameraSession;
use crate::constants::{EXIF_ORIENTATION_NORMAL, EXIF_ORIENTATION_UNDEFINED};
use image::DynamicImage;
use std::path::Path;
use tracing::{debug, warn};

/// Orientation inputs for one capture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OrientationHint {
    /// Clockwise rotation reported by the session
    pub degrees: i32,
    /// EXIF orientation tag of the encoded frame, if it could be read
    pub exif: Option<u32>,
}

impl OrientationHint {
    pub fn from_degrees(degrees: i32) -> Self {
        Self {
            degrees,
            exif: None,
        }
    }

    pub fn with_exif(self, exif: Option<u32>) -> Self {
        Self { exif, ..self }
    }
}

/// Right-angle clockwise rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rotation {
    #[default]
    None,
    Cw90,
    Cw180,
    Cw270,
}

impl Rotation {
    /// Normalize any multiple of 90 degrees, negative values included
    pub fn from_degrees(degrees: i32) -> Option<Self> {
        match degrees.rem_euclid(360) {
            0 => Some(Rotation::None),
            90 => Some(Rotation::Cw90),
            180 => Some(Rotation::Cw180),
            270 => Some(Rotation::Cw270),
            _ => None,
        }
    }

    pub fn degrees(&self) -> u32 {
        match self {
            Rotation::None => 0,
            Rotation::Cw90 => 90,
            Rotation::Cw180 => 180,
            Rotation::Cw270 => 270,
        }
    }

    /// Whether width and height trade places
    pub fn swaps_axes(&self) -> bool {
        matches!(self, Rotation::Cw90 | Rotation::Cw270)
    }

    pub fn apply(&self, image: DynamicImage) -> DynamicImage {
        match self {
            Rotation::None => image,
            Rotation::Cw90 => image.rotate90(),
            Rotation::Cw180 => image.rotate180(),
            Rotation::Cw270 => image.rotate270(),
        }
    }
}

/// Decide the rotation to apply for a hint
pub fn resolve_rotation(hint: &OrientationHint) -> Rotation {
    if hint.degrees == 0 || hint.exif == Some(EXIF_ORIENTATION_UNDEFINED) {
        return Rotation::None;
    }

    match Rotation::from_degrees(hint.degrees) {
        Some(rotation) => rotation,
        None => {
            warn!(degrees = hint.degrees, "Frame orientation is not a right angle, not rotating");
            Rotation::None
        }
    }
}

/// Frame orientation reported by the session, 0 if it cannot tell
pub fn session_degrees(session: &dyn CameraSession) -> i32 {
    match session.frame_orientation_degrees() {
        Ok(degrees) => degrees,
        Err(e) => {
            debug!(error = %e, "Error getting frame orientation for stream");
            0
        }
    }
}

/// Read the EXIF orientation tag of a file
///
/// A file without EXIF data counts as normal orientation. Unreadable
/// metadata is logged and yields `None`; it never fails the capture.
pub fn read_exif_orientation(path: &Path) -> Option<u32> {
    let file = match std::fs::File::open(path) {
        Ok(file) => file,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Exif data error");
            return None;
        }
    };
    let mut reader = std::io::BufReader::new(file);

    let exif = match exif::Reader::new().read_from_container(&mut reader) {
        Ok(exif) => exif,
        Err(exif::Error::NotFound(_)) => return Some(EXIF_ORIENTATION_NORMAL),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Exif data error");
            return None;
        }
    };

    let orientation = exif
        .get_field(exif::Tag::Orientation, exif::In::PRIMARY)
        .and_then(|field| field.value.get_uint(0))
        .unwrap_or(EXIF_ORIENTATION_NORMAL);

    Some(orientation)
}
