// SPDX-License-Identifier: GPL-3.0-only

//! Capture options as received from the host bridge, and storage locations

use crate::constants::{self, capture_target};
use crate::errors::{CaptureError, CaptureResult};
use crate::flash::FlashMode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Where a finished photo ends up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "TargetValue", into = "i64")]
pub enum CaptureTarget {
    /// Returned to the caller as base64 text, never written to disk
    Memory,
    /// Application data directory, not visible in the gallery
    Disk,
    /// Public photo library, registered with the media index
    #[default]
    CameraRoll,
    /// Application cache directory
    Temp,
}

/// The bridge sends targets either as a numeric code or by name
#[derive(Deserialize)]
#[serde(untagged)]
enum TargetValue {
    Code(i64),
    Name(String),
}

impl CaptureTarget {
    /// Numeric code understood by the host bridge
    pub fn code(&self) -> i64 {
        match self {
            CaptureTarget::Memory => capture_target::MEMORY,
            CaptureTarget::Disk => capture_target::DISK,
            CaptureTarget::CameraRoll => capture_target::CAMERA_ROLL,
            CaptureTarget::Temp => capture_target::TEMP,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            capture_target::MEMORY => Some(CaptureTarget::Memory),
            capture_target::DISK => Some(CaptureTarget::Disk),
            capture_target::CAMERA_ROLL => Some(CaptureTarget::CameraRoll),
            capture_target::TEMP => Some(CaptureTarget::Temp),
            _ => None,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "memory" => Some(CaptureTarget::Memory),
            "disk" => Some(CaptureTarget::Disk),
            "cameraRoll" => Some(CaptureTarget::CameraRoll),
            "temp" => Some(CaptureTarget::Temp),
            _ => None,
        }
    }

    /// Whether the photo is written to the filesystem at all
    pub fn is_file(&self) -> bool {
        !matches!(self, CaptureTarget::Memory)
    }
}

impl TryFrom<TargetValue> for CaptureTarget {
    type Error = String;

    fn try_from(value: TargetValue) -> Result<Self, Self::Error> {
        match value {
            TargetValue::Code(code) => {
                Self::from_code(code).ok_or_else(|| format!("unknown capture target {}", code))
            }
            TargetValue::Name(name) => {
                Self::from_name(&name).ok_or_else(|| format!("unknown capture target {:?}", name))
            }
        }
    }
}

impl From<CaptureTarget> for i64 {
    fn from(target: CaptureTarget) -> Self {
        target.code()
    }
}

impl std::str::FromStr for CaptureTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(code) = s.parse::<i64>() {
            return TargetValue::Code(code).try_into();
        }
        TargetValue::Name(s.to_string()).try_into()
    }
}

/// Options for a single photo capture
///
/// Keys mirror the bridge option map. Missing keys take the same defaults
/// the JavaScript side applies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CaptureOptions {
    /// JPEG quality in (0, 1]
    pub max_jpeg_quality: f64,
    /// Bound on the longer side of the output in pixels
    pub max_size: u32,
    pub capture_target: CaptureTarget,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            max_jpeg_quality: constants::DEFAULT_JPEG_QUALITY,
            max_size: constants::DEFAULT_MAX_SIZE,
            capture_target: CaptureTarget::default(),
        }
    }
}

impl CaptureOptions {
    /// Parse the option map forwarded by the bridge as JSON
    pub fn from_json(json: &str) -> CaptureResult<Self> {
        serde_json::from_str(json).map_err(|e| CaptureError::InvalidOptions(e.to_string()))
    }

    pub fn validate(&self) -> CaptureResult<()> {
        if !(self.max_jpeg_quality > 0.0 && self.max_jpeg_quality <= 1.0) {
            return Err(CaptureError::InvalidOptions(format!(
                "maxJpegQuality must be in (0, 1], got {}",
                self.max_jpeg_quality
            )));
        }
        if self.max_size == 0 {
            return Err(CaptureError::InvalidOptions(
                "maxSize must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Options for a flash switch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FlashOptions {
    pub flash_mode: FlashMode,
}

impl FlashOptions {
    pub fn from_json(json: &str) -> CaptureResult<Self> {
        serde_json::from_str(json).map_err(|e| CaptureError::InvalidOptions(e.to_string()))
    }
}

/// Directories that persisted photos are written to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Public photo library (camera roll)
    pub library_dir: PathBuf,
    /// Private cache (temp)
    pub cache_dir: PathBuf,
    /// Private application data (disk)
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        Self {
            library_dir: dirs::picture_dir().unwrap_or_else(|| home.join("Pictures")),
            cache_dir: dirs::cache_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join(constants::APP_FOLDER),
            data_dir: dirs::data_dir()
                .unwrap_or_else(|| home.join(".local/share"))
                .join(constants::APP_FOLDER),
        }
    }
}

impl StorageConfig {
    /// Place all three directories under one root
    pub fn under(root: &Path) -> Self {
        Self {
            library_dir: root.join("library"),
            cache_dir: root.join("cache"),
            data_dir: root.join("data"),
        }
    }

    /// Directory for a target, `None` for in-memory captures
    pub fn dir_for(&self, target: CaptureTarget) -> Option<&Path> {
        match target {
            CaptureTarget::Memory => None,
            CaptureTarget::Disk => Some(&self.data_dir),
            CaptureTarget::CameraRoll => Some(&self.library_dir),
            CaptureTarget::Temp => Some(&self.cache_dir),
        }
    }
}
