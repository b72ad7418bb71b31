// SPDX-License-Identifier: GPL-3.0-only

//! Flash LED control
//!
//! [`FlashMode`] is what the host bridge asks for. [`FlashHardware`] drives
//! torch LEDs exposed by Linux at `/sys/class/leds/*:flash` through their
//! `brightness` file, which is group-writable on most phones and tablets.

use crate::constants::flash_mode;
use crate::errors::{CaptureError, CaptureResult};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Default sysfs LED class directory
pub const SYSFS_LEDS_DIR: &str = "/sys/class/leds";

/// Flash operating mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum FlashMode {
    /// Flash LED is off
    #[default]
    Off,
    /// Torch / flashlight mode (LED stays on continuously)
    Torch,
}

impl From<i64> for FlashMode {
    /// Only the torch code turns the LED on, anything else means off
    fn from(code: i64) -> Self {
        if code == flash_mode::TORCH {
            FlashMode::Torch
        } else {
            FlashMode::Off
        }
    }
}

impl From<FlashMode> for i64 {
    fn from(mode: FlashMode) -> Self {
        match mode {
            FlashMode::Off => flash_mode::OFF,
            FlashMode::Torch => flash_mode::TORCH,
        }
    }
}

/// A flash LED discovered under the LED class directory
#[derive(Debug, Clone)]
pub struct FlashDevice {
    /// e.g. `/sys/class/leds/white:flash`
    path: PathBuf,
    max_brightness: u32,
    name: String,
}

impl FlashDevice {
    /// Get the device name (e.g. "white:flash")
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set raw brightness value (0 = off, max_brightness = full)
    pub fn set_brightness(&self, value: u32) -> io::Result<()> {
        let clamped = value.min(self.max_brightness);
        std::fs::write(self.path.join("brightness"), clamped.to_string())
    }

    pub fn apply(&self, mode: FlashMode) -> io::Result<()> {
        match mode {
            FlashMode::Off => self.set_brightness(0),
            FlashMode::Torch => self.set_brightness(self.max_brightness),
        }
    }
}

/// Result of flash LED detection
///
/// Keeps "hardware exists" apart from "we can control it" so a caller gets
/// a useful message instead of a silent failure.
#[derive(Debug, Default)]
pub struct FlashHardware {
    /// Devices we can actually control (writable)
    pub devices: Vec<FlashDevice>,
    /// Set if LEDs were found but none is writable
    pub permission_error: Option<String>,
}

impl FlashHardware {
    /// Scan `leds_dir` for `*:flash` entries
    pub fn detect_in(leds_dir: &Path) -> FlashHardware {
        let Ok(entries) = std::fs::read_dir(leds_dir) else {
            warn!(dir = %leds_dir.display(), "Cannot read LED directory, flash discovery skipped");
            return FlashHardware::default();
        };

        let mut devices = Vec::new();
        let mut unwritable = Vec::new();

        for entry in entries.flatten() {
            let name = entry.file_name();
            let Some(name_str) = name.to_str() else {
                continue;
            };

            if !name_str.ends_with(":flash") {
                continue;
            }

            let led_path = entry.path();
            let max_brightness_path = led_path.join("max_brightness");

            let max_brightness = match std::fs::read_to_string(&max_brightness_path) {
                Ok(s) => match s.trim().parse::<u32>() {
                    Ok(v) if v > 0 => v,
                    _ => {
                        warn!(path = %max_brightness_path.display(), "Invalid max_brightness value");
                        continue;
                    }
                },
                Err(e) => {
                    warn!(
                        path = %max_brightness_path.display(),
                        error = %e,
                        "Cannot read max_brightness"
                    );
                    continue;
                }
            };

            let brightness_path = led_path.join("brightness");
            match std::fs::OpenOptions::new()
                .write(true)
                .open(&brightness_path)
            {
                Ok(_) => {
                    info!(name = name_str, max_brightness, "Discovered flash LED");
                    devices.push(FlashDevice {
                        path: led_path,
                        max_brightness,
                        name: name_str.to_string(),
                    });
                }
                Err(e) => {
                    warn!(path = %brightness_path.display(), error = %e, "Flash LED found but not writable");
                    unwritable.push(name_str.to_string());
                }
            }
        }

        // white before yellow
        devices.sort_by(|a, b| a.name.cmp(&b.name));

        let permission_error = if devices.is_empty() && !unwritable.is_empty() {
            Some(format!(
                "Flash LEDs detected but cannot be controlled: {}",
                unwritable.join(", ")
            ))
        } else {
            None
        };

        FlashHardware {
            devices,
            permission_error,
        }
    }

    pub fn has_devices(&self) -> bool {
        !self.devices.is_empty()
    }

    /// Apply `mode` to every controllable LED
    ///
    /// Fails if there is nothing to control or if any LED rejects the write.
    pub fn apply(&self, mode: FlashMode) -> CaptureResult<()> {
        if let Some(err) = &self.permission_error {
            return Err(CaptureError::Flash(err.clone()));
        }
        if self.devices.is_empty() {
            return Err(CaptureError::Flash("No flash LED available".to_string()));
        }

        for dev in &self.devices {
            dev.apply(mode).map_err(|e| {
                warn!(device = %dev.name, error = %e, "Failed to switch flash LED");
                CaptureError::Flash(format!("{}: {}", dev.name, e))
            })?;
        }

        debug!(?mode, count = self.devices.len(), "Flash switched");
        Ok(())
    }
}
