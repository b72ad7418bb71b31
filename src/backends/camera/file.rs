// SPDX-License-Identifier: GPL-3.0-only

//! Still-image file backend
//!
//! Serves a JPEG file from disk as the camera's still frames, with either
//! backend's delivery style, and drives real flash LEDs through sysfs.
//! Used by the command line front end and for exercising the pipeline
//! without camera hardware.

use super::types::{AcquiredImage, BackendKind, EncodedFrame, FrameCallback, RawFrame};
use super::{CameraDevice, CameraSession, VideoCapturer};
use crate::errors::{CaptureError, CaptureResult};
use crate::flash::{FlashHardware, FlashMode, SYSFS_LEDS_DIR};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// Device reading still frames from a file
#[derive(Debug, Clone)]
pub struct FileDevice {
    path: PathBuf,
    backend: BackendKind,
    leds_dir: PathBuf,
}

impl FileDevice {
    pub fn new(path: impl Into<PathBuf>, backend: BackendKind) -> Self {
        Self {
            path: path.into(),
            backend,
            leds_dir: PathBuf::from(SYSFS_LEDS_DIR),
        }
    }

    /// Look for flash LEDs somewhere other than `/sys/class/leds`
    pub fn with_leds_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.leds_dir = dir.into();
        self
    }
}

impl CameraDevice for FileDevice {
    fn capture_still(&self, on_frame: FrameCallback) -> CaptureResult<()> {
        let data = std::fs::read(&self.path).map_err(|e| {
            CaptureError::Io(format!("Failed to read {}: {}", self.path.display(), e))
        })?;
        debug!(path = %self.path.display(), bytes = data.len(), "Still frame read");

        let backend = self.backend;
        std::thread::Builder::new()
            .name("still-capture".to_string())
            .spawn(move || {
                let frame: Box<dyn RawFrame> = match backend {
                    BackendKind::Legacy => Box::new(EncodedFrame::new(data)),
                    BackendKind::Camera2 => Box::new(AcquiredImage::new(data, || {
                        debug!("Image returned to reader");
                    })),
                };
                on_frame(Ok(frame));
            })?;

        Ok(())
    }

    fn set_flash_mode(&self, mode: FlashMode) -> CaptureResult<()> {
        FlashHardware::detect_in(&self.leds_dir).apply(mode)
    }

    fn resume_preview(&self) {
        debug!("Preview resumed");
    }
}

/// Session around a [`FileDevice`]
#[derive(Debug, Clone)]
pub struct FileSession {
    device: Option<Arc<FileDevice>>,
    backend: BackendKind,
    orientation: Option<i32>,
}

impl FileSession {
    pub fn new(device: FileDevice) -> Self {
        Self {
            backend: device.backend,
            device: Some(Arc::new(device)),
            orientation: Some(0),
        }
    }

    /// Session whose backend exposes neither device nor orientation
    pub fn closed(backend: BackendKind) -> Self {
        Self {
            device: None,
            backend,
            orientation: None,
        }
    }

    /// Report a sensor orientation, `None` to report it as unavailable
    pub fn with_orientation(mut self, degrees: Option<i32>) -> Self {
        self.orientation = degrees;
        self
    }
}

impl CameraSession for FileSession {
    fn backend_kind(&self) -> BackendKind {
        self.backend
    }

    fn current_device_handle(&self) -> CaptureResult<Arc<dyn CameraDevice>> {
        match &self.device {
            Some(device) => Ok(device.clone()),
            None => Err(CaptureError::SessionUnavailable(
                "Could not get camera instance".to_string(),
            )),
        }
    }

    fn frame_orientation_degrees(&self) -> CaptureResult<i32> {
        self.orientation.ok_or_else(|| {
            CaptureError::SessionUnavailable("Frame orientation not exposed".to_string())
        })
    }
}

/// Capturer that is always running its file session
#[derive(Clone)]
pub struct FileCapturer {
    session: Arc<dyn CameraSession>,
}

impl FileCapturer {
    pub fn new(session: FileSession) -> Self {
        info!(backend = %session.backend, "File capturer started");
        Self {
            session: Arc::new(session),
        }
    }
}

impl VideoCapturer for FileCapturer {
    fn current_session(&self) -> Option<Arc<dyn CameraSession>> {
        Some(self.session.clone())
    }
}
