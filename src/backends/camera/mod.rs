// SPDX-License-Identifier: GPL-3.0-only

//! Camera backend abstraction
//!
//! Capture backends expose their live session and device through explicit
//! capability traits. The [`SessionAdapter`] binds to the session of a
//! capturer and routes capture and flash requests to it.
//!
//! ```text
//! ┌─────────────────────┐
//! │    Host bridge      │
//! └──────────┬──────────┘
//!            │ capture_photo / switch_flash
//!            ▼
//! ┌─────────────────────┐
//! │   SessionAdapter    │  ← no-op unless its backend is the active one
//! └──────────┬──────────┘
//!            │
//!            ▼
//! ┌─────────────────────┐
//! │ CameraSession Trait │  ← device handle, frame orientation
//! └──────────┬──────────┘
//!            │
//!            ▼
//! ┌─────────────────────┐
//! │ CameraDevice Trait  │  ← still capture, flash
//! └─────────────────────┘
//! ```

pub mod adapter;
pub mod file;
pub mod types;

pub use adapter::SessionAdapter;
pub use types::*;

use crate::errors::CaptureResult;
use crate::flash::FlashMode;
use std::sync::Arc;

/// Handle to the camera device behind an active session
pub trait CameraDevice: Send + Sync {
    /// Take one still picture
    ///
    /// Returns once the request has been accepted. The frame, or a late
    /// failure, is delivered to `on_frame` on a driver-owned thread.
    fn capture_still(&self, on_frame: FrameCallback) -> CaptureResult<()>;

    /// Switch the flash LED
    fn set_flash_mode(&self, mode: FlashMode) -> CaptureResult<()>;

    /// Restart the preview stream after a still capture stopped it
    fn resume_preview(&self) {}
}

/// An active camera session of one capture backend
pub trait CameraSession: Send + Sync {
    /// Backend this session belongs to
    fn backend_kind(&self) -> BackendKind;

    /// The device the session is currently streaming from
    ///
    /// Fails with `SessionUnavailable` if the backend does not expose it.
    fn current_device_handle(&self) -> CaptureResult<Arc<dyn CameraDevice>>;

    /// Clockwise rotation of the sensor image relative to upright
    ///
    /// Fails with `SessionUnavailable` if the backend does not expose it.
    fn frame_orientation_degrees(&self) -> CaptureResult<i32>;
}

/// A video capturer that may be running a camera session
pub trait VideoCapturer: Send + Sync {
    fn current_session(&self) -> Option<Arc<dyn CameraSession>>;
}
