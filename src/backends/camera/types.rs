// SPDX-License-Identifier: GPL-3.0-only
// Shared types for camera backend abstraction

//! Shared types for camera backends

use crate::constants::messages;
use crate::errors::{CaptureError, CaptureResult};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};
use std::time::Instant;
use tracing::debug;

/// Capture backend type
///
/// The two backends are mutually exclusive at runtime and deliver frames
/// differently: the legacy backend hands over finished JPEG bytes through a
/// picture callback, Camera2 hands over an image buffer borrowed from a
/// fixed-size pool that must be returned as soon as possible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Camera1-style picture callback
    Legacy,
    /// Camera2-style image reader
    #[default]
    Camera2,
}

impl BackendKind {
    /// Message reported when saving a picture fails
    pub fn save_failure_message(&self, err: &CaptureError) -> String {
        match self {
            BackendKind::Legacy => messages::SAVE_FAILED.to_string(),
            BackendKind::Camera2 => err.to_string(),
        }
    }

    /// Whether preview has to be restarted after a still capture
    pub fn restarts_preview(&self) -> bool {
        matches!(self, BackendKind::Legacy)
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::Legacy => write!(f, "legacy"),
            BackendKind::Camera2 => write!(f, "camera2"),
        }
    }
}

impl std::str::FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "legacy" | "camera1" => Ok(BackendKind::Legacy),
            "camera2" => Ok(BackendKind::Camera2),
            _ => Err(format!("unknown backend {:?}", s)),
        }
    }
}

/// One hardware-delivered encoded image
///
/// The underlying buffer is held until the frame is dropped.
pub trait RawFrame: Send {
    /// Encoded (JPEG) bytes
    fn bytes(&self) -> &[u8];

    /// When the frame was acquired
    fn captured_at(&self) -> Instant;
}

/// Frame that owns its bytes outright, as delivered by a picture callback
#[derive(Debug, Clone)]
pub struct EncodedFrame {
    data: Vec<u8>,
    captured_at: Instant,
}

impl EncodedFrame {
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            captured_at: Instant::now(),
        }
    }
}

impl RawFrame for EncodedFrame {
    fn bytes(&self) -> &[u8] {
        &self.data
    }

    fn captured_at(&self) -> Instant {
        self.captured_at
    }
}

/// Frame borrowed from an image reader pool
///
/// Runs its release hook when dropped, returning the buffer to the pool.
pub struct AcquiredImage {
    data: Vec<u8>,
    captured_at: Instant,
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl AcquiredImage {
    pub fn new(data: Vec<u8>, release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            data,
            captured_at: Instant::now(),
            release: Some(Box::new(release)),
        }
    }
}

impl RawFrame for AcquiredImage {
    fn bytes(&self) -> &[u8] {
        &self.data
    }

    fn captured_at(&self) -> Instant {
        self.captured_at
    }
}

impl Drop for AcquiredImage {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            debug!(bytes = self.data.len(), "Releasing image buffer");
            release();
        }
    }
}

impl std::fmt::Debug for AcquiredImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AcquiredImage({} bytes)", self.data.len())
    }
}

/// Receives the result of a still capture, on the driver's thread
pub type FrameCallback = Box<dyn FnOnce(CaptureResult<Box<dyn RawFrame>>) + Send>;

/// Shared record of which backend the capturer currently runs
///
/// Cloning shares the underlying value.
#[derive(Debug, Clone, Default)]
pub struct BackendSelector {
    current: Arc<RwLock<BackendKind>>,
}

impl BackendSelector {
    pub fn new(kind: BackendKind) -> Self {
        Self {
            current: Arc::new(RwLock::new(kind)),
        }
    }

    pub fn current(&self) -> BackendKind {
        *self.current.read().unwrap_or_else(|e| e.into_inner())
    }

    pub fn set(&self, kind: BackendKind) {
        *self.current.write().unwrap_or_else(|e| e.into_inner()) = kind;
    }
}
