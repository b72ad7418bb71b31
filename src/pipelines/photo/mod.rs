// SPDX-License-Identifier: GPL-3.0-only

//! Photo capture pipeline
//!
//! ```text
//! Frame ready → copy + release → Memory: base64 ──────────────────────────┐
//!                              └ File:   [save lock] locate → transform →  ├─▶ ResultSink
//!                                        media index (camera roll only) ──┘
//! ```
//!
//! # Pipeline Stages
//!
//! 1. **Capture**: the frame's bytes are copied and the frame is released
//!    on the thread that delivered it
//! 2. **Dispatch**: file captures move to tokio's blocking pool so the
//!    driver thread is never held up by encoding or disk I/O
//! 3. **Save**: output location, transform and media index registration run
//!    under one lock, one capture at a time
//! 4. **Report**: exactly one success or failure callback per capture
//!
//! A pipeline with nothing in flight is idle.

pub mod capture;
pub mod orientation;
pub mod request;
pub mod scaling;
pub mod transform;

pub use capture::{CaptureHandle, CapturePhase, PendingCapture};
pub use orientation::{OrientationHint, Rotation};
pub use request::{CaptureRequest, ResultSink};
pub use transform::ImageTransformer;

use crate::backends::camera::BackendKind;
use crate::config::CaptureTarget;
use crate::errors::CaptureResult;
use crate::storage::{MediaIndex, OutputLocator};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// State shared between the pipeline and its background saves
pub(crate) struct PipelineShared {
    runtime: tokio::runtime::Handle,
    locator: OutputLocator,
    media_index: Arc<dyn MediaIndex>,
    save_lock: Mutex<()>,
    in_flight: AtomicUsize,
}

impl PipelineShared {
    fn save_picture(
        &self,
        raw: &[u8],
        target: CaptureTarget,
        transformer: &ImageTransformer,
        degrees: i32,
    ) -> CaptureResult<PathBuf> {
        // A panic in an earlier save leaves nothing half-shared behind the
        // lock, so a poisoned lock is still usable.
        let _guard = self.save_lock.lock().unwrap_or_else(|e| e.into_inner());

        let destination = self.locator.locate(target)?;
        info!(path = %destination.display(), target = ?target, "Saving photo");

        let path = transformer.transform(raw, &destination, degrees)?;

        if target == CaptureTarget::CameraRoll {
            self.media_index.register(&path);
        }

        Ok(path)
    }
}

/// Capture-to-file pipeline
///
/// Cheap to clone; clones share the save lock and the blocking pool.
#[derive(Clone)]
pub struct CapturePipeline {
    shared: Arc<PipelineShared>,
}

impl CapturePipeline {
    /// Create a pipeline that runs saves on `runtime`'s blocking pool
    pub fn new(
        runtime: tokio::runtime::Handle,
        locator: OutputLocator,
        media_index: Arc<dyn MediaIndex>,
    ) -> Self {
        Self {
            shared: Arc::new(PipelineShared {
                runtime,
                locator,
                media_index,
                save_lock: Mutex::new(()),
                in_flight: AtomicUsize::new(0),
            }),
        }
    }

    /// Start tracking a capture whose frame is about to be requested
    pub fn begin(&self, request: CaptureRequest, backend: BackendKind) -> PendingCapture {
        debug!(
            target = ?request.destination(),
            max_size = request.max_output_dimension(),
            quality = request.jpeg_quality(),
            %backend,
            "Capture requested"
        );
        PendingCapture::new(request, backend, self.shared.clone())
    }

    /// Write, transform and (for the camera roll) register one photo
    ///
    /// Blocks while another save is running. This is what the background
    /// task of a file capture runs.
    pub fn save_picture(
        &self,
        raw: &[u8],
        target: CaptureTarget,
        transformer: &ImageTransformer,
        degrees: i32,
    ) -> CaptureResult<PathBuf> {
        self.shared.save_picture(raw, target, transformer, degrees)
    }

    /// Captures requested but not yet reported
    pub fn in_flight(&self) -> usize {
        self.shared.in_flight.load(Ordering::SeqCst)
    }

    pub fn is_idle(&self) -> bool {
        self.in_flight() == 0
    }
}
