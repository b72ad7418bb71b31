// SPDX-License-Identifier: GPL-3.0-only

//! A single capture in flight
//!
//! ```text
//! Capturing ──frame──▶ Saving ──file written──▶ Done
//!     │                                          ▲
//!     └──────── memory target / failure ─────────┘
//! ```
//!
//! A [`PendingCapture`] is created when a frame is requested and consumed
//! when the outcome is reported. If it is dropped before that, because the
//! device never delivered a frame or the runtime went away before the save
//! ran, the capture is reported as failed, so every capture reports exactly
//! once.
//!
//! In-memory captures are returned as standard base64 without line breaks,
//! unlike the 76-column wrapped form Android's default encoder produces.

use super::PipelineShared;
use super::request::{CaptureRequest, ResultSink};
use super::transform::ImageTransformer;
use crate::backends::camera::{BackendKind, RawFrame};
use crate::config::CaptureTarget;
use crate::constants::messages;
use crate::errors::CaptureError;
use crate::storage::file_uri;
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// Progress of one capture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapturePhase {
    /// Frame requested, not yet delivered
    Capturing,
    /// Transform and write running in the background
    Saving,
    /// Outcome reported through the result sink
    Done,
}

/// Observes a capture until its outcome has been reported
#[derive(Debug, Clone)]
pub struct CaptureHandle {
    phase: watch::Receiver<CapturePhase>,
}

impl CaptureHandle {
    pub fn phase(&self) -> CapturePhase {
        *self.phase.borrow()
    }

    /// Resolves once the result sink has been invoked
    pub async fn finished(mut self) {
        let _ = self.phase.wait_for(|p| *p == CapturePhase::Done).await;
    }
}

/// Counts a capture as in flight until dropped
struct InFlight(Arc<PipelineShared>);

impl InFlight {
    fn new(shared: Arc<PipelineShared>) -> Self {
        shared.in_flight.fetch_add(1, Ordering::SeqCst);
        Self(shared)
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Reports the outcome of one capture
///
/// Dropping it unreported fails the capture.
struct Reporter {
    sink: Option<ResultSink>,
    phase: watch::Sender<CapturePhase>,
    in_flight: Option<InFlight>,
}

impl Reporter {
    fn set_phase(&self, phase: CapturePhase) {
        self.phase.send_replace(phase);
    }

    fn report(mut self, outcome: Result<String, String>) {
        self.finish(outcome);
    }

    fn finish(&mut self, outcome: Result<String, String>) {
        let Some(sink) = self.sink.take() else {
            return;
        };
        match outcome {
            Ok(payload) => {
                info!(bytes = payload.len(), "Capture succeeded");
                sink.succeed(payload);
            }
            Err(message) => {
                info!(message = %message, "Capture failed");
                sink.fail(message);
            }
        }
        self.in_flight.take();
        self.phase.send_replace(CapturePhase::Done);
    }
}

impl Drop for Reporter {
    fn drop(&mut self) {
        if self.sink.is_some() {
            let phase = *self.phase.borrow();
            warn!(?phase, "Capture dropped without a result");
            self.finish(Err(messages::CAPTURE_ABANDONED.to_string()));
        }
    }
}

/// A requested capture waiting for its frame
pub struct PendingCapture {
    request: CaptureRequest,
    backend: BackendKind,
    shared: Arc<PipelineShared>,
    reporter: Reporter,
}

impl PendingCapture {
    pub(super) fn new(
        mut request: CaptureRequest,
        backend: BackendKind,
        shared: Arc<PipelineShared>,
    ) -> Self {
        let (phase, _) = watch::channel(CapturePhase::Capturing);
        let reporter = Reporter {
            sink: request.take_sink(),
            phase,
            in_flight: Some(InFlight::new(shared.clone())),
        };
        Self {
            request,
            backend,
            shared,
            reporter,
        }
    }

    pub fn handle(&self) -> CaptureHandle {
        CaptureHandle {
            phase: self.reporter.phase.subscribe(),
        }
    }

    pub fn request(&self) -> &CaptureRequest {
        &self.request
    }

    /// Report a failure without a frame
    pub fn fail(self, message: impl Into<String>) {
        self.reporter.report(Err(message.into()));
    }

    /// Handle a delivered frame
    ///
    /// Called on the thread that delivered the frame. The frame's bytes are
    /// copied and the frame released before anything else happens. In-memory
    /// captures are answered right here; file captures are handed to the
    /// pipeline's blocking pool and serialized by the save lock.
    pub fn on_frame_available(self, frame: Box<dyn RawFrame>, degrees: i32) {
        let bytes = frame.bytes().to_vec();
        let age = frame.captured_at().elapsed();
        drop(frame);
        debug!(bytes = bytes.len(), ?age, "Frame copied and released");

        let PendingCapture {
            request,
            backend,
            shared,
            reporter,
        } = self;

        if bytes.is_empty() {
            error!("Captured frame is empty");
            let message = backend.save_failure_message(&CaptureError::DecodeOrEncodeFailed(
                "captured frame is empty".to_string(),
            ));
            reporter.report(Err(message));
            return;
        }

        let target = request.destination();
        if target == CaptureTarget::Memory {
            reporter.report(Ok(BASE64.encode(&bytes)));
            return;
        }

        reporter.set_phase(CapturePhase::Saving);
        let transformer =
            ImageTransformer::new(request.max_output_dimension(), request.jpeg_quality());

        // Dropped unrun if the runtime is shutting down; the reporter then
        // fails the capture.
        shared.runtime.clone().spawn_blocking(move || {
            let saved = std::panic::catch_unwind(AssertUnwindSafe(|| {
                shared.save_picture(&bytes, target, &transformer, degrees)
            }));

            let outcome = match saved {
                Ok(Ok(path)) => Ok(file_uri(&path)),
                Ok(Err(e)) => {
                    error!(error = %e, target = ?target, "Error saving picture");
                    Err(backend.save_failure_message(&e))
                }
                Err(_) => {
                    error!(target = ?target, "Save task panicked");
                    Err(backend.save_failure_message(&CaptureError::Io(
                        "save task panicked".to_string(),
                    )))
                }
            };

            reporter.report(outcome);
        });
    }
}

