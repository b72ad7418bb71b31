// SPDX-License-Identifier: GPL-3.0-only

//! Session adapter
//!
//! The adapter is bound to the session a capturer was running when it was
//! created. Capture and flash requests only go through while that session's
//! backend is the one the [`BackendSelector`] reports as active; otherwise
//! they are dropped without invoking either callback.

use super::types::{BackendKind, BackendSelector, RawFrame};
use super::{CameraDevice, CameraSession, VideoCapturer};
use crate::config::{CaptureOptions, FlashOptions};
use crate::constants::messages;
use crate::errors::{CaptureError, CaptureResult};
use crate::pipelines::photo::orientation::session_degrees;
use crate::pipelines::photo::{CaptureHandle, CapturePipeline, CaptureRequest, PendingCapture, ResultSink};
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info};

/// Routes host requests to the active camera session
pub struct SessionAdapter {
    session: Arc<dyn CameraSession>,
    selector: BackendSelector,
    pipeline: CapturePipeline,
}

impl SessionAdapter {
    /// Bind to the capturer's current session
    pub fn new(
        capturer: &dyn VideoCapturer,
        selector: BackendSelector,
        pipeline: CapturePipeline,
    ) -> CaptureResult<Self> {
        let session = capturer.current_session().ok_or_else(|| {
            error!("Could not get camera session instance");
            CaptureError::SessionUnavailable(messages::SESSION_UNAVAILABLE.to_string())
        })?;

        info!(backend = %session.backend_kind(), "Bound to camera session");

        Ok(Self {
            session,
            selector,
            pipeline,
        })
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.session.backend_kind()
    }

    pub fn current_device_handle(&self) -> CaptureResult<Arc<dyn CameraDevice>> {
        self.session.current_device_handle()
    }

    pub fn frame_orientation_degrees(&self) -> CaptureResult<i32> {
        self.session.frame_orientation_degrees()
    }

    fn is_active(&self) -> bool {
        self.selector.current() == self.backend_kind()
    }

    /// Capture one photo
    ///
    /// Returns `None`, and invokes neither callback, when the bound backend
    /// is not the active one. Otherwise the returned handle resolves after
    /// exactly one callback has run.
    pub fn capture_photo(&self, options: CaptureOptions, sink: ResultSink) -> Option<CaptureHandle> {
        let backend = self.backend_kind();
        if !self.is_active() {
            debug!(%backend, active = %self.selector.current(), "Ignoring capture for inactive backend");
            return None;
        }

        let pending = self.pipeline.begin(CaptureRequest::new(options, sink), backend);
        let handle = pending.handle();

        if let Err(e) = pending.request().validate() {
            pending.fail(e.to_string());
            return Some(handle);
        }

        let device = match self.current_device_handle() {
            Ok(device) => device,
            Err(e) => {
                debug!(error = %e, "Error getting camera instance for stream");
                pending.fail(messages::DEVICE_UNAVAILABLE);
                return Some(handle);
            }
        };

        let degrees = session_degrees(self.session.as_ref());
        debug!(degrees, "Frame orientation");

        // Whichever of the callback and the error path runs first reports
        let slot = Arc::new(Mutex::new(Some(pending)));
        let frame_slot = slot.clone();
        let frame_device = device.clone();

        let accepted = device.capture_still(Box::new(
            move |frame: CaptureResult<Box<dyn RawFrame>>| {
                if backend.restarts_preview() {
                    frame_device.resume_preview();
                }
                let Some(pending) = take_pending(&frame_slot) else {
                    return;
                };
                match frame {
                    Ok(frame) => pending.on_frame_available(frame, degrees),
                    Err(e) => {
                        error!(error = %e, "Still capture failed");
                        pending.fail(e.to_string());
                    }
                }
            },
        ));

        if let Err(e) = accepted {
            error!(error = %e, "Still capture request rejected");
            if let Some(pending) = take_pending(&slot) {
                pending.fail(e.to_string());
            }
        }

        Some(handle)
    }

    /// Switch the flash between off and torch
    ///
    /// Like [`capture_photo`](Self::capture_photo), does nothing at all when
    /// the bound backend is not the active one.
    pub fn switch_flash(&self, options: FlashOptions, sink: ResultSink) {
        if !self.is_active() {
            debug!(
                backend = %self.backend_kind(),
                active = %self.selector.current(),
                "Ignoring flash switch for inactive backend"
            );
            return;
        }

        let device = match self.current_device_handle() {
            Ok(device) => device,
            Err(e) => {
                debug!(error = %e, "Error getting camera instance for stream");
                sink.fail(messages::DEVICE_UNAVAILABLE.to_string());
                return;
            }
        };

        match device.set_flash_mode(options.flash_mode) {
            Ok(()) => {
                info!(mode = ?options.flash_mode, "Flash switched");
                sink.succeed(messages::FLASH_SWITCHED.to_string());
            }
            Err(e) => {
                error!(error = %e, "Error switching flash");
                sink.fail(e.to_string());
            }
        }
    }
}

fn take_pending(slot: &Mutex<Option<PendingCapture>>) -> Option<PendingCapture> {
    slot.lock().unwrap_or_else(|e| e.into_inner()).take()
}
