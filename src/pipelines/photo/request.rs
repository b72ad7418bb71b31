// SPDX-License-Identifier: GPL-3.0-only

//! Capture requests and their result callbacks

use crate::config::{CaptureOptions, CaptureTarget};
use crate::errors::CaptureResult;
use futures::channel::oneshot;
use std::sync::{Arc, Mutex};

type Callback = Box<dyn FnOnce(String) + Send>;

/// Success/failure callback pair handed in by the host
///
/// Both `succeed` and `fail` consume the sink, so at most one callback can
/// ever run. Dropping the sink runs neither.
pub struct ResultSink {
    on_success: Callback,
    on_failure: Callback,
}

impl ResultSink {
    pub fn new(
        on_success: impl FnOnce(String) + Send + 'static,
        on_failure: impl FnOnce(String) + Send + 'static,
    ) -> Self {
        Self {
            on_success: Box::new(on_success),
            on_failure: Box::new(on_failure),
        }
    }

    /// Sink that forwards the outcome to a oneshot channel
    ///
    /// The receiver resolves to `Ok(payload)` or `Err(message)`, and is
    /// cancelled if the sink is dropped without being invoked.
    pub fn channel() -> (Self, oneshot::Receiver<Result<String, String>>) {
        let (tx, rx) = oneshot::channel();
        let tx = Arc::new(Mutex::new(Some(tx)));
        let tx_failure = tx.clone();

        let sink = Self::new(
            move |payload| send_once(&tx, Ok(payload)),
            move |message| send_once(&tx_failure, Err(message)),
        );
        (sink, rx)
    }

    pub fn succeed(self, payload: String) {
        (self.on_success)(payload)
    }

    pub fn fail(self, message: String) {
        (self.on_failure)(message)
    }
}

fn send_once(
    slot: &Mutex<Option<oneshot::Sender<Result<String, String>>>>,
    outcome: Result<String, String>,
) {
    let sender = slot.lock().ok().and_then(|mut guard| guard.take());
    if let Some(sender) = sender {
        // Receiver may be gone; nobody is waiting then
        let _ = sender.send(outcome);
    }
}

impl std::fmt::Debug for ResultSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ResultSink")
    }
}

/// One photo capture, immutable once built
#[derive(Debug)]
pub struct CaptureRequest {
    max_output_dimension: u32,
    jpeg_quality: f64,
    destination: CaptureTarget,
    sink: Option<ResultSink>,
}

impl CaptureRequest {
    pub fn new(options: CaptureOptions, sink: ResultSink) -> Self {
        Self {
            max_output_dimension: options.max_size,
            jpeg_quality: options.max_jpeg_quality,
            destination: options.capture_target,
            sink: Some(sink),
        }
    }

    pub fn max_output_dimension(&self) -> u32 {
        self.max_output_dimension
    }

    pub fn jpeg_quality(&self) -> f64 {
        self.jpeg_quality
    }

    pub fn destination(&self) -> CaptureTarget {
        self.destination
    }

    pub fn validate(&self) -> CaptureResult<()> {
        CaptureOptions {
            max_jpeg_quality: self.jpeg_quality,
            max_size: self.max_output_dimension,
            capture_target: self.destination,
        }
        .validate()
    }

    /// Move the sink out for reporting, `None` once taken
    pub(crate) fn take_sink(&mut self) -> Option<ResultSink> {
        self.sink.take()
    }
}
