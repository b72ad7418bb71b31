// SPDX-License-Identifier: GPL-3.0-only

//! Photo Capture - still photos from a live camera session
//!
//! This library takes a still picture from whichever capture backend is
//! running, then either hands it back as base64 text or writes it to disk
//! as an upright, size-bounded JPEG.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`backends`]: capture backend traits and the session adapter
//! - [`pipelines`]: the capture-to-file pipeline
//! - [`storage`]: output locations and media index registration
//! - [`config`]: capture options and storage directories
//! - [`flash`]: flash LED control
//!
//! # Example
//!
//! ```ignore
//! let pipeline = CapturePipeline::new(runtime.handle().clone(), locator, media_index);
//! let adapter = SessionAdapter::new(&capturer, selector, pipeline)?;
//! let (sink, result) = ResultSink::channel();
//! adapter.capture_photo(CaptureOptions::default(), sink);
//! ```

pub mod backends;
pub mod config;
pub mod constants;
pub mod errors;
pub mod flash;
pub mod pipelines;
pub mod storage;

// Re-export commonly used types
pub use backends::camera::{BackendKind, BackendSelector, SessionAdapter};
pub use config::{CaptureOptions, CaptureTarget, FlashOptions, StorageConfig};
pub use errors::{CaptureError, CaptureResult};
pub use flash::FlashMode;
pub use pipelines::photo::{CaptureHandle, CapturePhase, CapturePipeline, ResultSink};
pub use storage::{MediaIndex, OutputLocator};
