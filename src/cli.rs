// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands
//!
//! Both commands drive the library through the same [`SessionAdapter`] a
//! host bridge would use, backed by the still-image file backend.

use photo_capture::backends::camera::file::{FileCapturer, FileDevice, FileSession};
use photo_capture::storage::TrackerMediaIndex;
use photo_capture::{
    BackendKind, BackendSelector, CaptureOptions, CapturePipeline, CaptureTarget, FlashMode,
    FlashOptions, OutputLocator, ResultSink, SessionAdapter, StorageConfig,
};
use std::path::PathBuf;
use std::sync::Arc;

/// Arguments of the `capture` command
pub struct PhotoArgs {
    pub input: PathBuf,
    pub target: CaptureTarget,
    pub max_size: u32,
    pub quality: f64,
    pub orientation: i32,
    pub backend: BackendKind,
    pub output_dir: Option<PathBuf>,
}

/// Take a photo and print the success payload
pub fn take_photo(args: PhotoArgs) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Runtime::new()?;

    let storage = match &args.output_dir {
        Some(dir) => StorageConfig::under(dir),
        None => StorageConfig::default(),
    };
    let pipeline = CapturePipeline::new(
        runtime.handle().clone(),
        OutputLocator::new(storage),
        Arc::new(TrackerMediaIndex),
    );

    let session = FileSession::new(FileDevice::new(&args.input, args.backend))
        .with_orientation(Some(args.orientation));
    let capturer = FileCapturer::new(session);
    let adapter = SessionAdapter::new(&capturer, BackendSelector::new(args.backend), pipeline)?;

    let options = CaptureOptions {
        max_jpeg_quality: args.quality,
        max_size: args.max_size,
        capture_target: args.target,
    };

    let (sink, result) = ResultSink::channel();
    adapter.capture_photo(options, sink);

    match runtime.block_on(result) {
        Ok(Ok(payload)) => {
            println!("{}", payload);
            Ok(())
        }
        Ok(Err(message)) => Err(message.into()),
        Err(_) => Err("capture was dropped without a result".into()),
    }
}

/// Switch the flash LED through the file backend
pub fn switch_flash(mode: i64, leds_dir: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    // The still frame is never read for a flash switch
    let mut device = FileDevice::new(PathBuf::new(), BackendKind::Legacy);
    if let Some(dir) = leds_dir {
        device = device.with_leds_dir(dir);
    }
    let capturer = FileCapturer::new(FileSession::new(device));

    let runtime = tokio::runtime::Runtime::new()?;
    let pipeline = CapturePipeline::new(
        runtime.handle().clone(),
        OutputLocator::new(StorageConfig::default()),
        Arc::new(TrackerMediaIndex),
    );
    let adapter = SessionAdapter::new(
        &capturer,
        BackendSelector::new(BackendKind::Legacy),
        pipeline,
    )?;

    let (sink, result) = ResultSink::channel();
    adapter.switch_flash(
        FlashOptions {
            flash_mode: FlashMode::from(mode),
        },
        sink,
    );

    match futures::executor::block_on(result) {
        Ok(Ok(message)) => {
            println!("{}", message);
            Ok(())
        }
        Ok(Err(message)) => Err(message.into()),
        Err(_) => Err("flash switch was dropped without a result".into()),
    }
}
