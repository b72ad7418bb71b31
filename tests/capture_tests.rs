// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for capture through the session adapter

use base64::Engine as _;
use image::GenericImageView;
use photo_capture::backends::camera::{
    AcquiredImage, CameraDevice, CameraSession, FrameCallback, RawFrame, VideoCapturer,
};
use photo_capture::{
    BackendKind, BackendSelector, CaptureError, CaptureOptions, CapturePhase, CapturePipeline,
    CaptureResult, CaptureTarget, FlashMode, FlashOptions, MediaIndex, OutputLocator, ResultSink,
    SessionAdapter, StorageConfig,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let image = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    });
    let mut buffer = Vec::new();
    image::DynamicImage::ImageRgb8(image)
        .write_to(&mut std::io::Cursor::new(&mut buffer), image::ImageFormat::Jpeg)
        .unwrap();
    buffer
}

/// Device delivering a fixed frame from its own thread
#[derive(Default)]
struct FakeDevice {
    frame: Vec<u8>,
    released: Arc<AtomicBool>,
    captures: AtomicUsize,
    preview_restarts: AtomicUsize,
    flash: Mutex<Vec<FlashMode>>,
    flash_fails: bool,
    drops_callback: bool,
}

impl FakeDevice {
    fn with_frame(frame: Vec<u8>) -> Self {
        Self {
            frame,
            ..Self::default()
        }
    }
}

impl CameraDevice for FakeDevice {
    fn capture_still(&self, on_frame: FrameCallback) -> CaptureResult<()> {
        self.captures.fetch_add(1, Ordering::SeqCst);
        if self.drops_callback {
            drop(on_frame);
            return Ok(());
        }
        let data = self.frame.clone();
        let released = self.released.clone();
        std::thread::spawn(move || {
            let frame: Box<dyn RawFrame> = Box::new(AcquiredImage::new(data, move || {
                released.store(true, Ordering::SeqCst)
            }));
            on_frame(Ok(frame));
        });
        Ok(())
    }

    fn set_flash_mode(&self, mode: FlashMode) -> CaptureResult<()> {
        if self.flash_fails {
            return Err(CaptureError::Flash("torch unavailable".to_string()));
        }
        self.flash.lock().unwrap().push(mode);
        Ok(())
    }

    fn resume_preview(&self) {
        self.preview_restarts.fetch_add(1, Ordering::SeqCst);
    }
}

struct FakeSession {
    kind: BackendKind,
    device: Option<Arc<FakeDevice>>,
    orientation: Option<i32>,
}

impl CameraSession for FakeSession {
    fn backend_kind(&self) -> BackendKind {
        self.kind
    }

    fn current_device_handle(&self) -> CaptureResult<Arc<dyn CameraDevice>> {
        match &self.device {
            Some(device) => Ok(device.clone()),
            None => Err(CaptureError::SessionUnavailable("no camera".to_string())),
        }
    }

    fn frame_orientation_degrees(&self) -> CaptureResult<i32> {
        self.orientation
            .ok_or_else(|| CaptureError::SessionUnavailable("no orientation".to_string()))
    }
}

struct FakeCapturer(Option<Arc<dyn CameraSession>>);

impl VideoCapturer for FakeCapturer {
    fn current_session(&self) -> Option<Arc<dyn CameraSession>> {
        self.0.clone()
    }
}

/// Media index remembering registrations and whether the frame was released by then
#[derive(Default)]
struct RecordingIndex {
    registered: Mutex<Vec<PathBuf>>,
    frame_released: Mutex<Vec<bool>>,
    released_flag: Mutex<Option<Arc<AtomicBool>>>,
}

impl MediaIndex for RecordingIndex {
    fn register(&self, path: &Path) {
        assert!(image::open(path).is_ok(), "registered before fully written");
        self.registered.lock().unwrap().push(path.to_path_buf());
        if let Some(flag) = self.released_flag.lock().unwrap().as_ref() {
            self.frame_released
                .lock()
                .unwrap()
                .push(flag.load(Ordering::SeqCst));
        }
    }
}

struct Fixture {
    root: tempfile::TempDir,
    device: Arc<FakeDevice>,
    index: Arc<RecordingIndex>,
    selector: BackendSelector,
    pipeline: CapturePipeline,
    adapter: SessionAdapter,
}

fn fixture(kind: BackendKind, device: FakeDevice, orientation: Option<i32>) -> Fixture {
    let root = tempfile::tempdir().unwrap();
    let device = Arc::new(device);
    let index = Arc::new(RecordingIndex::default());
    *index.released_flag.lock().unwrap() = Some(device.released.clone());

    let pipeline = CapturePipeline::new(
        tokio::runtime::Handle::current(),
        OutputLocator::new(StorageConfig::under(root.path())),
        index.clone(),
    );
    let session: Arc<dyn CameraSession> = Arc::new(FakeSession {
        kind,
        device: Some(device.clone()),
        orientation,
    });
    let selector = BackendSelector::new(kind);
    let adapter =
        SessionAdapter::new(&FakeCapturer(Some(session)), selector.clone(), pipeline.clone())
            .unwrap();

    Fixture {
        root,
        device,
        index,
        selector,
        pipeline,
        adapter,
    }
}

fn options(target: CaptureTarget) -> CaptureOptions {
    CaptureOptions {
        capture_target: target,
        ..CaptureOptions::default()
    }
}

fn uri_path(uri: &str) -> PathBuf {
    PathBuf::from(uri.strip_prefix("file://").expect("file URI"))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_camera_roll_capture_writes_and_registers_once() {
    let f = fixture(BackendKind::Camera2, FakeDevice::with_frame(jpeg_bytes(300, 200)), Some(0));

    let (sink, rx) = ResultSink::channel();
    let handle = f.adapter.capture_photo(options(CaptureTarget::CameraRoll), sink).unwrap();
    let uri = rx.await.unwrap().unwrap();
    handle.clone().finished().await;

    let path = uri_path(&uri);
    assert_eq!(path.parent().unwrap(), f.root.path().join("library"));
    assert_eq!(path.extension().unwrap(), "jpeg");
    let stem = path.file_stem().unwrap().to_str().unwrap();
    assert!(uuid::Uuid::parse_str(stem).is_ok());
    assert_eq!(image::open(&path).unwrap().dimensions(), (300, 200));

    assert_eq!(*f.index.registered.lock().unwrap(), vec![path]);
    assert_eq!(*f.index.frame_released.lock().unwrap(), vec![true]);
    assert_eq!(handle.phase(), CapturePhase::Done);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_temp_capture_is_not_registered() {
    let f = fixture(BackendKind::Camera2, FakeDevice::with_frame(jpeg_bytes(64, 64)), Some(0));

    let (sink, rx) = ResultSink::channel();
    f.adapter.capture_photo(options(CaptureTarget::Temp), sink);
    let path = uri_path(&rx.await.unwrap().unwrap());

    assert_eq!(path.parent().unwrap(), f.root.path().join("cache"));
    assert!(f.index.registered.lock().unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_memory_capture_returns_base64_without_files() {
    let raw = jpeg_bytes(48, 32);
    let f = fixture(BackendKind::Camera2, FakeDevice::with_frame(raw.clone()), Some(90));

    let (sink, rx) = ResultSink::channel();
    let handle = f.adapter.capture_photo(options(CaptureTarget::Memory), sink).unwrap();
    let payload = rx.await.unwrap().unwrap();
    handle.finished().await;

    assert!(!payload.is_empty());
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(&payload)
        .unwrap();
    assert_eq!(decoded.len(), raw.len());
    assert_eq!(std::fs::read_dir(f.root.path()).unwrap().count(), 0);
    assert!(f.device.released.load(Ordering::SeqCst));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_orientation_and_bound_applied() {
    let f = fixture(BackendKind::Camera2, FakeDevice::with_frame(jpeg_bytes(400, 200)), Some(90));

    let (sink, rx) = ResultSink::channel();
    let request = CaptureOptions {
        max_size: 200,
        capture_target: CaptureTarget::Disk,
        ..CaptureOptions::default()
    };
    f.adapter.capture_photo(request, sink);
    let path = uri_path(&rx.await.unwrap().unwrap());

    assert_eq!(path.parent().unwrap(), f.root.path().join("data"));
    assert_eq!(image::open(&path).unwrap().dimensions(), (100, 200));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_unavailable_orientation_means_no_rotation() {
    let f = fixture(BackendKind::Legacy, FakeDevice::with_frame(jpeg_bytes(120, 60)), None);

    let (sink, rx) = ResultSink::channel();
    f.adapter.capture_photo(options(CaptureTarget::Temp), sink);
    let path = uri_path(&rx.await.unwrap().unwrap());

    assert_eq!(image::open(&path).unwrap().dimensions(), (120, 60));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_legacy_backend_restarts_preview() {
    let f = fixture(BackendKind::Legacy, FakeDevice::with_frame(jpeg_bytes(16, 16)), Some(0));

    let (sink, rx) = ResultSink::channel();
    f.adapter.capture_photo(options(CaptureTarget::Temp), sink);
    rx.await.unwrap().unwrap();

    assert_eq!(f.device.preview_restarts.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_save_failure_message_depends_on_backend() {
    let legacy = fixture(BackendKind::Legacy, FakeDevice::with_frame(b"corrupt".to_vec()), Some(0));
    let (sink, rx) = ResultSink::channel();
    legacy.adapter.capture_photo(options(CaptureTarget::Temp), sink);
    assert_eq!(rx.await.unwrap(), Err("Error saving picture".to_string()));
    assert!(legacy.device.released.load(Ordering::SeqCst));

    let camera2 = fixture(BackendKind::Camera2, FakeDevice::with_frame(b"corrupt".to_vec()), Some(0));
    let (sink, rx) = ResultSink::channel();
    camera2.adapter.capture_photo(options(CaptureTarget::Temp), sink);
    let message = rx.await.unwrap().unwrap_err();
    assert!(message.starts_with("Image processing failed"), "{}", message);
    assert!(camera2.device.released.load(Ordering::SeqCst));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_directory_failure_reported_once() {
    let f = fixture(BackendKind::Camera2, FakeDevice::with_frame(jpeg_bytes(16, 16)), Some(0));
    // Occupy the cache directory's path with a file
    std::fs::write(f.root.path().join("cache"), b"x").unwrap();

    let (sink, rx) = ResultSink::channel();
    f.adapter.capture_photo(options(CaptureTarget::Temp), sink);
    let message = rx.await.unwrap().unwrap_err();
    assert!(message.starts_with("Failed to create directory"), "{}", message);
    assert!(f.device.released.load(Ordering::SeqCst));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_library_captures_are_each_valid() {
    let f = fixture(BackendKind::Camera2, FakeDevice::with_frame(jpeg_bytes(640, 480)), Some(0));

    let (sink_a, rx_a) = ResultSink::channel();
    let (sink_b, rx_b) = ResultSink::channel();
    f.adapter.capture_photo(options(CaptureTarget::CameraRoll), sink_a);
    f.adapter.capture_photo(options(CaptureTarget::CameraRoll), sink_b);

    let a = uri_path(&rx_a.await.unwrap().unwrap());
    let b = uri_path(&rx_b.await.unwrap().unwrap());
    assert_ne!(a, b);
    assert_eq!(image::open(&a).unwrap().dimensions(), (640, 480));
    assert_eq!(image::open(&b).unwrap().dimensions(), (640, 480));
    assert_eq!(f.index.registered.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn test_device_dropping_callback_still_reports() {
    let device = FakeDevice {
        drops_callback: true,
        ..FakeDevice::default()
    };
    let f = fixture(BackendKind::Camera2, device, Some(0));

    let (sink, rx) = ResultSink::channel();
    let handle = f.adapter.capture_photo(options(CaptureTarget::Temp), sink).unwrap();
    handle.clone().finished().await;

    assert_eq!(
        rx.await.unwrap(),
        Err(photo_capture::constants::messages::CAPTURE_ABANDONED.to_string())
    );
    assert_eq!(handle.phase(), CapturePhase::Done);
    assert!(f.pipeline.is_idle());
    assert_eq!(f.device.captures.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_missing_device_reports_failure() {
    let root = tempfile::tempdir().unwrap();
    let pipeline = CapturePipeline::new(
        tokio::runtime::Handle::current(),
        OutputLocator::new(StorageConfig::under(root.path())),
        Arc::new(RecordingIndex::default()),
    );
    let session: Arc<dyn CameraSession> = Arc::new(FakeSession {
        kind: BackendKind::Legacy,
        device: None,
        orientation: Some(0),
    });
    let adapter = SessionAdapter::new(
        &FakeCapturer(Some(session)),
        BackendSelector::new(BackendKind::Legacy),
        pipeline,
    )
    .unwrap();

    let (sink, rx) = ResultSink::channel();
    adapter.capture_photo(CaptureOptions::default(), sink);
    assert_eq!(
        rx.await.unwrap(),
        Err("Error getting camera instance for stream".to_string())
    );

    let (sink, rx) = ResultSink::channel();
    adapter.switch_flash(FlashOptions::default(), sink);
    assert_eq!(
        rx.await.unwrap(),
        Err("Error getting camera instance for stream".to_string())
    );
}

#[tokio::test]
async fn test_capturer_without_session() {
    let pipeline = CapturePipeline::new(
        tokio::runtime::Handle::current(),
        OutputLocator::new(StorageConfig::default()),
        Arc::new(RecordingIndex::default()),
    );
    let result = SessionAdapter::new(
        &FakeCapturer(None),
        BackendSelector::new(BackendKind::Camera2),
        pipeline,
    );
    assert!(matches!(result, Err(CaptureError::SessionUnavailable(_))));
}

#[tokio::test]
async fn test_invalid_options_fail_without_capturing() {
    let f = fixture(BackendKind::Camera2, FakeDevice::with_frame(jpeg_bytes(16, 16)), Some(0));

    let (sink, rx) = ResultSink::channel();
    let bad = CaptureOptions {
        max_jpeg_quality: 0.0,
        ..CaptureOptions::default()
    };
    f.adapter.capture_photo(bad, sink);

    assert!(rx.await.unwrap().unwrap_err().starts_with("Invalid options"));
    assert_eq!(f.device.captures.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_inactive_backend_invokes_neither_callback() {
    let f = fixture(BackendKind::Legacy, FakeDevice::with_frame(jpeg_bytes(16, 16)), Some(0));
    f.selector.set(BackendKind::Camera2);

    let (sink, rx) = ResultSink::channel();
    assert!(f.adapter.capture_photo(CaptureOptions::default(), sink).is_none());
    // The sink was dropped unused
    assert!(rx.await.is_err());

    let (sink, rx) = ResultSink::channel();
    f.adapter.switch_flash(FlashOptions::default(), sink);
    assert!(rx.await.is_err());

    assert_eq!(f.device.captures.load(Ordering::SeqCst), 0);
    assert!(f.device.flash.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_switch_flash_torch_and_off() {
    let f = fixture(BackendKind::Legacy, FakeDevice::default(), Some(0));

    let (sink, rx) = ResultSink::channel();
    f.adapter
        .switch_flash(FlashOptions::from_json(r#"{"flashMode": 1}"#).unwrap(), sink);
    assert_eq!(rx.await.unwrap(), Ok("Successful".to_string()));

    let (sink, rx) = ResultSink::channel();
    f.adapter
        .switch_flash(FlashOptions::from_json(r#"{"flashMode": 0}"#).unwrap(), sink);
    assert_eq!(rx.await.unwrap(), Ok("Successful".to_string()));

    assert_eq!(
        *f.device.flash.lock().unwrap(),
        vec![FlashMode::Torch, FlashMode::Off]
    );
}

#[tokio::test]
async fn test_switch_flash_failure_is_reported() {
    let device = FakeDevice {
        flash_fails: true,
        ..FakeDevice::default()
    };
    let f = fixture(BackendKind::Camera2, device, Some(0));

    let (sink, rx) = ResultSink::channel();
    f.adapter.switch_flash(
        FlashOptions {
            flash_mode: FlashMode::Torch,
        },
        sink,
    );
    assert!(rx.await.unwrap().unwrap_err().contains("torch unavailable"));
}
