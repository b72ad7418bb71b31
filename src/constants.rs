// SPDX-License-Identifier: GPL-3.0-only

//! Capture-wide constants

/// Default bound on the longer output side, in pixels
pub const DEFAULT_MAX_SIZE: u32 = 2000;

/// Default JPEG quality as a fraction of 100
pub const DEFAULT_JPEG_QUALITY: f64 = 1.0;

/// Extension used for every persisted photo
pub const PHOTO_EXTENSION: &str = "jpeg";

/// Folder created under the user data and cache directories
pub const APP_FOLDER: &str = "photo-capture";

/// Capture target codes as exchanged with the host bridge
pub mod capture_target {
    pub const MEMORY: i64 = 0;
    pub const DISK: i64 = 1;
    pub const CAMERA_ROLL: i64 = 2;
    pub const TEMP: i64 = 3;
}

/// Flash mode codes as exchanged with the host bridge
pub mod flash_mode {
    pub const OFF: i64 = 0;
    pub const TORCH: i64 = 1;
}

/// Messages handed back through the result sink
pub mod messages {
    pub const SESSION_UNAVAILABLE: &str = "Error getting camera session instance";
    pub const DEVICE_UNAVAILABLE: &str = "Error getting camera instance for stream";
    pub const SAVE_FAILED: &str = "Error saving picture";
    pub const FLASH_SWITCHED: &str = "Successful";
    pub const CAPTURE_ABANDONED: &str = "Capture abandoned before a result was produced";
}

/// EXIF orientation tag value meaning "undefined"
pub const EXIF_ORIENTATION_UNDEFINED: u32 = 0;

/// EXIF orientation tag value meaning "normal", assumed when the tag is absent
pub const EXIF_ORIENTATION_NORMAL: u32 = 1;
