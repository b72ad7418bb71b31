// SPDX-License-Identifier: GPL-3.0-only

//! Where captured photos are written
//!
//! - [`OutputLocator`]: destination directory per capture target and a
//!   unique file name
//! - [`media_index`]: tells the desktop media index about new library files

pub mod media_index;

pub use media_index::{MediaIndex, NoopMediaIndex, TrackerMediaIndex};

use crate::config::{CaptureTarget, StorageConfig};
use crate::constants::PHOTO_EXTENSION;
use crate::errors::{CaptureError, CaptureResult};
use std::path::{Path, PathBuf};
use tracing::{debug, error};

/// Resolves output files for capture targets
#[derive(Debug, Clone)]
pub struct OutputLocator {
    config: StorageConfig,
}

impl OutputLocator {
    pub fn new(config: StorageConfig) -> Self {
        Self { config }
    }

    /// Random base name for a new photo
    pub fn new_file_name() -> String {
        uuid::Uuid::new_v4().to_string()
    }

    /// Path for `file_name_base` under the target's directory
    ///
    /// Creates the directory tree if needed. Returns `None` for in-memory
    /// captures and when the directory cannot be created; the latter is
    /// logged here and must be checked by the caller before writing.
    pub fn resolve(&self, file_name_base: &str, target: CaptureTarget) -> Option<PathBuf> {
        let dir = self.config.dir_for(target)?;
        if !ensure_dir(dir) {
            return None;
        }
        Some(dir.join(format!("{}.{}", file_name_base, PHOTO_EXTENSION)))
    }

    /// Fresh destination for a file capture
    pub fn locate(&self, target: CaptureTarget) -> CaptureResult<PathBuf> {
        let Some(dir) = self.config.dir_for(target) else {
            return Err(CaptureError::Unsupported(
                "in-memory captures have no output file".to_string(),
            ));
        };

        self.resolve(&Self::new_file_name(), target)
            .ok_or_else(|| CaptureError::DirectoryCreateFailed(dir.to_path_buf()))
    }
}

fn ensure_dir(dir: &Path) -> bool {
    if dir.is_dir() {
        return true;
    }
    match std::fs::create_dir_all(dir) {
        Ok(()) => {
            debug!(dir = %dir.display(), "Created output directory");
            true
        }
        Err(e) => {
            error!(dir = %dir.display(), error = %e, "failed to create directory");
            false
        }
    }
}

/// `file://` URI for an absolute path, as handed back to the caller
pub fn file_uri(path: &Path) -> String {
    format!("file://{}", path.display())
}
