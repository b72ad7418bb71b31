// SPDX-License-Identifier: GPL-3.0-only

//! Media index registration for newly written photos
//!
//! Registration is fire-and-forget: a failure is logged and the capture
//! still succeeds, the file is simply picked up on the next full scan.

use crate::storage::file_uri;
use std::path::Path;
use tracing::{debug, info, warn};

/// Something that can be told a new media file exists
pub trait MediaIndex: Send + Sync {
    /// Register a fully written and closed file
    fn register(&self, path: &Path);
}

/// Does nothing, for hosts without a media index
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMediaIndex;

impl MediaIndex for NoopMediaIndex {
    fn register(&self, path: &Path) {
        debug!(path = %path.display(), "No media index, skipping registration");
    }
}

/// Tracker miner on the session D-Bus
///
/// Asks `tracker-miner-fs` to index the file right away instead of waiting
/// for its filesystem monitor.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrackerMediaIndex;

impl TrackerMediaIndex {
    const DESTINATION: &'static str = "org.freedesktop.Tracker3.Miner.Files.Control";
    const PATH: &'static str = "/org/freedesktop/Tracker3/Miner/Files/Index";
    const INTERFACE: &'static str = "org.freedesktop.Tracker3.Miner.Files.Index";

    fn index_location(&self, uri: &str) -> Result<(), String> {
        let connection = zbus::blocking::Connection::session()
            .map_err(|e| format!("Failed to connect to session D-Bus: {}", e))?;

        let proxy = zbus::blocking::Proxy::new(
            &connection,
            Self::DESTINATION,
            Self::PATH,
            Self::INTERFACE,
        )
        .map_err(|e| format!("Failed to create Tracker proxy: {}", e))?;

        // IndexLocation(uri, graphs, flags); no graph filter, no flags
        let graphs: Vec<String> = Vec::new();
        let flags: Vec<String> = Vec::new();
        proxy
            .call::<_, _, ()>("IndexLocation", &(uri, graphs, flags))
            .map_err(|e| format!("IndexLocation failed: {}", e))
    }
}

impl MediaIndex for TrackerMediaIndex {
    fn register(&self, path: &Path) {
        let uri = file_uri(path);
        match self.index_location(&uri) {
            Ok(()) => info!(uri = %uri, "Registered photo with media index"),
            Err(e) => warn!(uri = %uri, error = %e, "Media index registration failed"),
        }
    }
}
