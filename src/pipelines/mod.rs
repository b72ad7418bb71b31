// SPDX-License-Identifier: GPL-3.0-only

//! Processing pipelines for photo capture
//!
//! Heavy work (JPEG decode, transform, encode, disk I/O) runs in background
//! tasks so the thread that delivers camera frames is never blocked.
//!
//! # Modules
//!
//! - [`photo`]: capture-to-file pipeline with rotation, scaling and JPEG
//!   re-encoding

pub mod photo;
