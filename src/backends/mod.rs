// SPDX-License-Identifier: GPL-3.0-only

//! Backend abstraction layer for still capture
//!
//! # Modules
//!
//! - [`camera`]: session and device capability traits, the session adapter
//!   and the file-backed desktop backend

pub mod camera;
