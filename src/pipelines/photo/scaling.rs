// SPDX-License-Identifier: GPL-3.0-only

//! Output size bounds
//!
//! Both functions work on integer pixel sizes and truncate, which only
//! costs sub-pixel precision of the final resize.

/// Fit `width` x `height` into a `max_size` square, preserving aspect ratio
///
/// Width is fitted first. If the derived height still exceeds the bound,
/// height becomes the binding side and width is derived from it.
pub fn scale_dimension(width: u32, height: u32, max_size: u32) -> (u32, u32) {
    let (w, h, max) = (width as u64, height as u64, max_size as u64);
    let mut new_width = w;
    let mut new_height = h;

    if w > max {
        new_width = max;
        new_height = (new_width * h) / w;
    }

    if new_height > max {
        new_height = max;
        new_width = (new_height * w) / h;
    }

    (new_width as u32, new_height as u32)
}

/// Whether a decoded image gets resized at all
///
/// Only the width is checked. A portrait frame whose height alone exceeds
/// the bound is written at full size; once triggered, [`scale_dimension`]
/// does bound the height as well.
pub fn needs_resize(width: u32, _height: u32, max_size: u32) -> bool {
    width > max_size
}
