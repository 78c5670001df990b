//! Shared data structures for the profile state
//!
//! These structs represent the data that flows between the picker
//! workers and the UI layer.

use image::RgbaImage;
use std::sync::Arc;

/// A decoded photo ready for display
///
/// Immutable once built; clones share the pixel buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileImage {
    /// Width in pixels (after any downscaling)
    pub width: u32,
    /// Height in pixels (after any downscaling)
    pub height: u32,
    /// RGBA8 pixel data
    pub pixels: Arc<RgbaImage>,
}
