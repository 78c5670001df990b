//! Byte-to-image conversion performed inside a transfer.

use image::imageops::FilterType;
use std::sync::Arc;

use super::LoadError;
use crate::state::data::ProfileImage;

/// Decodes fetched bytes into a displayable [`ProfileImage`]
///
/// Runs on whatever thread the transfer uses, never the UI thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Converter {
    /// Longest side allowed for the decoded image; larger images are
    /// downscaled preserving aspect ratio
    pub max_dimension: Option<u32>,
}

impl Converter {
    pub fn new(max_dimension: Option<u32>) -> Self {
        Self { max_dimension }
    }

    /// Decode `bytes` (format is sniffed from the content)
    pub fn convert(&self, bytes: &[u8]) -> Result<ProfileImage, LoadError> {
        let img = image::load_from_memory(bytes)
            .map_err(|e| LoadError::ImportFailed(e.to_string()))?;

        let img = match self.max_dimension {
            Some(limit) if img.width() > limit || img.height() > limit => {
                tracing::debug!(
                    "Downscaling {}x{} to fit {}px",
                    img.width(),
                    img.height(),
                    limit
                );
                img.resize(limit, limit, FilterType::Lanczos3)
            }
            _ => img,
        };

        let pixels = img.to_rgba8();
        Ok(ProfileImage {
            width: pixels.width(),
            height: pixels.height(),
            pixels: Arc::new(pixels),
        })
    }
}
