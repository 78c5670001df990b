//! Photo picker collaborators
//!
//! This module handles:
//! - Fetching the bytes behind a picked item on a background worker
//! - Converting those bytes into a displayable image (convert.rs)
//! - Reporting transfer progress (progress.rs)
//! - The native file dialog and file-system backed picker (file.rs)

pub mod convert;
pub mod error;
pub mod file;
pub mod progress;

use futures::future::BoxFuture;
use futures::FutureExt;
use std::future::Future;

pub use convert::Converter;
pub use error::LoadError;
pub use file::{pick_photo, FilePicker};
pub use progress::{Progress, ProgressReporter};

use crate::state::data::ProfileImage;
use crate::state::selection::SelectionToken;

/// Outcome of a transfer: `Ok(None)` means the item had no image data
pub type FetchResult = Result<Option<ProfileImage>, LoadError>;

/// A started transfer
///
/// The progress handle is available immediately; the result resolves
/// later, on whatever thread the picker finishes the work.
pub struct Fetch {
    pub progress: Progress,
    pub result: BoxFuture<'static, FetchResult>,
}

impl Fetch {
    pub fn new<F>(progress: Progress, result: F) -> Self
    where
        F: Future<Output = FetchResult> + Send + 'static,
    {
        Self {
            progress,
            result: result.boxed(),
        }
    }
}

impl std::fmt::Debug for Fetch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fetch")
            .field("progress", &self.progress)
            .finish_non_exhaustive()
    }
}

/// Source of picked items
///
/// Implementations must start the transfer before returning; every call
/// is a new transfer, even for an item fetched before.
pub trait Picker {
    fn fetch_and_convert(&self, token: &SelectionToken, converter: &Converter) -> Fetch;
}

/// Encode a solid PNG in memory
#[cfg(test)]
pub(crate) fn png_fixture(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([200, 40, 90, 255]));
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png)
        .expect("encode png fixture");
    out.into_inner()
}
