//! Selection identity and the image loading state machine.

use image::ImageFormat;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use super::data::ProfileImage;
use crate::picker::{LoadError, Progress};

static NEXT_TOKEN: AtomicU64 = AtomicU64::new(1);

/// An item chosen in the picker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickedItem {
    path: PathBuf,
}

impl PickedItem {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Declared content type, taken from the file extension
    ///
    /// `None` when the item does not declare an image type.
    pub fn content_type(&self) -> Option<ImageFormat> {
        ImageFormat::from_path(&self.path).ok()
    }
}

/// Identity of one pick
///
/// Every token is unique: picking the same item twice yields two tokens
/// that compare unequal. Equality is identity, never the item's contents.
#[derive(Debug, Clone)]
pub struct SelectionToken {
    id: u64,
    item: PickedItem,
}

impl SelectionToken {
    pub fn new(item: PickedItem) -> Self {
        Self {
            id: NEXT_TOKEN.fetch_add(1, Ordering::Relaxed),
            item,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn item(&self) -> &PickedItem {
        &self.item
    }
}

impl PartialEq for SelectionToken {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for SelectionToken {}

/// Loading status of the profile photo
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SelectionState {
    /// Nothing selected, or the selection had no image data
    #[default]
    Empty,
    /// A transfer for the current selection is in flight
    Loading(Progress),
    Success(ProfileImage),
    Failure(LoadError),
}

impl SelectionState {
    pub fn is_loading(&self) -> bool {
        matches!(self, SelectionState::Loading(_))
    }
}
