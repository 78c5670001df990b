//! File-system backed picker
//!
//! Items are image files chosen through the native dialog. Each fetch is
//! spawned on the worker runtime: the file is streamed in chunks (feeding
//! the progress handle) and then decoded on the blocking pool.

use rfd::AsyncFileDialog;
use std::path::Path;
use tokio::io::AsyncReadExt;
use tokio::runtime::Handle;
use tokio::sync::oneshot;

use super::{Converter, Fetch, FetchResult, LoadError, Picker, Progress, ProgressReporter};
use crate::state::selection::{PickedItem, SelectionToken};

/// Extensions offered by the dialog
const IMAGE_EXTENSIONS: [&str; 8] = ["png", "jpg", "jpeg", "gif", "webp", "bmp", "tif", "tiff"];

/// Read size for streaming a picked file
const CHUNK_SIZE: usize = 64 * 1024;

/// Show the native photo dialog
///
/// Returns `None` when the user dismisses it.
pub async fn pick_photo() -> Option<SelectionToken> {
    let handle = AsyncFileDialog::new()
        .set_title("Choose a Profile Photo")
        .add_filter("Images", &IMAGE_EXTENSIONS)
        .pick_file()
        .await?;

    let item = PickedItem::new(handle.path());
    tracing::debug!("Picked {}", item.path().display());
    Some(SelectionToken::new(item))
}

/// Picker that reads picked files from disk
#[derive(Debug, Clone)]
pub struct FilePicker {
    runtime: Handle,
    max_file_bytes: u64,
}

impl FilePicker {
    pub fn new(runtime: Handle, max_file_bytes: u64) -> Self {
        Self {
            runtime,
            max_file_bytes,
        }
    }
}

impl Picker for FilePicker {
    fn fetch_and_convert(&self, token: &SelectionToken, converter: &Converter) -> Fetch {
        let (progress, reporter) = Progress::new();
        let (tx, rx) = oneshot::channel();

        let item = token.item().clone();
        let converter = *converter;
        let limit = self.max_file_bytes;
        let id = token.id();

        self.runtime.spawn(async move {
            let result = load_item(&item, converter, &reporter, limit).await;
            reporter.finish();

            if tx.send(result).is_err() {
                tracing::debug!("Transfer {} finished with nobody waiting", id);
            }
        });

        Fetch::new(progress, async move {
            rx.await.unwrap_or(Err(LoadError::Cancelled))
        })
    }
}

async fn load_item(
    item: &PickedItem,
    converter: Converter,
    reporter: &ProgressReporter,
    limit: u64,
) -> FetchResult {
    let path = item.path();

    if item.content_type().is_none() {
        tracing::debug!("{} is not an image, nothing to load", path.display());
        return Ok(None);
    }

    let bytes = read_file(path, reporter, limit).await?;

    let image = tokio::task::spawn_blocking(move || converter.convert(&bytes))
        .await
        .map_err(|e| LoadError::Interrupted(e.to_string()))??;

    tracing::debug!(
        "Decoded {} ({}x{})",
        path.display(),
        image.width,
        image.height
    );
    Ok(Some(image))
}

/// Stream `path` into memory, refusing anything over `limit` bytes
///
/// The metadata size is only a first check: pipes and growing files
/// report less than they yield, so the running total is checked too.
async fn read_file(path: &Path, reporter: &ProgressReporter, limit: u64) -> Result<Vec<u8>, LoadError> {
    let mut file = tokio::fs::File::open(path)
        .await
        .map_err(|e| LoadError::io(path, e))?;

    let size = file
        .metadata()
        .await
        .map_err(|e| LoadError::io(path, e))?
        .len();

    if size > limit {
        return Err(LoadError::TooLarge {
            path: path.to_path_buf(),
            size,
            limit,
        });
    }

    reporter.set_total(size);

    let mut bytes = Vec::with_capacity(size as usize);
    let mut chunk = vec![0u8; CHUNK_SIZE];
    loop {
        let read = file
            .read(&mut chunk)
            .await
            .map_err(|e| LoadError::io(path, e))?;
        if read == 0 {
            break;
        }

        let seen = bytes.len() as u64 + read as u64;
        if seen > limit {
            return Err(LoadError::TooLarge {
                path: path.to_path_buf(),
                size: seen,
                limit,
            });
        }

        bytes.extend_from_slice(&chunk[..read]);
        reporter.advance(read as u64);
    }

    Ok(bytes)
}
