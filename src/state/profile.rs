//! Profile view-model
//!
//! Holds the editable profile fields and drives the photo loading state.
//! Picking a photo starts a transfer right away and flips the state to
//! `Loading`; the transfer's result comes back later as a
//! [`LoadCompletion`] that the owner feeds into [`ProfileViewModel::complete`].
//!
//! Transfers are never cancelled. When the selection changes before a
//! transfer finishes, its completion no longer matches the current token
//! and is dropped.

use futures::future::BoxFuture;
use tokio::sync::watch;

use super::selection::{SelectionState, SelectionToken};
use crate::picker::{Converter, FetchResult, Picker};

/// A transfer started by [`ProfileViewModel::set_selection`]
///
/// Await [`PendingLoad::resolve`] on any executor, then hand the
/// completion back to the view-model on the thread that owns it.
pub struct PendingLoad {
    token: SelectionToken,
    result: BoxFuture<'static, FetchResult>,
}

impl PendingLoad {
    pub fn token(&self) -> &SelectionToken {
        &self.token
    }

    /// Wait for the transfer to finish
    pub async fn resolve(self) -> LoadCompletion {
        LoadCompletion {
            token: self.token,
            result: self.result.await,
        }
    }
}

impl std::fmt::Debug for PendingLoad {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingLoad")
            .field("token", &self.token)
            .finish_non_exhaustive()
    }
}

/// A finished transfer, tagged with the selection that started it
#[derive(Debug, Clone)]
pub struct LoadCompletion {
    pub token: SelectionToken,
    pub result: FetchResult,
}

/// Backing model of the profile form
pub struct ProfileViewModel<P> {
    pub first_name: String,
    pub last_name: String,
    pub about_me: String,

    picker: P,
    converter: Converter,
    selection: Option<SelectionToken>,
    state: watch::Sender<SelectionState>,
}

impl<P: Picker> ProfileViewModel<P> {
    pub fn new(picker: P, converter: Converter) -> Self {
        let (state, _) = watch::channel(SelectionState::Empty);

        Self {
            first_name: String::new(),
            last_name: String::new(),
            about_me: String::new(),
            picker,
            converter,
            selection: None,
            state,
        }
    }

    /// The current selection, if any
    pub fn selection(&self) -> Option<&SelectionToken> {
        self.selection.as_ref()
    }

    /// Snapshot of the loading state
    pub fn state(&self) -> SelectionState {
        self.state.borrow().clone()
    }

    /// Subscribe to loading state changes
    pub fn observe_state(&self) -> watch::Receiver<SelectionState> {
        self.state.subscribe()
    }

    /// Replace the current selection
    ///
    /// A token starts a new transfer and moves the state to `Loading`
    /// before returning; `None` clears the state to `Empty`. Whatever was
    /// in flight for the previous selection is left to finish and will be
    /// ignored.
    pub fn set_selection(&mut self, token: Option<SelectionToken>) -> Option<PendingLoad> {
        let Some(token) = token else {
            tracing::info!("Selection cleared");
            self.selection = None;
            self.state.send_replace(SelectionState::Empty);
            return None;
        };

        tracing::info!(
            "Selected {} (token {})",
            token.item().path().display(),
            token.id()
        );

        let fetch = self.picker.fetch_and_convert(&token, &self.converter);
        self.selection = Some(token.clone());
        self.state.send_replace(SelectionState::Loading(fetch.progress));

        Some(PendingLoad {
            token,
            result: fetch.result,
        })
    }

    /// Apply a finished transfer
    ///
    /// Returns `false` when the completion belongs to a superseded
    /// selection, in which case the state is left untouched.
    pub fn complete(&mut self, completion: LoadCompletion) -> bool {
        let LoadCompletion { token, result } = completion;

        if self.selection.as_ref() != Some(&token) {
            tracing::debug!("Dropping stale result for token {}", token.id());
            return false;
        }

        let next = match result {
            Ok(Some(image)) => {
                tracing::info!("Photo loaded ({}x{})", image.width, image.height);
                SelectionState::Success(image)
            }
            Ok(None) => {
                tracing::info!("Selection had no image data");
                SelectionState::Empty
            }
            Err(err) => {
                tracing::warn!("Photo failed to load: {}", err);
                SelectionState::Failure(err)
            }
        };

        self.state.send_replace(next);
        true
    }
}

impl<P> std::fmt::Debug for ProfileViewModel<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfileViewModel")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("about_me", &self.about_me)
            .field("selection", &self.selection)
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::picker::{png_fixture, Fetch, LoadError, Progress};
    use crate::state::data::ProfileImage;
    use crate::state::selection::PickedItem;
    use std::sync::{Arc, Mutex};
    use tokio::sync::oneshot;

    /// Picker whose transfers finish only when the test says so
    #[derive(Clone, Default)]
    struct ScriptedPicker {
        transfers: Arc<Mutex<Vec<(SelectionToken, oneshot::Sender<FetchResult>)>>>,
    }

    impl ScriptedPicker {
        fn started(&self) -> usize {
            self.transfers.lock().unwrap().len()
        }

        /// Finish the transfer started for `token`
        fn finish(&self, token: &SelectionToken, result: FetchResult) {
            let mut transfers = self.transfers.lock().unwrap();
            let index = transfers
                .iter()
                .position(|(t, _)| t == token)
                .expect("no transfer for token");
            let (_, tx) = transfers.remove(index);
            tx.send(result).unwrap();
        }
    }

    impl Picker for ScriptedPicker {
        fn fetch_and_convert(&self, token: &SelectionToken, _converter: &Converter) -> Fetch {
            let (progress, _reporter) = Progress::new();
            let (tx, rx) = oneshot::channel();
            self.transfers.lock().unwrap().push((token.clone(), tx));
            Fetch::new(progress, async move {
                rx.await.unwrap_or(Err(LoadError::Cancelled))
            })
        }
    }

    fn token(name: &str) -> SelectionToken {
        SelectionToken::new(PickedItem::new(format!("/photos/{name}")))
    }

    fn image(size: u32) -> ProfileImage {
        Converter::default().convert(&png_fixture(size, size)).unwrap()
    }

    fn view_model() -> (ProfileViewModel<ScriptedPicker>, ScriptedPicker) {
        let picker = ScriptedPicker::default();
        (ProfileViewModel::new(picker.clone(), Converter::default()), picker)
    }

    #[test]
    fn test_new_view_model_is_empty() {
        let (vm, _) = view_model();
        assert_eq!(vm.state(), SelectionState::Empty);
        assert!(vm.selection().is_none());
        assert!(vm.first_name.is_empty());
    }

    #[test]
    fn test_selection_is_loading_immediately() {
        let (mut vm, picker) = view_model();
        let a = token("a.png");

        let pending = vm.set_selection(Some(a.clone())).unwrap();

        assert!(vm.state().is_loading());
        assert_eq!(vm.selection(), Some(&a));
        assert_eq!(pending.token(), &a);
        assert_eq!(picker.started(), 1);
    }

    #[tokio::test]
    async fn test_success_is_applied() {
        let (mut vm, picker) = view_model();
        let a = token("a.png");
        let pending = vm.set_selection(Some(a.clone())).unwrap();

        let img = image(4);
        picker.finish(&a, Ok(Some(img.clone())));

        assert!(vm.complete(pending.resolve().await));
        assert_eq!(vm.state(), SelectionState::Success(img));
    }

    #[tokio::test]
    async fn test_no_data_clears_to_empty() {
        let (mut vm, picker) = view_model();
        let a = token("a.txt");
        let pending = vm.set_selection(Some(a.clone())).unwrap();

        picker.finish(&a, Ok(None));

        assert!(vm.complete(pending.resolve().await));
        assert_eq!(vm.state(), SelectionState::Empty);
    }

    #[tokio::test]
    async fn test_failure_keeps_error_detail() {
        let (mut vm, picker) = view_model();
        let a = token("a.png");
        let pending = vm.set_selection(Some(a.clone())).unwrap();

        let err = LoadError::ImportFailed("bad header".to_string());
        picker.finish(&a, Err(err.clone()));

        assert!(vm.complete(pending.resolve().await));
        assert_eq!(vm.state(), SelectionState::Failure(err));
    }

    #[tokio::test]
    async fn test_out_of_order_completion_is_dropped() {
        let (mut vm, picker) = view_model();
        let a = token("a.png");
        let b = token("b.png");

        let slow = vm.set_selection(Some(a.clone())).unwrap();
        let fast = vm.set_selection(Some(b.clone())).unwrap();

        let img_b = image(2);
        picker.finish(&b, Ok(Some(img_b.clone())));
        assert!(vm.complete(fast.resolve().await));

        picker.finish(&a, Ok(Some(image(3))));
        assert!(!vm.complete(slow.resolve().await));

        assert_eq!(vm.state(), SelectionState::Success(img_b));
        assert_eq!(vm.selection(), Some(&b));
    }

    #[tokio::test]
    async fn test_stale_completion_leaves_newer_load_pending() {
        let (mut vm, picker) = view_model();
        let a = token("a.png");
        let b = token("b.png");

        let first = vm.set_selection(Some(a.clone())).unwrap();
        let _second = vm.set_selection(Some(b)).unwrap();
        let loading = vm.state();

        picker.finish(&a, Err(LoadError::ImportFailed("corrupt".to_string())));
        assert!(!vm.complete(first.resolve().await));

        assert_eq!(vm.state(), loading);
        assert!(vm.state().is_loading());
    }

    #[tokio::test]
    async fn test_clear_wins_over_late_result() {
        let (mut vm, picker) = view_model();
        let a = token("a.png");
        let pending = vm.set_selection(Some(a.clone())).unwrap();

        assert!(vm.set_selection(None).is_none());
        assert_eq!(vm.state(), SelectionState::Empty);

        picker.finish(&a, Ok(Some(image(2))));
        assert!(!vm.complete(pending.resolve().await));
        assert_eq!(vm.state(), SelectionState::Empty);
        assert!(vm.selection().is_none());
    }

    #[tokio::test]
    async fn test_repick_same_item_starts_new_transfer() {
        let (mut vm, picker) = view_model();
        let item = PickedItem::new("/photos/a.png");
        let first = SelectionToken::new(item.clone());
        let second = SelectionToken::new(item);

        let stale = vm.set_selection(Some(first.clone())).unwrap();
        let current = vm.set_selection(Some(second.clone())).unwrap();
        assert_eq!(picker.started(), 2);

        picker.finish(&first, Ok(Some(image(2))));
        assert!(!vm.complete(stale.resolve().await));
        assert!(vm.state().is_loading());

        let img = image(5);
        picker.finish(&second, Ok(Some(img.clone())));
        assert!(vm.complete(current.resolve().await));
        assert_eq!(vm.state(), SelectionState::Success(img));
    }

    #[tokio::test]
    async fn test_new_selection_after_failure() {
        let (mut vm, picker) = view_model();
        let a = token("a.png");
        let pending = vm.set_selection(Some(a.clone())).unwrap();
        picker.finish(&a, Err(LoadError::Cancelled));
        vm.complete(pending.resolve().await);
        assert!(matches!(vm.state(), SelectionState::Failure(_)));

        let b = token("b.png");
        let pending = vm.set_selection(Some(b.clone())).unwrap();
        assert!(vm.state().is_loading());

        let img = image(3);
        picker.finish(&b, Ok(Some(img.clone())));
        assert!(vm.complete(pending.resolve().await));
        assert_eq!(vm.state(), SelectionState::Success(img));
    }

    #[tokio::test]
    async fn test_dropped_transfer_resolves_cancelled() {
        let (mut vm, picker) = view_model();
        let pending = vm.set_selection(Some(token("a.png"))).unwrap();

        picker.transfers.lock().unwrap().clear();

        assert!(vm.complete(pending.resolve().await));
        assert_eq!(vm.state(), SelectionState::Failure(LoadError::Cancelled));
    }

    #[tokio::test]
    async fn test_observers_see_transitions() {
        let (mut vm, picker) = view_model();
        let mut rx = vm.observe_state();
        assert_eq!(*rx.borrow_and_update(), SelectionState::Empty);

        let a = token("a.png");
        let pending = vm.set_selection(Some(a.clone())).unwrap();
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().is_loading());

        picker.finish(&a, Ok(None));
        vm.complete(pending.resolve().await);
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), SelectionState::Empty);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_file_picker_corrupt_bytes_end_to_end() {
        use crate::picker::FilePicker;
        use std::io::Write;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corrupt.png");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(b"not an image at all")
            .unwrap();

        let picker = FilePicker::new(tokio::runtime::Handle::current(), 1024);
        let mut vm = ProfileViewModel::new(picker, Converter::default());

        let pending = vm
            .set_selection(Some(SelectionToken::new(PickedItem::new(&path))))
            .unwrap();
        assert!(vm.state().is_loading());

        assert!(vm.complete(pending.resolve().await));
        assert!(matches!(
            vm.state(),
            SelectionState::Failure(LoadError::ImportFailed(_))
        ));
    }
}
