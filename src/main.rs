use iced::widget::image::Handle;
use iced::widget::{button, column, container, image, progress_bar, row, text, text_input};
use iced::{Alignment, Element, Length, Subscription, Task, Theme};
use std::time::Duration;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

mod config;
mod picker;
mod state;

use config::Settings;
use picker::{pick_photo, Converter, FilePicker};
use state::{LoadCompletion, ProfileViewModel, SelectionState, SelectionToken};

/// Side length of the displayed photo
const PHOTO_SIZE: f32 = 256.0;

/// Main application state
///
/// `update` is the only place the view-model is touched, so every state
/// change happens on the UI thread. Transfers finish on the worker runtime
/// and come back here as `PhotoLoaded` messages.
struct ProfileEditor {
    profile: ProfileViewModel<FilePicker>,
    /// Loading state as published by the view-model; rendering reads this
    photo_state: watch::Receiver<SelectionState>,
    /// Display handle for the current `Success` image, built once per load
    avatar: Option<Handle>,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    FirstNameChanged(String),
    LastNameChanged(String),
    AboutMeChanged(String),
    /// User clicked "Choose Photo"
    ChoosePhoto,
    /// The photo dialog closed, with or without a pick
    PhotoPicked(Option<SelectionToken>),
    ClearPhoto,
    /// A transfer finished (possibly for an old selection)
    PhotoLoaded(LoadCompletion),
    /// Redraw while a transfer reports progress
    Tick,
}

impl ProfileEditor {
    fn new(picker: FilePicker, settings: &Settings) -> (Self, Task<Message>) {
        let profile = ProfileViewModel::new(picker, Converter::new(settings.max_dimension));
        let photo_state = profile.observe_state();

        (
            ProfileEditor {
                profile,
                photo_state,
                avatar: None,
            },
            Task::none(),
        )
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::FirstNameChanged(value) => self.profile.first_name = value,
            Message::LastNameChanged(value) => self.profile.last_name = value,
            Message::AboutMeChanged(value) => self.profile.about_me = value,
            Message::ChoosePhoto => {
                return Task::perform(pick_photo(), Message::PhotoPicked);
            }
            Message::PhotoPicked(None) => {
                tracing::debug!("Photo dialog dismissed");
            }
            Message::PhotoPicked(Some(token)) => {
                return self.select(Some(token));
            }
            Message::ClearPhoto => {
                return self.select(None);
            }
            Message::PhotoLoaded(completion) => {
                if self.profile.complete(completion) {
                    self.refresh_avatar();
                }
            }
            Message::Tick => {}
        }

        Task::none()
    }

    fn select(&mut self, token: Option<SelectionToken>) -> Task<Message> {
        let pending = self.profile.set_selection(token);
        self.avatar = None;

        match pending {
            Some(pending) => {
                tracing::debug!("Waiting on transfer for token {}", pending.token().id());
                Task::perform(pending.resolve(), Message::PhotoLoaded)
            }
            None => Task::none(),
        }
    }

    fn refresh_avatar(&mut self) {
        self.avatar = match self.profile.state() {
            SelectionState::Success(photo) => Some(Handle::from_rgba(
                photo.width,
                photo.height,
                photo.pixels.as_raw().clone(),
            )),
            _ => None,
        };
    }

    fn view(&self) -> Element<'_, Message> {
        let fields = column![
            text_input("First name", &self.profile.first_name)
                .on_input(Message::FirstNameChanged)
                .padding(10),
            text_input("Last name", &self.profile.last_name)
                .on_input(Message::LastNameChanged)
                .padding(10),
            text_input("About me", &self.profile.about_me)
                .on_input(Message::AboutMeChanged)
                .padding(10),
        ]
        .spacing(10)
        .width(Length::Fixed(360.0));

        let actions = row![
            button("Choose Photo")
                .on_press(Message::ChoosePhoto)
                .padding(10),
            button("Clear")
                .on_press_maybe(self.profile.selection().map(|_| Message::ClearPhoto))
                .padding(10),
        ]
        .spacing(10);

        let content = column![
            text("Profile").size(48),
            self.photo_view(),
            actions,
            fields,
        ]
        .spacing(20)
        .padding(40)
        .align_x(Alignment::Center);

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .center_y(Length::Fill)
            .into()
    }

    fn photo_view(&self) -> Element<'_, Message> {
        let state = self.photo_state.borrow();
        match (&*state, &self.avatar) {
            (SelectionState::Success(_), Some(avatar)) => image(avatar.clone())
                .width(Length::Fixed(PHOTO_SIZE))
                .height(Length::Fixed(PHOTO_SIZE))
                .into(),
            (SelectionState::Loading(progress), _) => match progress.fraction() {
                Some(fraction) => progress_bar(0.0..=1.0, fraction)
                    .width(Length::Fixed(PHOTO_SIZE))
                    .into(),
                None => text("Loading photo...").into(),
            },
            (SelectionState::Failure(err), _) => {
                text(format!("Could not load photo: {}", err)).into()
            }
            _ => text("No photo selected").into(),
        }
    }

    fn subscription(&self) -> Subscription<Message> {
        if self.photo_state.borrow().is_loading() {
            iced::time::every(Duration::from_millis(100)).map(|_| Message::Tick)
        } else {
            Subscription::none()
        }
    }

    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

fn init_logging(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (settings, config_error) = match Settings::load() {
        Ok(settings) => (settings, None),
        Err(e) => (Settings::default(), Some(e)),
    };

    init_logging(&settings.log_filter);
    if let Some(e) = config_error {
        tracing::warn!("Ignoring settings file: {}", e);
    }

    // Fetch and decode work runs here, off the UI thread
    let workers = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(settings.worker_threads)
        .thread_name("photo-worker")
        .enable_all()
        .build()?;

    let picker = FilePicker::new(workers.handle().clone(), settings.max_file_bytes);
    tracing::info!("Profile editor starting ({:?})", settings);

    iced::application("Profile Editor", ProfileEditor::update, ProfileEditor::view)
        .subscription(ProfileEditor::subscription)
        .theme(ProfileEditor::theme)
        .centered()
        .run_with(move || ProfileEditor::new(picker, &settings))?;

    Ok(())
}
