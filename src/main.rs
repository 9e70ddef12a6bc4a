use iced::widget::{row, vertical_rule};
use iced::{event, time, window, Element, Event, Size, Subscription, Task, Theme};
use rfd::FileDialog;
use std::path::PathBuf;
use std::time::Duration;
use chrono::Utc;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod export;
mod gateway;
mod state;
mod ui;

use config::{Credential, Settings};
use gateway::GeminiClient;
use state::ingest::{self, LoadedFile, Target};
use state::presets::{self, StylePreset};
use state::{CompositionMode, EditSession, Pane, Transition};
use ui::preview::PreviewCache;

/// Below this window width only one pane is shown, with tabs
const NARROW_LAYOUT_WIDTH: f32 = 900.0;

/// Extensions offered by the file picker's image filter
const IMAGE_EXTENSIONS: [&str; 7] = ["png", "jpg", "jpeg", "webp", "gif", "bmp", "tiff"];

/// Frame interval of the progress animation
const PROGRESS_FRAME: Duration = Duration::from_millis(40);

/// Main application state
struct MagicLens {
    /// The one editing session; replaced wholesale on every transition
    session: EditSession,
    /// Decoded-image handles for the session's images
    previews: PreviewCache,
    /// Client for the remote image model
    gateway: GeminiClient,
    settings: Settings,
    /// Current window width, drives the narrow/wide layout
    viewport_width: f32,
    /// A file is being dragged over the window
    drop_hover: bool,
    /// A dropped file is still being read; later files of the same drop are ignored
    drop_pending: bool,
    /// Animation tick of the progress bar while an edit runs
    progress_tick: u32,
    /// Outcome of the last download
    status: Option<String>,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    /// User clicked the upload zone
    PickSource,
    /// User clicked the reference image button (composition mode)
    PickReference,
    /// A file was dropped anywhere on the window
    FileDropped(PathBuf),
    FileHovered,
    FileHoverLeft,
    /// Background file read finished
    FileRead(Target, Result<LoadedFile, String>),
    InstructionChanged(String),
    PresetPicked(&'static str),
    StylePicked(&'static StylePreset),
    CompositionPicked(CompositionMode),
    /// Generate button (also retries after a failure)
    Generate,
    /// The gateway call resolved, already mapped to a transition
    EditFinished(Transition),
    PaneSelected(Pane),
    Reset,
    Download,
    Downloaded(Result<PathBuf, String>),
    WindowResized(Size),
    ProgressTick,
}

impl MagicLens {
    /// Create a new instance of the application
    fn new() -> (Self, Task<Message>) {
        let settings = Settings::load();
        let gateway = GeminiClient::new(&settings, Credential::from_env());

        if gateway.has_credential() {
            info!(model = %settings.model, "Magic Lens initialized");
        } else {
            warn!("no API key found in GEMINI_API_KEY or API_KEY; edits will fail until one is set");
        }

        (
            MagicLens {
                session: EditSession::new(),
                previews: PreviewCache::default(),
                gateway,
                settings,
                viewport_width: 1280.0,
                drop_hover: false,
                drop_pending: false,
                progress_tick: 0,
                status: None,
            },
            Task::none(),
        )
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::PickSource => self.pick_file(Target::Source),
            Message::PickReference => self.pick_file(Target::Reference),
            Message::FileDropped(path) => {
                self.drop_hover = false;
                match self.drop_target() {
                    Some(target) => {
                        self.drop_pending = true;
                        self.read_file(path, target)
                    }
                    None => {
                        debug!(path = %path.display(), "drop ignored");
                        Task::none()
                    }
                }
            }
            Message::FileHovered => {
                self.drop_hover = true;
                Task::none()
            }
            Message::FileHoverLeft => {
                self.drop_hover = false;
                Task::none()
            }
            Message::FileRead(target, result) => {
                self.drop_pending = false;
                let transition = ingested(target, result);
                self.apply(transition);
                Task::none()
            }
            Message::InstructionChanged(text) => {
                self.apply(Transition::InstructionEdited(text));
                Task::none()
            }
            Message::PresetPicked(id) => {
                match presets::preset(id) {
                    Some(preset) => self.apply(Transition::PresetSelected(preset)),
                    None => warn!(id, "unknown preset"),
                }
                Task::none()
            }
            Message::StylePicked(style) => {
                self.apply(Transition::StyleSelected(style));
                Task::none()
            }
            Message::CompositionPicked(mode) => {
                self.apply(Transition::CompositionToggled(mode));
                Task::none()
            }
            Message::Generate => {
                self.progress_tick = 0;
                self.start_edit()
            }
            Message::EditFinished(transition) => {
                self.apply(transition);
                Task::none()
            }
            Message::PaneSelected(pane) => {
                self.apply(Transition::PaneSelected(pane));
                Task::none()
            }
            Message::Reset => {
                self.status = None;
                self.apply(Transition::Reset);
                Task::none()
            }
            Message::Download => self.download(),
            Message::Downloaded(result) => {
                self.status = Some(match result {
                    Ok(path) => format!("已保存到 {}", path.display()),
                    Err(message) => {
                        warn!(error = %message, "download failed");
                        message
                    }
                });
                Task::none()
            }
            Message::WindowResized(size) => {
                self.viewport_width = size.width;
                Task::none()
            }
            Message::ProgressTick => {
                self.progress_tick = self.progress_tick.wrapping_add(1);
                Task::none()
            }
        }
    }

    /// Replace the session with the result of a transition
    fn apply(&mut self, transition: Transition) {
        self.session = self.session.apply(transition);
        self.previews.sync(&self.session);
    }

    /// Show the native file picker (blocking, like any modal dialog)
    fn pick_file(&mut self, target: Target) -> Task<Message> {
        let title = match target {
            Target::Source => "选择要编辑的图片",
            Target::Reference => "选择参考图片",
        };

        let file = FileDialog::new()
            .set_title(title)
            .add_filter("图片", &IMAGE_EXTENSIONS)
            .add_filter("所有文件", &["*"])
            .pick_file();

        match file {
            Some(path) => self.read_file(path, target),
            None => Task::none(),
        }
    }

    /// Where a dropped file goes, or `None` when drops are not taken
    ///
    /// Nothing is accepted while an edit runs, and only the first file of a
    /// multi-file drop is read. Drops go to the reference slot only while
    /// composing with a source loaded.
    fn drop_target(&self) -> Option<Target> {
        if self.session.is_editing() || self.drop_pending {
            return None;
        }

        if self.session.composition() == CompositionMode::Image && self.session.source().is_some() {
            Some(Target::Reference)
        } else {
            Some(Target::Source)
        }
    }

    /// Read a picked or dropped file off the UI thread
    fn read_file(&self, path: PathBuf, target: Target) -> Task<Message> {
        debug!(path = %path.display(), ?target, "reading file");
        Task::perform(
            async move { ingest::read_file(path).await.map_err(|err| err.to_string()) },
            move |result| Message::FileRead(target, result),
        )
    }

    /// Fire the single outstanding edit request
    fn start_edit(&mut self) -> Task<Message> {
        if !self.session.can_start_edit() {
            debug!("generate ignored: missing input or edit already running");
            return Task::none();
        }

        self.apply(Transition::StartEdit);

        let Some(request) = self.session.edit_request() else {
            return Task::none();
        };
        let client = self.gateway.clone();

        Task::perform(
            async move { gateway::outcome(client.submit_edit(&request).await) },
            Message::EditFinished,
        )
    }

    /// Offer the result through a save dialog
    fn download(&mut self) -> Task<Message> {
        let Some(result) = self.session.result().cloned() else {
            return Task::none();
        };

        let start_dir = self.settings.download_dir();
        let Some(destination) = export::pick_destination(start_dir.as_deref(), Utc::now()) else {
            return Task::none();
        };

        Task::perform(export::save_result(Some(result), destination), |saved| {
            Message::Downloaded(saved.map_err(|err| err.to_string()))
        })
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let narrow = self.viewport_width < NARROW_LAYOUT_WIDTH;

        row![
            ui::controls::sidebar(&self.session, &self.previews, self.drop_hover),
            vertical_rule(1),
            ui::panes::canvas_area(
                &self.session,
                &self.previews,
                narrow,
                ui::panes::sweep(self.progress_tick),
                self.status.as_deref(),
            ),
        ]
        .into()
    }

    /// File drops, window resizes and, while editing, the progress animation
    fn subscription(&self) -> Subscription<Message> {
        let progress = if self.session.is_editing() {
            time::every(PROGRESS_FRAME).map(|_| Message::ProgressTick)
        } else {
            Subscription::none()
        };

        Subscription::batch([
            event::listen_with(window_events),
            window::resize_events().map(|(_id, size)| Message::WindowResized(size)),
            progress,
        ])
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

/// Turn a finished file read into the matching session transition
///
/// Source and reference files share the same validation.
fn ingested(target: Target, result: Result<LoadedFile, String>) -> Transition {
    let file = match result {
        Ok(file) => file,
        Err(message) => {
            warn!(error = %message, "could not read file");
            return Transition::UploadRejected(message);
        }
    };

    match ingest::ingest(file.bytes, &file.declared_type) {
        Ok(image) => {
            info!(file = %file.name, ?target, "image ingested");
            match target {
                Target::Source => Transition::SourceLoaded(image),
                Target::Reference => Transition::ReferenceLoaded(image),
            }
        }
        Err(err) => {
            warn!(file = %file.name, declared_type = %file.declared_type, "rejected non-image file");
            Transition::UploadRejected(err.to_string())
        }
    }
}

fn window_events(event: Event, _status: event::Status, _id: window::Id) -> Option<Message> {
    match event {
        Event::Window(window::Event::FileDropped(path)) => Some(Message::FileDropped(path)),
        Event::Window(window::Event::FileHovered(_)) => Some(Message::FileHovered),
        Event::Window(window::Event::FilesHoveredLeft) => Some(Message::FileHoverLeft),
        _ => None,
    }
}

/// Log to stderr; `RUST_LOG` overrides the default level
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("magic_lens=info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> iced::Result {
    init_tracing();

    iced::application(
        "Magic Lens",
        MagicLens::update,
        MagicLens::view,
    )
    .subscription(MagicLens::subscription)
    .theme(MagicLens::theme)
    .window_size((1280.0, 820.0))
    .centered()
    .run_with(MagicLens::new)
}
