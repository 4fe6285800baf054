use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use super::controllers::files::FileOperations;
use super::controllers::host::{Dialogs, UiEvent, WindowBackend};
use super::controllers::launch::{LaunchContext, LaunchCoordinator};
use super::controllers::window::{CloseOutcome, WindowCoordinator};
use super::domain::{AppSettings, Message, Session};
use super::file_filters::is_image_path;
use super::infrastructure::error::{AppError, Result};
use super::services::instance::InstanceSignal;

/// Owns the session and every controller, and routes channel messages to
/// them. Generic over the window backend and dialog provider so the whole
/// flow runs headless in tests.
pub struct AppState<B: WindowBackend, D: Dialogs> {
    pub session: Session,
    pub windows: WindowCoordinator<B>,
    pub files: FileOperations,
    pub launch: LaunchCoordinator,
    pub dialogs: D,
    pub settings: AppSettings,
    /// Where settings are persisted on close; `None` keeps them in memory.
    settings_path: Option<PathBuf>,
    /// Set when the user picked Save in the unsaved-changes prompt. The
    /// close is retried once that save completes.
    close_after_save: bool,
}

impl<B: WindowBackend, D: Dialogs> AppState<B, D> {
    pub fn new(backend: B, dialogs: D, app_name: &str, settings: AppSettings) -> Self {
        let windows = WindowCoordinator::new(backend, app_name, &settings);
        let files = FileOperations::new(settings.start_directory());
        Self {
            session: Session::new(),
            windows,
            files,
            launch: LaunchCoordinator::new(),
            dialogs,
            settings,
            settings_path: None,
            close_after_save: false,
        }
    }

    pub fn with_settings_path(mut self, path: PathBuf) -> Self {
        self.settings_path = Some(path);
        self
    }

    /// Stage the launch document and open the window. `args` are this
    /// process's raw arguments, without the program name.
    pub fn start(&mut self, args: &[OsString], cwd: &Path) -> Result<()> {
        let mut ctx = LaunchContext {
            session: &mut self.session,
            windows: &mut self.windows,
            files: &mut self.files,
        };
        self.launch.start(args, cwd, &mut ctx);
        if self.windows.is_window_valid() {
            Ok(())
        } else {
            Err(AppError::WindowUnavailable)
        }
    }

    /// Handle one message. Returns false once there is no window left and
    /// the event loop should stop.
    pub fn dispatch(&mut self, msg: Message) -> bool {
        match msg {
            Message::FileOpen => self.file_open(),
            Message::FileSave => self.file_save(),
            Message::FileSaveAs => self.file_save_as(),
            Message::FileQuit | Message::WindowCloseRequested => self.request_close(),
            Message::InsertImage => self.insert_image(),
            Message::DocumentEdited => {
                self.files
                    .set_document_edited(true, &mut self.session, &mut self.windows);
            }
            Message::WindowLoaded => {
                let mut ctx = LaunchContext {
                    session: &mut self.session,
                    windows: &mut self.windows,
                    files: &mut self.files,
                };
                self.launch.on_window_ready(&mut ctx);
            }
            Message::OpenFileEvent(path) => {
                let mut ctx = LaunchContext {
                    session: &mut self.session,
                    windows: &mut self.windows,
                    files: &mut self.files,
                };
                self.launch.on_open_file_event(path, &mut ctx);
            }
            Message::SecondInstance(signal) => self.second_instance(&signal),
        }
        self.windows.is_window_valid()
    }

    fn second_instance(&mut self, signal: &InstanceSignal) {
        let mut ctx = LaunchContext {
            session: &mut self.session,
            windows: &mut self.windows,
            files: &mut self.files,
        };
        self.launch.on_second_instance(signal, &mut ctx);
    }

    pub fn file_open(&mut self) {
        match self
            .files
            .open(&mut self.session, &mut self.windows, &mut self.dialogs)
        {
            Ok(Some(opened)) => self.windows.notify(UiEvent::FileOpened(opened)),
            Ok(None) => {}
            Err(e) => self
                .dialogs
                .error("Error opening file", &format!("Error opening file: {}", e)),
        }
    }

    pub fn file_save(&mut self) {
        let Some(text) = self.windows.document_text() else {
            self.close_after_save = false;
            return;
        };
        let result = self
            .files
            .save(&text, &mut self.session, &mut self.windows, &mut self.dialogs);
        let close_pending = std::mem::take(&mut self.close_after_save);

        match result {
            Ok(true) if close_pending => self.request_close(),
            Ok(_) => {}
            Err(e) => self
                .dialogs
                .error("Error saving file", &format!("Error saving file: {}", e)),
        }
    }

    pub fn file_save_as(&mut self) {
        let Some(text) = self.windows.document_text() else {
            return;
        };
        if let Err(e) = self
            .files
            .save_as(&text, &mut self.session, &mut self.windows, &mut self.dialogs)
        {
            self.dialogs
                .error("Error saving file", &format!("Error saving file: {}", e));
        }
    }

    /// Close request from the window manager or File/Quit.
    pub fn request_close(&mut self) {
        match self.windows.request_close(&mut self.session, &mut self.dialogs) {
            CloseOutcome::Closed => self.persist_settings(),
            CloseOutcome::SaveRequested => self.close_after_save = true,
            CloseOutcome::Cancelled => {}
        }
    }

    /// Pick an image, copy it into the document's assets folder and insert
    /// a markdown link at the cursor.
    pub fn insert_image(&mut self) {
        let start_dir = self.session.file_path().and_then(Path::parent);
        let Some(image) = self.dialogs.pick_image_path(start_dir) else {
            return;
        };
        if !is_image_path(&image) {
            self.dialogs.warn(
                "Unsupported image",
                &format!("{} is not a supported image type.", image.display()),
            );
            return;
        }

        let bytes = match fs::read(&image) {
            Ok(bytes) => bytes,
            Err(e) => {
                self.dialogs.error(
                    "Failed to read image",
                    &format!("Could not read {}: {}", image.display(), e),
                );
                return;
            }
        };
        let extension = image
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();

        if let Some(relative) = self
            .files
            .save_image(&bytes, extension, &self.session, &mut self.dialogs)
        {
            self.windows
                .notify(UiEvent::InsertText(format!("![image]({})", relative)));
        }
    }

    fn persist_settings(&mut self) {
        let Some(path) = self.settings_path.as_deref() else {
            return;
        };
        if self.settings.remember_last_directory {
            self.settings.last_open_directory = self
                .files
                .last_directory()
                .map(|dir| dir.to_string_lossy().to_string());
        }
        if let Err(e) = self.settings.save_to(path) {
            tracing::warn!("failed to save settings: {}", e);
        }
    }
}
