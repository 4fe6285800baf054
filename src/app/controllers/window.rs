use std::path::PathBuf;

use super::host::{CloseChoice, Dialogs, HostWindow, UiEvent, WindowBackend, WindowOptions};
use crate::app::domain::{AppSettings, Session};
use crate::app::infrastructure::error::{AppError, Result};
use crate::app::infrastructure::platform::supports_native_edited_indicator;
use crate::app::services::text_ops::extract_filename;

pub const UNTITLED: &str = "Untitled";

/// Result of a close request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    /// The window was destroyed and the session reset.
    Closed,
    /// The user chose Save; the editing surface was asked for its content
    /// and the window stays open until the save completes.
    SaveRequested,
    Cancelled,
}

/// `{*}{file name or "Untitled"} - {app name}`, the star marking unsaved edits.
pub fn window_title(session: &Session, app_name: &str) -> String {
    let marker = if session.is_edited() { "*" } else { "" };
    format!("{}{} - {}", marker, document_name(session), app_name)
}

fn document_name(session: &Session) -> String {
    session
        .file_path()
        .map(extract_filename)
        .unwrap_or_else(|| UNTITLED.to_string())
}

struct WindowSlot<W> {
    handle: W,
    /// Set once the window reports it has finished loading.
    ready: bool,
}

/// Owns the application's single window.
pub struct WindowCoordinator<B: WindowBackend> {
    backend: B,
    slot: Option<WindowSlot<B::Window>>,
    options: WindowOptions,
    app_name: String,
}

impl<B: WindowBackend> WindowCoordinator<B> {
    pub fn new(backend: B, app_name: &str, settings: &AppSettings) -> Self {
        let options = WindowOptions {
            title: app_name.to_string(),
            width: settings.window_width,
            height: settings.window_height,
            min_width: settings.min_width,
            min_height: settings.min_height,
        };
        Self {
            backend,
            slot: None,
            options,
            app_name: app_name.to_string(),
        }
    }

    /// Build the window. At most one live window exists at a time.
    pub fn create_window(&mut self, session: &Session) -> Result<()> {
        if self.is_window_valid() {
            return Err(AppError::WindowExists);
        }
        let handle = self.backend.create_window(&self.options)?;
        self.slot = Some(WindowSlot {
            handle,
            ready: false,
        });
        self.update_title(session);
        tracing::info!("window created");
        Ok(())
    }

    pub fn is_window_valid(&self) -> bool {
        self.slot
            .as_ref()
            .is_some_and(|slot| !slot.handle.is_destroyed())
    }

    /// True once a valid window has finished loading.
    pub fn is_ready(&self) -> bool {
        self.slot
            .as_ref()
            .is_some_and(|slot| slot.ready && !slot.handle.is_destroyed())
    }

    pub fn window(&self) -> Option<&B::Window> {
        self.slot
            .as_ref()
            .filter(|slot| !slot.handle.is_destroyed())
            .map(|slot| &slot.handle)
    }

    fn live(&mut self) -> Option<&mut B::Window> {
        self.slot
            .as_mut()
            .filter(|slot| !slot.handle.is_destroyed())
            .map(|slot| &mut slot.handle)
    }

    pub fn update_title(&mut self, session: &Session) {
        let title = window_title(session, &self.app_name);
        let edited = session.is_edited();
        if let Some(window) = self.live() {
            window.set_title(&title);
            if supports_native_edited_indicator() {
                window.set_document_edited(edited);
            }
        }
    }

    /// "Finished loading" hook: mark the window ready and hand back the
    /// staged file, if any. The pending slot is left alone when there is no
    /// valid window to load into.
    pub fn finish_loading(&mut self, session: &mut Session) -> Option<PathBuf> {
        let slot = self
            .slot
            .as_mut()
            .filter(|slot| !slot.handle.is_destroyed())?;
        slot.ready = true;
        tracing::debug!("window finished loading");
        session.take_pending()
    }

    pub fn focus(&mut self) {
        if let Some(window) = self.live() {
            window.focus();
        }
    }

    pub fn notify(&mut self, event: UiEvent) {
        match self.live() {
            Some(window) => window.notify(event),
            None => tracing::debug!(?event, "dropping UI event, no window"),
        }
    }

    pub fn document_text(&self) -> Option<String> {
        self.window().map(|w| w.document_text())
    }

    /// Close-request hook. Clean documents close at once; dirty ones ask
    /// the user to save, discard or cancel.
    pub fn request_close<D: Dialogs>(
        &mut self,
        session: &mut Session,
        dialogs: &mut D,
    ) -> CloseOutcome {
        if !self.is_window_valid() || !session.is_edited() {
            self.destroy_window(session);
            return CloseOutcome::Closed;
        }

        match dialogs.confirm_unsaved_changes(&document_name(session)) {
            CloseChoice::Save => {
                self.notify(UiEvent::SaveRequested);
                CloseOutcome::SaveRequested
            }
            CloseChoice::Discard => {
                session.set_edited(false);
                self.destroy_window(session);
                CloseOutcome::Closed
            }
            CloseChoice::Cancel => CloseOutcome::Cancelled,
        }
    }

    /// Tear the window down, drop the handle and reset the session.
    pub fn destroy_window(&mut self, session: &mut Session) {
        if let Some(mut slot) = self.slot.take() {
            if !slot.handle.is_destroyed() {
                slot.handle.destroy();
            }
            tracing::info!("window destroyed");
        }
        session.reset();
    }
}
