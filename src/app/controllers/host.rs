//! Seams between the controllers and the GUI runtime.
//!
//! The controllers only talk to the window and to modal dialogs through
//! these traits. `crate::ui` implements them with FLTK; tests use fakes.

use std::path::{Path, PathBuf};

use crate::app::domain::OpenedFile;
use crate::app::infrastructure::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowOptions {
    pub title: String,
    pub width: i32,
    pub height: i32,
    pub min_width: i32,
    pub min_height: i32,
}

/// One-way notifications from the host to the editing surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    /// Replace the editor content with a freshly opened document.
    FileOpened(OpenedFile),
    /// Ask the editing surface to hand its content to the save path.
    SaveRequested,
    /// Insert text at the cursor (used for image links).
    InsertText(String),
}

/// A live top-level window.
pub trait HostWindow {
    fn is_destroyed(&self) -> bool;
    fn set_title(&mut self, title: &str);
    /// Native "unsaved changes" decoration; may be a no-op.
    fn set_document_edited(&mut self, edited: bool);
    /// Restore if minimized and raise.
    fn focus(&mut self);
    fn destroy(&mut self);
    fn notify(&mut self, event: UiEvent);
    /// Current content of the editing surface.
    fn document_text(&self) -> String;
}

/// Builds windows. The window reports "finished loading" asynchronously,
/// through the message channel, once it can accept documents.
pub trait WindowBackend {
    type Window: HostWindow;

    fn create_window(&mut self, options: &WindowOptions) -> Result<Self::Window>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseChoice {
    Save,
    Discard,
    Cancel,
}

/// Blocking modal dialogs. Pickers return `None` when the user cancels.
pub trait Dialogs {
    fn pick_open_path(&mut self, start_dir: Option<&Path>) -> Option<PathBuf>;
    fn pick_save_path(&mut self, default_path: &Path) -> Option<PathBuf>;
    fn pick_image_path(&mut self, start_dir: Option<&Path>) -> Option<PathBuf>;
    fn confirm_unsaved_changes(&mut self, document_name: &str) -> CloseChoice;
    fn warn(&mut self, title: &str, message: &str);
    fn error(&mut self, title: &str, message: &str);
}
