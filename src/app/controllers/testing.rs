//! In-memory window and dialog providers for controller tests.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use super::host::{CloseChoice, Dialogs, HostWindow, UiEvent, WindowBackend, WindowOptions};
use crate::app::infrastructure::error::Result;

#[derive(Debug, Default)]
pub struct WindowLog {
    pub titles: Vec<String>,
    pub edited_marks: Vec<bool>,
    pub events: Vec<UiEvent>,
    pub focus_count: usize,
    pub destroyed: bool,
    pub text: String,
}

impl WindowLog {
    pub fn last_title(&self) -> Option<&str> {
        self.titles.last().map(|s| s.as_str())
    }

    pub fn opened_paths(&self) -> Vec<PathBuf> {
        self.events
            .iter()
            .filter_map(|e| match e {
                UiEvent::FileOpened(f) => Some(f.path.clone()),
                _ => None,
            })
            .collect()
    }
}

pub struct FakeWindow {
    log: Rc<RefCell<WindowLog>>,
}

impl HostWindow for FakeWindow {
    fn is_destroyed(&self) -> bool {
        self.log.borrow().destroyed
    }

    fn set_title(&mut self, title: &str) {
        self.log.borrow_mut().titles.push(title.to_string());
    }

    fn set_document_edited(&mut self, edited: bool) {
        self.log.borrow_mut().edited_marks.push(edited);
    }

    fn focus(&mut self) {
        self.log.borrow_mut().focus_count += 1;
    }

    fn destroy(&mut self) {
        self.log.borrow_mut().destroyed = true;
    }

    fn notify(&mut self, event: UiEvent) {
        self.log.borrow_mut().events.push(event);
    }

    fn document_text(&self) -> String {
        self.log.borrow().text.clone()
    }
}

/// Hands out `FakeWindow`s and keeps a log handle for each one.
#[derive(Default, Clone)]
pub struct FakeBackend {
    pub windows: Rc<RefCell<Vec<Rc<RefCell<WindowLog>>>>>,
}

impl FakeBackend {
    pub fn created(&self) -> usize {
        self.windows.borrow().len()
    }

    /// Log of the most recently created window.
    pub fn latest(&self) -> Rc<RefCell<WindowLog>> {
        self.windows
            .borrow()
            .last()
            .cloned()
            .expect("no window was created")
    }
}

impl WindowBackend for FakeBackend {
    type Window = FakeWindow;

    fn create_window(&mut self, _options: &WindowOptions) -> Result<FakeWindow> {
        let log = Rc::new(RefCell::new(WindowLog::default()));
        self.windows.borrow_mut().push(log.clone());
        Ok(FakeWindow { log })
    }
}

/// Scripted dialog answers. Unscripted pickers behave as if cancelled and
/// unscripted close prompts answer `Cancel`.
#[derive(Default)]
pub struct FakeDialogs {
    pub open_answers: VecDeque<Option<PathBuf>>,
    pub save_answers: VecDeque<Option<PathBuf>>,
    pub image_answers: VecDeque<Option<PathBuf>>,
    pub close_answers: VecDeque<CloseChoice>,
    pub save_defaults: Vec<PathBuf>,
    pub open_start_dirs: Vec<Option<PathBuf>>,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
    pub prompts: usize,
}

impl FakeDialogs {
    pub fn answer_open(mut self, path: Option<PathBuf>) -> Self {
        self.open_answers.push_back(path);
        self
    }

    pub fn answer_save(mut self, path: Option<PathBuf>) -> Self {
        self.save_answers.push_back(path);
        self
    }

    pub fn answer_image(mut self, path: Option<PathBuf>) -> Self {
        self.image_answers.push_back(path);
        self
    }

    pub fn answer_close(mut self, choice: CloseChoice) -> Self {
        self.close_answers.push_back(choice);
        self
    }
}

impl Dialogs for FakeDialogs {
    fn pick_open_path(&mut self, start_dir: Option<&Path>) -> Option<PathBuf> {
        self.open_start_dirs.push(start_dir.map(Path::to_path_buf));
        self.open_answers.pop_front().flatten()
    }

    fn pick_save_path(&mut self, default_path: &Path) -> Option<PathBuf> {
        self.save_defaults.push(default_path.to_path_buf());
        self.save_answers.pop_front().flatten()
    }

    fn pick_image_path(&mut self, _start_dir: Option<&Path>) -> Option<PathBuf> {
        self.image_answers.pop_front().flatten()
    }

    fn confirm_unsaved_changes(&mut self, _document_name: &str) -> CloseChoice {
        self.prompts += 1;
        self.close_answers.pop_front().unwrap_or(CloseChoice::Cancel)
    }

    fn warn(&mut self, title: &str, _message: &str) {
        self.warnings.push(title.to_string());
    }

    fn error(&mut self, title: &str, message: &str) {
        self.errors.push(format!("{}: {}", title, message));
    }
}
