use std::path::{Path, PathBuf};

/// A single-slot mailbox for a file that should be opened once the window
/// is able to show it.
///
/// The only way to read the slot is [`PendingFile::take`], which empties it,
/// so a staged path can never be delivered twice.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PendingFile(Option<PathBuf>);

impl PendingFile {
    /// Stage a path, replacing whatever was staged before. Only the most
    /// recent launch request is opened; earlier ones are dropped on purpose.
    pub fn stage(&mut self, path: PathBuf) {
        self.0 = Some(path);
    }

    pub fn take(&mut self) -> Option<PathBuf> {
        self.0.take()
    }

    pub fn is_staged(&self) -> bool {
        self.0.is_some()
    }

    pub fn clear(&mut self) {
        self.0 = None;
    }
}

/// Which document is open and whether it has unsaved edits.
#[derive(Debug, Default)]
pub struct Session {
    file_path: Option<PathBuf>,
    is_edited: bool,
    pending: PendingFile,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    pub fn is_edited(&self) -> bool {
        self.is_edited
    }

    pub fn set_edited(&mut self, edited: bool) {
        self.is_edited = edited;
    }

    /// Record a completed open or save-as: new path, clean buffer.
    pub fn mark_loaded(&mut self, path: PathBuf) {
        self.file_path = Some(path);
        self.is_edited = false;
    }

    pub fn stage_pending(&mut self, path: PathBuf) {
        self.pending.stage(path);
    }

    pub fn take_pending(&mut self) -> Option<PathBuf> {
        self.pending.take()
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_staged()
    }

    pub fn reset(&mut self) {
        self.file_path = None;
        self.is_edited = false;
        self.pending.clear();
    }
}
