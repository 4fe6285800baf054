use std::path::PathBuf;

use crate::app::services::instance::InstanceSignal;

/// All messages that can be sent through the FLTK channel.
/// Menu callbacks, window hooks and the instance listener send these;
/// the dispatch loop in main hands them to `AppState::dispatch`.
#[derive(Debug, Clone)]
pub enum Message {
    // File
    FileOpen,
    FileSave,
    FileSaveAs,
    FileQuit,
    InsertImage,

    // Window hooks
    WindowLoaded,
    WindowCloseRequested,
    DocumentEdited,

    // Launch
    OpenFileEvent(PathBuf),
    SecondInstance(InstanceSignal),
}
