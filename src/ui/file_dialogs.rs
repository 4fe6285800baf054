use std::path::{Path, PathBuf};

use fltk::dialog::{self, FileDialogOptions, FileDialogType, NativeFileChooser};

use crate::app::controllers::host::{CloseChoice, Dialogs};
use crate::app::file_filters::{get_document_filter_multiline, get_image_filter, get_save_filter};

/// Native file choosers and FLTK message boxes.
#[derive(Debug, Default)]
pub struct FltkDialogs;

fn chooser(
    kind: FileDialogType,
    title: &str,
    filter: &str,
    start_dir: Option<&Path>,
) -> NativeFileChooser {
    let mut nfc = NativeFileChooser::new(kind);
    nfc.set_title(title);
    nfc.set_filter(filter);
    if let Some(dir) = start_dir {
        if let Err(e) = nfc.set_directory(&dir) {
            tracing::debug!(dir = %dir.display(), "could not preset dialog directory: {:?}", e);
        }
    }
    nfc
}

fn chosen_path(mut nfc: NativeFileChooser) -> Option<PathBuf> {
    nfc.show(); // blocks until close
    let filename = nfc.filename();
    if filename.as_os_str().is_empty() {
        None
    } else {
        Some(filename)
    }
}

impl Dialogs for FltkDialogs {
    fn pick_open_path(&mut self, start_dir: Option<&Path>) -> Option<PathBuf> {
        let nfc = chooser(
            FileDialogType::BrowseFile,
            "Open File",
            &get_document_filter_multiline(),
            start_dir,
        );
        chosen_path(nfc)
    }

    fn pick_save_path(&mut self, default_path: &Path) -> Option<PathBuf> {
        let start_dir = default_path.parent().filter(|p| !p.as_os_str().is_empty());
        let mut nfc = chooser(
            FileDialogType::BrowseSaveFile,
            "Save As",
            &get_save_filter(),
            start_dir,
        );
        nfc.set_option(FileDialogOptions::SaveAsConfirm);
        if let Some(name) = default_path.file_name() {
            nfc.set_preset_file(&name.to_string_lossy());
        }
        chosen_path(nfc)
    }

    fn pick_image_path(&mut self, start_dir: Option<&Path>) -> Option<PathBuf> {
        let nfc = chooser(
            FileDialogType::BrowseFile,
            "Insert Image",
            &get_image_filter(),
            start_dir,
        );
        chosen_path(nfc)
    }

    fn confirm_unsaved_changes(&mut self, document_name: &str) -> CloseChoice {
        dialog::message_title("Unsaved Changes");
        let choice = dialog::choice2_default(
            &format!(
                "Do you want to save the changes you made to {}?\nYour changes will be lost if you don't save them.",
                document_name
            ),
            "Save",
            "Don't Save",
            "Cancel",
        );
        match choice {
            Some(0) => CloseChoice::Save,
            Some(1) => CloseChoice::Discard,
            _ => CloseChoice::Cancel,
        }
    }

    fn warn(&mut self, title: &str, message: &str) {
        dialog::message_title(title);
        dialog::message_default(message);
    }

    fn error(&mut self, title: &str, message: &str) {
        dialog::message_title(title);
        dialog::alert_default(message);
    }
}
