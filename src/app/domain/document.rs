use std::path::PathBuf;

use crate::app::services::text_ops::extract_filename;

/// A document that was read from disk and is ready to be shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenedFile {
    pub path: PathBuf,
    pub content: String,
    pub file_name: String,
}

impl OpenedFile {
    pub fn new(path: PathBuf, content: String) -> Self {
        let file_name = extract_filename(&path);
        Self {
            path,
            content,
            file_name,
        }
    }
}
