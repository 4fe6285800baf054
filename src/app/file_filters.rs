use std::path::Path;

/// Extensions the editor treats as documents.
pub const DOCUMENT_EXTENSIONS: &[&str] = &["md", "markdown", "txt"];

/// Extensions accepted when inserting an image into a document.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "bmp", "svg", "ico"];

/// Filter for the Open dialog.
///
/// FLTK format: "Description\tPattern\nDescription2\tPattern2"
/// Note: FLTK automatically adds "All Files (*)" option, so we don't include it
pub fn get_document_filter_multiline() -> String {
    ["Markdown Files\t*.{md,markdown}", "Text Files\t*.txt"].join("\n")
}

/// Filter for Save and Save As dialogs.
pub fn get_save_filter() -> String {
    "Markdown Files\t*.md".to_string()
}

pub fn get_image_filter() -> String {
    format!("Images\t*.{{{}}}", IMAGE_EXTENSIONS.join(","))
}

/// True if the path ends in a document extension (case-insensitive).
pub fn is_document_path(path: &Path) -> bool {
    extension_in(path, DOCUMENT_EXTENSIONS)
}

pub fn is_image_path(path: &Path) -> bool {
    extension_in(path, IMAGE_EXTENSIONS)
}

fn extension_in(path: &Path, set: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| set.iter().any(|known| known.eq_ignore_ascii_case(e)))
        .unwrap_or(false)
}
