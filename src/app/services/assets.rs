//! Image assets stored next to the document that references them.
//!
//! Layout: `{document dir}/assets/image_{unix millis}_{8 hex}.{ext}`. The
//! path handed back to the editor is always relative and uses `/`, so it
//! can be embedded in markdown as-is.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::app::infrastructure::error::{AppError, Result};

pub const ASSETS_DIR: &str = "assets";

/// Attempts before giving up on finding an unused name.
const MAX_NAME_ATTEMPTS: usize = 8;

pub fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
}

/// Lowercase, strip a leading dot, fall back to `png`.
pub fn normalize_extension(extension: &str) -> String {
    let ext = extension.trim().trim_start_matches('.').to_ascii_lowercase();
    if ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        "png".to_string()
    } else {
        ext
    }
}

/// Build an asset file name for the given timestamp with a fresh random
/// suffix.
pub fn generate_asset_name_at(timestamp_millis: u128, extension: &str) -> String {
    let random = uuid::Uuid::new_v4();
    format!(
        "image_{}_{}.{}",
        timestamp_millis,
        hex::encode(&random.as_bytes()[..4]),
        normalize_extension(extension)
    )
}

pub fn generate_asset_name(extension: &str) -> String {
    generate_asset_name_at(now_millis(), extension)
}

/// Write `bytes` into the assets directory beside `document` and return the
/// document-relative path of the new file.
pub fn write_asset(document: &Path, bytes: &[u8], extension: &str) -> Result<String> {
    let doc_dir = document
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let assets_dir = doc_dir.join(ASSETS_DIR);
    fs::create_dir_all(&assets_dir)?;

    for _ in 0..MAX_NAME_ATTEMPTS {
        let name = generate_asset_name(extension);
        let target = assets_dir.join(&name);
        let mut file = match OpenOptions::new().write(true).create_new(true).open(&target) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e.into()),
        };
        if let Err(e) = file.write_all(bytes) {
            drop(file);
            let _ = fs::remove_file(&target);
            return Err(e.into());
        }
        tracing::debug!(path = %target.display(), size = bytes.len(), "wrote image asset");
        return Ok(format!("{}/{}", ASSETS_DIR, name));
    }

    Err(AppError::Io(std::io::Error::new(
        ErrorKind::AlreadyExists,
        "could not find an unused asset file name",
    )))
}
