use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use crate::app::file_filters::is_document_path;

/// Extract filename from a file path
///
/// Returns the filename component of a path, or "Unknown" if it can't be extracted.
pub fn extract_filename(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .filter(|s| !s.is_empty() && *s != ".")
        .map(|s| s.to_string())
        .unwrap_or_else(|| "Unknown".to_string())
}

/// First command-line argument that names a markdown or text document.
///
/// Arguments are taken as `OsStr` so file names that are not valid UTF-8
/// come back byte for byte.
pub fn find_document_arg<S: AsRef<OsStr>>(args: &[S]) -> Option<&Path> {
    args.iter()
        .map(|a| a.as_ref())
        .filter(|a| a.as_encoded_bytes().first() != Some(&b'-'))
        .map(Path::new)
        .find(|p| is_document_path(p))
}

/// Resolve a possibly relative argument against the working directory of
/// the process that supplied it.
pub fn resolve_against(cwd: &Path, arg: &Path) -> PathBuf {
    if arg.is_absolute() {
        arg.to_path_buf()
    } else {
        cwd.join(arg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_filename_from_path() {
        assert_eq!(extract_filename(Path::new("/home/user/test.md")), "test.md");
        assert_eq!(extract_filename(Path::new("notes.markdown")), "notes.markdown");
        assert_eq!(extract_filename(Path::new("/path/with/many/levels/a.txt")), "a.txt");
    }

    #[test]
    fn test_extract_filename_fallback() {
        assert_eq!(extract_filename(Path::new("/")), "Unknown");
        assert_eq!(extract_filename(Path::new("")), "Unknown");
    }

    #[test]
    fn test_find_document_arg_picks_first_match() {
        let args = ["--flag", "main.rs", "a.md", "b.md"];
        assert_eq!(find_document_arg(&args), Some(Path::new("a.md")));
    }

    #[test]
    fn test_find_document_arg_none() {
        let args: [&str; 2] = ["--inspect", "script.js"];
        assert_eq!(find_document_arg(&args), None);
        let empty: [String; 0] = [];
        assert_eq!(find_document_arg(&empty), None);
    }

    #[test]
    fn test_find_document_arg_skips_flags() {
        let args = ["--log=x.md", "notes.txt"];
        assert_eq!(find_document_arg(&args), Some(Path::new("notes.txt")));
    }

    #[test]
    fn test_resolve_relative_against_cwd() {
        let resolved = resolve_against(Path::new("/work"), Path::new("docs/a.md"));
        assert_eq!(resolved, PathBuf::from("/work/docs/a.md"));
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_absolute_untouched() {
        let resolved = resolve_against(Path::new("/work"), Path::new("/elsewhere/a.md"));
        assert_eq!(resolved, PathBuf::from("/elsewhere/a.md"));
    }

    #[cfg(unix)]
    #[test]
    fn test_find_document_arg_keeps_non_utf8_bytes() {
        use std::os::unix::ffi::OsStrExt;

        let name = OsStr::from_bytes(b"caf\xe9.md");
        let args = [OsStr::new("--verbose"), name];
        let found = find_document_arg(&args).unwrap();
        assert_eq!(found.as_os_str().as_bytes(), b"caf\xe9.md");
    }
}
