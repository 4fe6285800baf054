use std::fs;
use std::path::{Path, PathBuf};

use super::host::{Dialogs, UiEvent, WindowBackend};
use super::window::WindowCoordinator;
use crate::app::domain::{OpenedFile, Session};
use crate::app::infrastructure::error::Result;
use crate::app::services::assets;

/// Name suggested by the save dialog for a document that has never been saved.
pub const UNTITLED_FILE: &str = "Untitled.md";

/// Open, save and save-as against the filesystem.
///
/// Session writes happen only after the disk I/O succeeded, so a failed or
/// cancelled operation leaves the session exactly as it was.
pub struct FileOperations {
    /// Last directory used in a file open/save dialog.
    last_directory: Option<PathBuf>,
}

impl FileOperations {
    pub fn new(start_directory: Option<PathBuf>) -> Self {
        Self {
            last_directory: start_directory,
        }
    }

    pub fn last_directory(&self) -> Option<&Path> {
        self.last_directory.as_deref()
    }

    fn remember_directory(&mut self, path: &Path) {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            self.last_directory = Some(parent.to_path_buf());
        }
    }

    fn default_save_path(&self, session: &Session) -> PathBuf {
        match (session.file_path(), self.last_directory.as_deref()) {
            (Some(current), _) => current.to_path_buf(),
            (None, Some(dir)) => dir.join(UNTITLED_FILE),
            (None, None) => PathBuf::from(UNTITLED_FILE),
        }
    }

    /// Read `path` and make it the current document.
    fn load<B: WindowBackend>(
        &mut self,
        path: PathBuf,
        session: &mut Session,
        windows: &mut WindowCoordinator<B>,
    ) -> Result<OpenedFile> {
        let content = fs::read_to_string(&path)?;
        self.remember_directory(&path);
        session.mark_loaded(path.clone());
        windows.update_title(session);
        tracing::info!(path = %path.display(), "opened document");
        Ok(OpenedFile::new(path, content))
    }

    /// Let the user pick a document and load it. `Ok(None)` means the
    /// picker was cancelled.
    pub fn open<B: WindowBackend, D: Dialogs>(
        &mut self,
        session: &mut Session,
        windows: &mut WindowCoordinator<B>,
        dialogs: &mut D,
    ) -> Result<Option<OpenedFile>> {
        let Some(path) = dialogs.pick_open_path(self.last_directory.as_deref()) else {
            return Ok(None);
        };
        self.load(path, session, windows).map(Some)
    }

    /// Write `content` to the current document, or fall through to save-as
    /// when it has no path yet. `Ok(false)` means the user cancelled.
    pub fn save<B: WindowBackend, D: Dialogs>(
        &mut self,
        content: &str,
        session: &mut Session,
        windows: &mut WindowCoordinator<B>,
        dialogs: &mut D,
    ) -> Result<bool> {
        let Some(path) = session.file_path().map(Path::to_path_buf) else {
            return self.save_as(content, session, windows, dialogs);
        };

        fs::write(&path, content)?;
        session.set_edited(false);
        windows.update_title(session);
        tracing::info!(path = %path.display(), "saved document");
        Ok(true)
    }

    pub fn save_as<B: WindowBackend, D: Dialogs>(
        &mut self,
        content: &str,
        session: &mut Session,
        windows: &mut WindowCoordinator<B>,
        dialogs: &mut D,
    ) -> Result<bool> {
        let default_path = self.default_save_path(session);
        let Some(path) = dialogs.pick_save_path(&default_path) else {
            return Ok(false);
        };

        fs::write(&path, content)?;
        self.remember_directory(&path);
        tracing::info!(path = %path.display(), "saved document as");
        session.mark_loaded(path);
        windows.update_title(session);
        Ok(true)
    }

    /// Open a document without a picker and push it to the editing surface.
    ///
    /// Used by the launch flows, which have nobody waiting on a result, so
    /// failures are logged rather than shown. Returns whether the document
    /// was delivered.
    pub fn open_file_by_path<B: WindowBackend>(
        &mut self,
        path: &Path,
        session: &mut Session,
        windows: &mut WindowCoordinator<B>,
    ) -> bool {
        if !path.exists() {
            tracing::warn!(path = %path.display(), "not opening missing file");
            return false;
        }
        if !windows.is_window_valid() {
            tracing::warn!(path = %path.display(), "not opening file, no window");
            return false;
        }

        match self.load(path.to_path_buf(), session, windows) {
            Ok(opened) => {
                windows.notify(UiEvent::FileOpened(opened));
                true
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), "failed to open file: {}", e);
                false
            }
        }
    }

    /// Store pasted image bytes beside the current document and return the
    /// relative path to embed, or `None` if nothing was written.
    pub fn save_image<D: Dialogs>(
        &mut self,
        bytes: &[u8],
        extension: &str,
        session: &Session,
        dialogs: &mut D,
    ) -> Option<String> {
        let Some(document) = session.file_path() else {
            dialogs.warn(
                "Save the document first",
                "Please save the current markdown file before pasting images.",
            );
            return None;
        };

        match assets::write_asset(document, bytes, extension) {
            Ok(relative) => {
                tracing::info!(asset = %relative, "saved image");
                Some(relative)
            }
            Err(e) => {
                dialogs.error(
                    "Failed to save image",
                    &format!("An error occurred while saving the image: {}", e),
                );
                None
            }
        }
    }

    /// Edit notification from the editing surface.
    pub fn set_document_edited<B: WindowBackend>(
        &self,
        edited: bool,
        session: &mut Session,
        windows: &mut WindowCoordinator<B>,
    ) {
        session.set_edited(edited);
        windows.update_title(session);
    }

    /// The editing surface loaded `path` on its own; adopt it as the
    /// current, clean document.
    pub fn set_file_path<B: WindowBackend>(
        &mut self,
        path: PathBuf,
        session: &mut Session,
        windows: &mut WindowCoordinator<B>,
    ) {
        self.remember_directory(&path);
        session.mark_loaded(path);
        windows.update_title(session);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::controllers::testing::{FakeBackend, FakeDialogs};
    use crate::app::domain::AppSettings;
    use crate::app::infrastructure::error::AppError;

    struct Fixture {
        dir: tempfile::TempDir,
        files: FileOperations,
        session: Session,
        windows: WindowCoordinator<FakeBackend>,
        backend: FakeBackend,
    }

    fn fixture() -> Fixture {
        let backend = FakeBackend::default();
        let mut windows =
            WindowCoordinator::new(backend.clone(), "Cherry Muse", &AppSettings::default());
        let session = Session::new();
        windows.create_window(&session).unwrap();
        Fixture {
            dir: tempfile::tempdir().unwrap(),
            files: FileOperations::new(None),
            session,
            windows,
            backend,
        }
    }

    impl Fixture {
        fn doc(&self, name: &str, content: &str) -> PathBuf {
            let path = self.dir.path().join(name);
            fs::write(&path, content).unwrap();
            path
        }
    }

    #[test]
    fn test_open_loads_and_clears_edited() {
        let mut f = fixture();
        let path = f.doc("a.md", "# Hello");
        f.session.set_edited(true);
        let mut dialogs = FakeDialogs::default().answer_open(Some(path.clone()));

        let opened = f
            .files
            .open(&mut f.session, &mut f.windows, &mut dialogs)
            .unwrap()
            .unwrap();

        assert_eq!(opened.content, "# Hello");
        assert_eq!(opened.file_name, "a.md");
        assert_eq!(f.session.file_path(), Some(path.as_path()));
        assert!(!f.session.is_edited());
        assert_eq!(
            f.backend.latest().borrow().last_title(),
            Some("a.md - Cherry Muse")
        );
        assert_eq!(f.files.last_directory(), Some(f.dir.path()));
    }

    #[test]
    fn test_open_starts_in_last_directory() {
        let mut f = fixture();
        let path = f.doc("a.md", "x");
        let mut dialogs = FakeDialogs::default()
            .answer_open(Some(path))
            .answer_open(None);

        f.files.open(&mut f.session, &mut f.windows, &mut dialogs).unwrap();
        f.files.open(&mut f.session, &mut f.windows, &mut dialogs).unwrap();

        assert_eq!(
            dialogs.open_start_dirs,
            vec![None, Some(f.dir.path().to_path_buf())]
        );
    }

    #[test]
    fn test_open_cancel_is_noop() {
        let mut f = fixture();
        let path = f.doc("a.md", "x");
        f.session.mark_loaded(path.clone());
        f.session.set_edited(true);
        let mut dialogs = FakeDialogs::default().answer_open(None);

        let result = f.files.open(&mut f.session, &mut f.windows, &mut dialogs).unwrap();

        assert!(result.is_none());
        assert_eq!(f.session.file_path(), Some(path.as_path()));
        assert!(f.session.is_edited());
    }

    #[test]
    fn test_open_unreadable_file_leaves_session() {
        let mut f = fixture();
        let missing = f.dir.path().join("gone.md");
        let mut dialogs = FakeDialogs::default().answer_open(Some(missing));

        let result = f.files.open(&mut f.session, &mut f.windows, &mut dialogs);

        assert!(matches!(result, Err(AppError::Io(_))));
        assert!(f.session.file_path().is_none());
    }

    #[test]
    fn test_save_writes_existing_path_without_prompt() {
        let mut f = fixture();
        let path = f.doc("a.md", "old");
        f.session.mark_loaded(path.clone());
        f.session.set_edited(true);
        let mut dialogs = FakeDialogs::default();

        for text in ["first", "second"] {
            let saved = f
                .files
                .save(text, &mut f.session, &mut f.windows, &mut dialogs)
                .unwrap();
            assert!(saved);
            assert_eq!(f.session.file_path(), Some(path.as_path()));
        }

        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
        assert!(!f.session.is_edited());
        assert!(dialogs.save_defaults.is_empty());
    }

    #[test]
    fn test_save_untitled_prompts_with_default_name() {
        let mut f = fixture();
        let target = f.dir.path().join("new.md");
        let mut dialogs = FakeDialogs::default().answer_save(Some(target.clone()));

        let saved = f
            .files
            .save("body", &mut f.session, &mut f.windows, &mut dialogs)
            .unwrap();

        assert!(saved);
        assert_eq!(dialogs.save_defaults, vec![PathBuf::from(UNTITLED_FILE)]);
        assert_eq!(f.session.file_path(), Some(target.as_path()));
        assert_eq!(fs::read_to_string(&target).unwrap(), "body");
    }

    #[test]
    fn test_save_untitled_cancel_is_noop() {
        let mut f = fixture();
        f.session.set_edited(true);
        let mut dialogs = FakeDialogs::default().answer_save(None);

        let saved = f
            .files
            .save("body", &mut f.session, &mut f.windows, &mut dialogs)
            .unwrap();

        assert!(!saved);
        assert!(f.session.file_path().is_none());
        assert!(f.session.is_edited());
    }

    #[test]
    fn test_save_as_relocates_and_later_saves_follow() {
        let mut f = fixture();
        let original = f.doc("a.md", "a");
        let moved = f.dir.path().join("b.md");
        f.session.mark_loaded(original.clone());
        f.session.set_edited(true);
        let mut dialogs = FakeDialogs::default().answer_save(Some(moved.clone()));

        assert!(f
            .files
            .save_as("v1", &mut f.session, &mut f.windows, &mut dialogs)
            .unwrap());
        assert_eq!(dialogs.save_defaults, vec![original.clone()]);
        assert_eq!(f.session.file_path(), Some(moved.as_path()));
        assert!(!f.session.is_edited());

        f.files
            .save("v2", &mut f.session, &mut f.windows, &mut dialogs)
            .unwrap();
        assert_eq!(fs::read_to_string(&moved).unwrap(), "v2");
        assert_eq!(fs::read_to_string(&original).unwrap(), "a");
    }

    #[test]
    fn test_save_as_cancel_is_noop() {
        let mut f = fixture();
        let path = f.doc("a.md", "a");
        f.session.mark_loaded(path.clone());
        f.session.set_edited(true);
        let mut dialogs = FakeDialogs::default().answer_save(None);

        let saved = f
            .files
            .save_as("x", &mut f.session, &mut f.windows, &mut dialogs)
            .unwrap();

        assert!(!saved);
        assert_eq!(f.session.file_path(), Some(path.as_path()));
        assert!(f.session.is_edited());
        assert_eq!(fs::read_to_string(&path).unwrap(), "a");
    }

    #[test]
    fn test_save_failure_keeps_dirty_flag() {
        let mut f = fixture();
        let unwritable = f.dir.path().join("missing-dir").join("a.md");
        f.session.mark_loaded(unwritable);
        f.session.set_edited(true);
        let mut dialogs = FakeDialogs::default();

        let result = f.files.save("x", &mut f.session, &mut f.windows, &mut dialogs);

        assert!(matches!(result, Err(AppError::Io(_))));
        assert!(f.session.is_edited());
    }

    #[test]
    fn test_open_file_by_path_pushes_to_surface() {
        let mut f = fixture();
        let path = f.doc("a.md", "# pushed");

        assert!(f.files.open_file_by_path(&path, &mut f.session, &mut f.windows));

        let log = f.backend.latest();
        let log = log.borrow();
        assert_eq!(log.opened_paths(), vec![path.clone()]);
        assert_eq!(f.session.file_path(), Some(path.as_path()));
    }

    #[test]
    fn test_open_file_by_path_missing_file_is_logged_only() {
        let mut f = fixture();
        let missing = f.dir.path().join("nope.md");

        assert!(!f.files.open_file_by_path(&missing, &mut f.session, &mut f.windows));
        assert!(f.session.file_path().is_none());
        assert!(f.backend.latest().borrow().events.is_empty());
    }

    #[test]
    fn test_open_file_by_path_requires_window() {
        let mut f = fixture();
        let path = f.doc("a.md", "x");
        f.windows.destroy_window(&mut f.session);

        assert!(!f.files.open_file_by_path(&path, &mut f.session, &mut f.windows));
        assert!(f.session.file_path().is_none());
    }

    #[test]
    fn test_save_image_without_document_warns() {
        let mut f = fixture();
        let mut dialogs = FakeDialogs::default();

        let result = f.files.save_image(b"png", "png", &f.session, &mut dialogs);

        assert!(result.is_none());
        assert_eq!(dialogs.warnings.len(), 1);
        assert!(fs::read_dir(f.dir.path()).unwrap().next().is_none());
    }

    #[test]
    fn test_save_image_beside_document() {
        let mut f = fixture();
        let path = f.doc("a.md", "x");
        f.session.mark_loaded(path);
        let mut dialogs = FakeDialogs::default();

        let relative = f
            .files
            .save_image(b"\x89PNG", "png", &f.session, &mut dialogs)
            .unwrap();

        assert!(relative.starts_with("assets/image_"));
        assert!(relative.ends_with(".png"));
        assert_eq!(fs::read(f.dir.path().join(&relative)).unwrap(), b"\x89PNG");
        assert!(dialogs.warnings.is_empty() && dialogs.errors.is_empty());
    }

    #[test]
    fn test_save_image_io_failure_shows_error() {
        let mut f = fixture();
        let path = f.doc("a.md", "x");
        fs::write(f.dir.path().join("assets"), "file in the way").unwrap();
        f.session.mark_loaded(path);
        let mut dialogs = FakeDialogs::default();

        let result = f.files.save_image(b"x", "png", &f.session, &mut dialogs);

        assert!(result.is_none());
        assert_eq!(dialogs.errors.len(), 1);
    }

    #[test]
    fn test_edited_notification_updates_title() {
        let mut f = fixture();
        f.files.set_document_edited(true, &mut f.session, &mut f.windows);
        assert!(f.session.is_edited());
        assert_eq!(
            f.backend.latest().borrow().last_title(),
            Some("*Untitled - Cherry Muse")
        );
    }

    #[test]
    fn test_set_file_path_adopts_clean_document() {
        let mut f = fixture();
        f.session.set_edited(true);
        let path = f.dir.path().join("b.md");

        f.files.set_file_path(path.clone(), &mut f.session, &mut f.windows);

        assert_eq!(f.session.file_path(), Some(path.as_path()));
        assert!(!f.session.is_edited());
    }
}
