//! Launch coordination.
//!
//! Command-line arguments, OS open-file events and second-instance signals
//! all arrive at different points of the window's life. They are funnelled
//! through [`LaunchCoordinator::deliver`], which either opens the document
//! right away or parks it in the session's pending slot until the window
//! reports it has finished loading.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use super::files::FileOperations;
use super::host::WindowBackend;
use super::window::WindowCoordinator;
use crate::app::domain::Session;
use crate::app::services::instance::InstanceSignal;
use crate::app::services::text_ops::{find_document_arg, resolve_against};

/// Borrowed collaborators for one launch operation.
pub struct LaunchContext<'a, B: WindowBackend> {
    pub session: &'a mut Session,
    pub windows: &'a mut WindowCoordinator<B>,
    pub files: &'a mut FileOperations,
}

#[derive(Debug, Default)]
pub struct LaunchCoordinator {
    /// False until [`LaunchCoordinator::start`] runs. Deliveries before
    /// that only stage; the window is created by `start` itself.
    app_ready: bool,
}

impl LaunchCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// App-ready hook: stage the launch document and create the window.
    pub fn start<S, B>(&mut self, args: &[S], cwd: &Path, ctx: &mut LaunchContext<'_, B>)
    where
        S: AsRef<OsStr>,
        B: WindowBackend,
    {
        self.stage_initial_args(args, cwd, ctx);
        self.app_ready = true;
        Self::ensure_window(ctx);
    }

    /// Deliver the first document argument of this process, if any.
    pub fn stage_initial_args<S, B>(
        &mut self,
        args: &[S],
        cwd: &Path,
        ctx: &mut LaunchContext<'_, B>,
    ) where
        S: AsRef<OsStr>,
        B: WindowBackend,
    {
        if let Some(arg) = find_document_arg(args) {
            self.deliver(resolve_against(cwd, arg), ctx);
        }
    }

    /// Another launch handed over its arguments. The window is raised
    /// whether or not a document came with it.
    pub fn on_second_instance<B: WindowBackend>(
        &mut self,
        signal: &InstanceSignal,
        ctx: &mut LaunchContext<'_, B>,
    ) {
        match find_document_arg(&signal.args) {
            Some(arg) => self.deliver(resolve_against(&signal.cwd, arg), ctx),
            None if self.app_ready => Self::ensure_window(ctx),
            None => {}
        }
        ctx.windows.focus();
    }

    /// macOS "open file" event (Finder, dock drop, `open -a`).
    pub fn on_open_file_event<B: WindowBackend>(
        &mut self,
        path: PathBuf,
        ctx: &mut LaunchContext<'_, B>,
    ) {
        self.deliver(path, ctx);
    }

    /// Route a document to the window, whatever state it is in:
    /// no window: stage it, and create the window once the app is ready;
    /// window still loading: stage it;
    /// window ready: open it now.
    ///
    /// A missing file is dropped, but the app still gets its window.
    pub fn deliver<B: WindowBackend>(&mut self, path: PathBuf, ctx: &mut LaunchContext<'_, B>) {
        if !path.exists() {
            tracing::warn!(path = %path.display(), "ignoring launch request for missing file");
            if self.app_ready {
                Self::ensure_window(ctx);
            }
            return;
        }

        if ctx.windows.is_ready() {
            ctx.files.open_file_by_path(&path, ctx.session, ctx.windows);
            return;
        }

        tracing::debug!(path = %path.display(), "staging file until window is ready");
        ctx.session.stage_pending(path);
        if self.app_ready {
            Self::ensure_window(ctx);
        }
    }

    /// "Finished loading" hook. The only place the pending slot is drained.
    pub fn on_window_ready<B: WindowBackend>(&mut self, ctx: &mut LaunchContext<'_, B>) {
        if let Some(path) = ctx.windows.finish_loading(ctx.session) {
            ctx.files.open_file_by_path(&path, ctx.session, ctx.windows);
        }
    }

    fn ensure_window<B: WindowBackend>(ctx: &mut LaunchContext<'_, B>) {
        if ctx.windows.is_window_valid() {
            return;
        }
        if let Err(e) = ctx.windows.create_window(ctx.session) {
            tracing::error!("failed to create window: {}", e);
        }
    }
}
