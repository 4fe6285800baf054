use std::ffi::OsString;
use std::process::ExitCode;

use fltk::app;

use cherry_muse::app::domain::{AppSettings, Message};
use cherry_muse::app::services::instance::{self, Acquired, Endpoint, InstanceSignal};
use cherry_muse::app::state::AppState;
use cherry_muse::ui::file_dialogs::FltkDialogs;
use cherry_muse::ui::main_window::FltkBackend;

const APP_NAME: &str = "Cherry Muse";
const APP_ID: &str = "cherry-muse";
const LOG_ENV: &str = "CHERRY_MUSE_LOG";

fn init_logging(settings: &AppSettings) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(&settings.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Route Finder / dock "open with" requests into the app channel.
#[cfg(target_os = "macos")]
fn register_open_file_handler(sender: app::Sender<Message>) {
    use std::ffi::{c_char, CStr};
    use std::path::PathBuf;
    use std::sync::OnceLock;

    static OPEN_SENDER: OnceLock<app::Sender<Message>> = OnceLock::new();

    fn on_open(path: *const c_char) {
        if path.is_null() {
            return;
        }
        // SAFETY: FLTK hands over a NUL-terminated path that lives for the
        // duration of the callback.
        let path = unsafe { CStr::from_ptr(path) }.to_string_lossy().into_owned();
        if let Some(sender) = OPEN_SENDER.get() {
            sender.send(Message::OpenFileEvent(PathBuf::from(path)));
        }
    }

    let _ = OPEN_SENDER.set(sender);
    app::raw_open_callback(Some(on_open));
}

fn main() -> ExitCode {
    let settings = AppSettings::load();
    init_logging(&settings);

    // args_os: a non-UTF-8 file name must not abort the launch.
    let args: Vec<OsString> = std::env::args_os().skip(1).collect();
    let cwd = std::env::current_dir().unwrap_or_default();
    let signal = InstanceSignal::from_launch(&args, &cwd);
    let listener = match instance::acquire(&Endpoint::for_app(APP_ID), &signal) {
        Ok(Acquired::Primary(listener)) => listener,
        Ok(Acquired::Secondary) => {
            tracing::info!("handed launch over to the running instance");
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            tracing::error!("single-instance setup failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let app = app::App::default();
    let (sender, receiver) = app::channel::<Message>();

    let forward = sender.clone();
    listener.spawn(move |signal| {
        forward.send(Message::SecondInstance(signal));
        app::awake();
    });

    #[cfg(target_os = "macos")]
    register_open_file_handler(sender.clone());

    let mut state = AppState::new(FltkBackend::new(sender), FltkDialogs, APP_NAME, settings)
        .with_settings_path(AppSettings::get_config_path());
    if let Err(e) = state.start(&args, &cwd) {
        tracing::error!("failed to start: {}", e);
        return ExitCode::FAILURE;
    }

    while app.wait() {
        if let Some(msg) = receiver.recv() {
            if !state.dispatch(msg) {
                break;
            }
        }
    }

    ExitCode::SUCCESS
}
