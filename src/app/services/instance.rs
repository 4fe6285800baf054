//! Single-instance lock.
//!
//! The first process takes an advisory lock on `{endpoint}.lock`, binds a
//! local endpoint and becomes the primary instance. It keeps the lock for
//! as long as it runs, so only the lock holder ever binds or reclaims the
//! endpoint. Later launches fail to take the lock, connect, hand over their
//! arguments and working directory as one line of JSON, wait for the
//! primary's acknowledgement, and exit.
//!
//! Unix uses a domain socket; other platforms fall back to a loopback TCP
//! port derived from the user name.

use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions, TryLockError};
use std::io::{BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::app::infrastructure::error::{AppError, Result};

#[cfg(unix)]
use std::os::unix::net::{UnixListener as Listener, UnixStream as Stream};

#[cfg(not(unix))]
use std::net::{SocketAddr, TcpListener as Listener, TcpStream as Stream};

const READ_TIMEOUT: Duration = Duration::from_secs(2);

/// The lock holder may still be between locking and binding.
const CONNECT_ATTEMPTS: usize = 40;
const CONNECT_BACKOFF: Duration = Duration::from_millis(50);

/// Reply line written by the primary once a signal has been accepted.
const ACK: &str = "ok";

/// What a later launch tells the primary instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceSignal {
    /// Command-line arguments, without the program name.
    pub args: Vec<String>,
    pub cwd: PathBuf,
}

impl InstanceSignal {
    /// Build the signal for this launch.
    ///
    /// JSON strings are UTF-8, so arguments and a working directory that
    /// are not are converted lossily. The launching process itself keeps
    /// the raw `OsString`s.
    pub fn from_launch(args: &[OsString], cwd: &Path) -> Self {
        let args = args
            .iter()
            .map(|arg| {
                if arg.to_str().is_none() {
                    tracing::warn!(?arg, "forwarding non-UTF-8 argument lossily");
                }
                arg.to_string_lossy().into_owned()
            })
            .collect();
        Self {
            args,
            cwd: PathBuf::from(cwd.to_string_lossy().into_owned()),
        }
    }
}

fn current_user() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_default()
}

/// Where the primary instance listens.
#[derive(Debug, Clone)]
pub struct Endpoint {
    #[cfg(unix)]
    path: PathBuf,
    #[cfg(not(unix))]
    addr: SocketAddr,
    lock_path: PathBuf,
}

impl Endpoint {
    #[cfg(unix)]
    pub fn for_app(app_id: &str) -> Self {
        let dir = dirs::runtime_dir().unwrap_or_else(std::env::temp_dir);
        let user = current_user();
        let name = if user.is_empty() {
            format!("{}.sock", app_id)
        } else {
            format!("{}-{}.sock", app_id, user)
        };
        Self::at(dir.join(name))
    }

    #[cfg(unix)]
    pub fn at(path: PathBuf) -> Self {
        let lock_path = path.with_extension("lock");
        Self { path, lock_path }
    }

    #[cfg(not(unix))]
    pub fn for_app(app_id: &str) -> Self {
        let user = current_user();
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], loopback_port(app_id, &user))),
            lock_path: std::env::temp_dir().join(format!("{}-{}.lock", app_id, user)),
        }
    }

    fn open_lock(&self) -> std::io::Result<File> {
        if let Some(parent) = self.lock_path.parent() {
            fs::create_dir_all(parent)?;
        }
        OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&self.lock_path)
    }

    #[cfg(unix)]
    fn connect(&self) -> std::io::Result<Stream> {
        Stream::connect(&self.path)
    }

    #[cfg(not(unix))]
    fn connect(&self) -> std::io::Result<Stream> {
        Stream::connect_timeout(&self.addr, Duration::from_millis(500))
    }

    fn connect_to_primary(&self) -> Result<Stream> {
        let mut last_error = None;
        for _ in 0..CONNECT_ATTEMPTS {
            match self.connect() {
                Ok(stream) => return Ok(stream),
                Err(e) => last_error = Some(e),
            }
            thread::sleep(CONNECT_BACKOFF);
        }
        Err(AppError::Instance(format!(
            "running instance is not answering: {}",
            last_error.map(|e| e.to_string()).unwrap_or_default()
        )))
    }

    /// Only called while holding the lock.
    #[cfg(unix)]
    fn bind(&self) -> std::io::Result<Listener> {
        // Whoever created a leftover socket file no longer holds the lock.
        if self.path.exists() {
            tracing::debug!(path = %self.path.display(), "removing stale instance socket");
            fs::remove_file(&self.path)?;
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        Listener::bind(&self.path)
    }

    #[cfg(not(unix))]
    fn bind(&self) -> std::io::Result<Listener> {
        Listener::bind(self.addr)
    }
}

/// Per-user port in the dynamic range (FNV-1a of app id and user).
#[cfg(not(unix))]
fn loopback_port(app_id: &str, user: &str) -> u16 {
    let mut hash: u32 = 0x811c_9dc5;
    for byte in app_id.bytes().chain([0]).chain(user.bytes()) {
        hash ^= u32::from(byte);
        hash = hash.wrapping_mul(0x0100_0193);
    }
    49152 + (hash % 16384) as u16
}

/// Outcome of [`acquire`].
pub enum Acquired {
    /// This process holds the lock and should run the editor.
    Primary(InstanceListener),
    /// Another process holds the lock and has accepted our signal.
    Secondary,
}

/// Try to become the primary instance. If another instance already holds
/// the lock, `signal` is delivered to it and `Acquired::Secondary` is
/// returned.
pub fn acquire(endpoint: &Endpoint, signal: &InstanceSignal) -> Result<Acquired> {
    let lock = endpoint
        .open_lock()
        .map_err(|e| AppError::Instance(format!("failed to open lock file: {}", e)))?;

    match lock.try_lock() {
        Ok(()) => {
            let listener = endpoint
                .bind()
                .map_err(|e| AppError::Instance(format!("failed to bind endpoint: {}", e)))?;
            Ok(Acquired::Primary(InstanceListener {
                listener,
                _lock: lock,
            }))
        }
        Err(TryLockError::WouldBlock) => {
            let stream = endpoint.connect_to_primary()?;
            send_signal(stream, signal)?;
            Ok(Acquired::Secondary)
        }
        Err(TryLockError::Error(e)) => {
            Err(AppError::Instance(format!("failed to lock instance file: {}", e)))
        }
    }
}

fn send_signal(mut stream: Stream, signal: &InstanceSignal) -> Result<()> {
    let mut line = serde_json::to_vec(signal)?;
    line.push(b'\n');
    stream.write_all(&line)?;
    stream.flush()?;

    stream.set_read_timeout(Some(READ_TIMEOUT))?;
    let mut reply = String::new();
    BufReader::new(&stream).read_line(&mut reply)?;
    if reply.trim_end() != ACK {
        return Err(AppError::Instance(format!(
            "unexpected reply from running instance: {:?}",
            reply.trim_end()
        )));
    }
    Ok(())
}

fn read_signal<R: Read>(reader: R) -> Result<InstanceSignal> {
    let mut line = String::new();
    BufReader::new(reader).read_line(&mut line)?;
    Ok(serde_json::from_str(line.trim_end())?)
}

/// The primary instance's end of the lock. Dropping it releases the lock.
pub struct InstanceListener {
    listener: Listener,
    _lock: File,
}

impl InstanceListener {
    /// Accept signals on a background thread, calling `on_signal` for each
    /// well-formed one. Malformed connections are logged and dropped.
    pub fn spawn<F>(self, on_signal: F) -> JoinHandle<()>
    where
        F: Fn(InstanceSignal) + Send + 'static,
    {
        thread::spawn(move || {
            // Moved in whole so the lock lives as long as the thread.
            let this = self;
            for stream in this.listener.incoming() {
                let stream = match stream {
                    Ok(s) => s,
                    Err(e) => {
                        tracing::warn!("instance listener accept failed: {}", e);
                        continue;
                    }
                };
                if let Err(e) = stream.set_read_timeout(Some(READ_TIMEOUT)) {
                    tracing::warn!("could not set read timeout: {}", e);
                }
                match read_signal(&stream) {
                    Ok(signal) => {
                        if let Err(e) = (&stream).write_all(format!("{}\n", ACK).as_bytes()) {
                            tracing::warn!("could not acknowledge instance signal: {}", e);
                        }
                        tracing::info!(args = ?signal.args, "second instance signalled");
                        on_signal(signal);
                    }
                    Err(e) => tracing::warn!("ignoring malformed instance signal: {}", e),
                }
            }
        })
    }
}
