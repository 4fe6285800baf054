//! Domain layer - core data structures and types.
//!
//! This module contains the fundamental domain models:
//! - The editing session and its pending-file slot
//! - Documents loaded from disk
//! - Application settings
//! - Message types for the event system

pub mod document;
pub mod messages;
pub mod session;
pub mod settings;

pub use document::OpenedFile;
pub use messages::Message;
pub use session::{PendingFile, Session};
pub use settings::AppSettings;
