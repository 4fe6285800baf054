//! Application layer - organized by Clean Architecture principles.
//!
//! # Structure
//!
//! - `domain/` - Core data structures (Session, Settings, Messages)
//! - `controllers/` - Orchestration (window, file operations, launch)
//! - `services/` - Business operations (assets, single instance, text_ops)
//! - `infrastructure/` - External integrations (platform, error)
//! - `state.rs` - Main application coordinator

pub mod controllers;
pub mod domain;
pub mod file_filters;
pub mod infrastructure;
pub mod services;
pub mod state;

// Re-exports for convenient external access
pub use controllers::host::{
    CloseChoice, Dialogs, HostWindow, UiEvent, WindowBackend, WindowOptions,
};
pub use domain::{AppSettings, Message, OpenedFile, Session};
pub use infrastructure::error::{AppError, Result};
pub use state::AppState;
