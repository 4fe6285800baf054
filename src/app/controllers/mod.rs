//! Controllers layer - orchestration and coordination.
//!
//! This module contains controllers that coordinate between
//! the session, services, and the UI:
//! - Window lifecycle and close handling
//! - File open/save and image assets
//! - Launch arguments and single-instance signals

pub mod files;
pub mod host;
pub mod launch;
pub mod window;

#[cfg(test)]
pub(crate) mod testing;
