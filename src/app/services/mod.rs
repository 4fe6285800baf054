//! Services layer - business operations and utilities.
//!
//! This module contains business logic and operations:
//! - Image asset persistence
//! - Single-instance lock and signalling
//! - Text and path helpers

pub mod assets;
pub mod instance;
pub mod text_ops;
