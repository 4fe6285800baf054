//! FLTK implementations of the window and dialog seams.

pub mod buffer;
pub mod file_dialogs;
pub mod main_window;
pub mod menu;
