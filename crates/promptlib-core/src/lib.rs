//! Domain model, persistence and view state shared by the promptlib TUI and CLI.

pub mod clipboard;
pub mod config;
pub mod keymap;
pub mod library;
pub mod logging;
pub mod prompt;
pub mod store;
pub mod view;
