//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod credentials;
pub mod history;
pub mod save;

pub use credentials::handle_credentials_command;
pub use history::{handle_history_command, HistoryCommands};
pub use save::{handle_save_command, handle_save_dual_command, SaveArgs, SaveDualArgs};
