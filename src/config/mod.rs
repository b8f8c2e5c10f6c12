//! Configuration module for oauth-automator
//!
//! This module provides configuration management including:
//! - explicit path resolution for the key file and history files
//! - `.env`-driven tool settings

pub mod paths;
pub mod settings;

pub use paths::AutomatorPaths;
pub use settings::Settings;
