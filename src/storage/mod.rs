//! Storage layer for oauth-automator
//!
//! Atomic text file replacement and the env file store built on it.

pub mod env_store;
pub mod file_io;

pub use env_store::{EnvStore, SavedCredential};
pub use file_io::{read_text, write_text_atomic};
