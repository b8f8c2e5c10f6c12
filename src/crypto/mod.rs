//! Cryptographic functions for oauth-automator
//!
//! Provides AES-256-GCM sealing of history records with a locally stored,
//! owner-only key file, plus zeroizing containers for secrets.

pub mod encryption;
pub mod key_file;
pub mod secure_memory;

pub use encryption::{open, open_json, seal, seal_json, SealedRecord};
pub use key_file::{load_key, load_or_create_key, SecretKey};
pub use secure_memory::SecureString;
