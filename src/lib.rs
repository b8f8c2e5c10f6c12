//! oauth-automator - Credential persistence for automated OAuth app creation
//!
//! This library takes the client id / secret pairs produced when OAuth apps
//! are created and stores them safely: merged into a project's env file
//! without clobbering existing values, and optionally recorded in an
//! encrypted, append-only history.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Path management and settings loaded from `.env`
//! - `error`: Custom error types
//! - `models`: Providers, credential sets and env file targets
//! - `envfile`: Env file parsing and the conflict-aware merge
//! - `storage`: Atomic file replacement and env file access
//! - `crypto`: Key file handling, AES-256-GCM sealing, secure strings
//! - `audit`: Encrypted credential history
//! - `services`: Persistence entry points used by the automation layer
//! - `display`: Terminal formatting
//! - `cli`: Command handlers for the binary
//!
//! # Example
//!
//! ```rust,ignore
//! use oauth_automator::config::paths::AutomatorPaths;
//! use oauth_automator::models::OAuthCredentials;
//! use oauth_automator::services::{CredentialService, PersistOptions};
//!
//! let paths = AutomatorPaths::new()?;
//! let creds = OAuthCredentials::github("acme", client_id, client_secret);
//! CredentialService::new(&paths).persist(&creds, &PersistOptions {
//!     env_file: Some(".env".into()),
//!     secure_logging: true,
//!     ..Default::default()
//! })?;
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod crypto;
pub mod display;
pub mod envfile;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;

pub use error::AutomatorError;
