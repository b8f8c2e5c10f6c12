//! Service layer for oauth-automator
//!
//! Orchestrates the env file merger and the secure history for the callers
//! that hand over freshly created credentials.

pub mod persist;

pub use persist::{
    CredentialService, DualOptions, DualWriteMode, PersistOptions, PersistSummary,
    PROD_KEY_PREFIX,
};
