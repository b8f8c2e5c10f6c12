//! Core data models
//!
//! Credential sets produced by app creation, the provider they belong to, and
//! the env files they are written to.

pub mod credentials;

pub use credentials::{EnvTarget, OAuthCredentials, Provider};
