//! Audit record data structures
//!
//! Defines the record stored (encrypted) for every created credential set and
//! the secret-free summary used when listing the history.

use std::fmt;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::crypto::SecureString;
use crate::models::OAuthCredentials;

/// Deployment environment an app was created for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "UPPERCASE")]
pub enum Environment {
    #[default]
    Dev,
    Prod,
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Dev => write!(f, "DEV"),
            Environment::Prod => write!(f, "PROD"),
        }
    }
}

/// A single credential creation, as stored in the history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// When the credentials were recorded (UTC)
    pub timestamp: DateTime<Utc>,

    pub app_name: String,

    #[serde(rename = "env_type")]
    pub environment: Environment,

    pub client_id: String,

    pub client_secret: SecureString,

    /// Homepage URL registered for the app
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
}

impl AuditRecord {
    pub fn new(
        app_name: impl Into<String>,
        environment: Environment,
        client_id: impl Into<String>,
        client_secret: impl Into<SecureString>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            app_name: app_name.into(),
            environment,
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            homepage: None,
        }
    }

    pub fn from_credentials(credentials: &OAuthCredentials, environment: Environment) -> Self {
        Self::new(
            credentials.app_name.clone(),
            environment,
            credentials.client_id.clone(),
            credentials.client_secret.clone(),
        )
    }

    pub fn with_homepage(mut self, homepage: impl Into<String>) -> Self {
        self.homepage = Some(homepage.into());
        self
    }

    /// Secret-free view of this record at `index` in the history
    pub fn summary(&self, index: usize) -> RecordSummary {
        RecordSummary {
            index,
            timestamp: self.timestamp,
            app_name: self.app_name.clone(),
            environment: self.environment,
            client_id: self.client_id.clone(),
        }
    }
}

/// What `list` shows for a record; never carries the secret
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSummary {
    /// 1-based position in the history file
    pub index: usize,
    pub timestamp: DateTime<Utc>,
    pub app_name: String,
    pub environment: Environment,
    pub client_id: String,
}

/// A history record that could not be read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    /// 1-based position in the history file
    pub position: usize,
    pub reason: String,
}

/// Result of listing the history
#[derive(Debug, Clone, Default)]
pub struct HistoryListing {
    pub records: Vec<RecordSummary>,
    pub skipped: Vec<SkippedRecord>,
}

impl HistoryListing {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty() && self.skipped.is_empty()
    }
}
