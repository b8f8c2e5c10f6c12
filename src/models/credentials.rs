//! OAuth credential sets handed over by the browser-automation layer

use std::fmt;
use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::crypto::SecureString;
use crate::envfile::EnvEntry;
use crate::error::{AutomatorError, AutomatorResult};

/// OAuth provider an app was registered with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[value(name = "github")]
    GitHub,
    Google,
}

impl Provider {
    /// Directory name under the automator base directory
    pub fn dir_name(&self) -> &'static str {
        match self {
            Provider::GitHub => "github",
            Provider::Google => "google",
        }
    }

    /// Prefix of this provider's env keys
    pub fn key_prefix(&self) -> &'static str {
        match self {
            Provider::GitHub => "GITHUB",
            Provider::Google => "GOOGLE",
        }
    }

    pub fn client_id_key(&self) -> String {
        format!("{}_CLIENT_ID", self.key_prefix())
    }

    pub fn client_secret_key(&self) -> String {
        format!("{}_CLIENT_SECRET", self.key_prefix())
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::GitHub => write!(f, "GitHub"),
            Provider::Google => write!(f, "Google"),
        }
    }
}

/// A freshly created OAuth app's credentials
#[derive(Debug, Clone)]
pub struct OAuthCredentials {
    pub provider: Provider,
    pub app_name: String,
    pub client_id: String,
    pub client_secret: SecureString,
    /// Google Cloud project the client belongs to
    pub project_id: Option<String>,
}

impl OAuthCredentials {
    pub fn github(
        app_name: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<SecureString>,
    ) -> Self {
        Self {
            provider: Provider::GitHub,
            app_name: app_name.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            project_id: None,
        }
    }

    pub fn google(
        app_name: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<SecureString>,
        project_id: Option<String>,
    ) -> Self {
        Self {
            provider: Provider::Google,
            app_name: app_name.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            project_id: project_id.filter(|p| !p.trim().is_empty()),
        }
    }

    /// Reject credential sets that cannot be persisted meaningfully
    pub fn validate(&self) -> AutomatorResult<()> {
        if self.app_name.trim().is_empty() {
            return Err(AutomatorError::Validation("App name cannot be empty".into()));
        }
        if self.client_id.trim().is_empty() {
            return Err(AutomatorError::Validation("Client ID cannot be empty".into()));
        }
        if self.client_secret.trim().is_empty() {
            return Err(AutomatorError::Validation(
                "Client secret cannot be empty".into(),
            ));
        }
        if self.app_name.contains('\n') {
            return Err(AutomatorError::Validation(
                "App name cannot span multiple lines".into(),
            ));
        }
        Ok(())
    }

    /// Comment line introducing the credential block in an env file
    pub fn header(&self) -> String {
        format!("# {} OAuth Credentials ({})", self.provider, self.app_name)
    }

    /// Env entries for this credential set, in write order
    pub fn to_entries(&self) -> Vec<EnvEntry> {
        let mut entries = vec![
            EnvEntry::new(self.provider.client_id_key(), self.client_id.clone()),
            EnvEntry::new(
                self.provider.client_secret_key(),
                self.client_secret.as_str(),
            ),
        ];
        if let Some(project_id) = &self.project_id {
            entries.push(EnvEntry::new("GOOGLE_PROJECT_ID", project_id.clone()));
        }
        entries
    }

    /// Offline sanity check of the credential shapes
    ///
    /// Returns human-readable warnings; an empty list means nothing looked off.
    pub fn check_format(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        match self.provider {
            Provider::GitHub => {
                if !self.client_id.starts_with("Ov23li") {
                    let shown: String = self.client_id.chars().take(6).collect();
                    warnings.push(format!("Client ID has unexpected prefix: {}", shown));
                }
                if self.client_secret.len() < 30 {
                    warnings.push(format!(
                        "Client secret seems too short: {} chars",
                        self.client_secret.len()
                    ));
                }
            }
            Provider::Google => {
                if !self.client_id.ends_with(".apps.googleusercontent.com") {
                    warnings.push(
                        "Client ID does not end with .apps.googleusercontent.com".to_string(),
                    );
                }
                if self.project_id.as_deref().map_or(true, str::is_empty) {
                    warnings.push("Project ID is missing".to_string());
                }
            }
        }
        warnings
    }
}

/// Which env file a credential set is written to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum EnvTarget {
    /// `.env`
    #[default]
    Env,
    /// `.env.local`
    Local,
    /// `.env.production`
    Production,
}

impl EnvTarget {
    pub fn file_name(&self) -> &'static str {
        match self {
            EnvTarget::Env => ".env",
            EnvTarget::Local => ".env.local",
            EnvTarget::Production => ".env.production",
        }
    }

    /// Path of the target file relative to `dir`
    pub fn path_in(&self, dir: impl Into<PathBuf>) -> PathBuf {
        dir.into().join(self.file_name())
    }
}
