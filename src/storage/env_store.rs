//! File-level access to a project's env file
//!
//! Wraps the pure merge logic with reading the current file and atomically
//! replacing it, so an interrupted run leaves either the old or the new file.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::crypto::SecureString;
use crate::envfile::{self, EnvDocument, EnvEntry, MergeReport, MergeRequest};
use crate::error::AutomatorResult;
use crate::models::Provider;

use super::file_io::{read_text, write_text_atomic};

/// A client id / secret pair found in an env file
#[derive(Debug, Clone)]
pub struct SavedCredential {
    /// Key prefix in front of the provider keys (`""`, `"GENERATED_2_"`, `"PROD_"`)
    pub prefix: String,
    pub client_id: String,
    pub client_secret: SecureString,
}

/// Reads and rewrites a single env file
#[derive(Debug, Clone)]
pub struct EnvStore {
    path: PathBuf,
}

impl EnvStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Parse the current file (empty if missing)
    pub fn read(&self) -> AutomatorResult<EnvDocument> {
        Ok(EnvDocument::parse(&read_text(&self.path)?))
    }

    /// Keys of the request that already exist in the file
    pub fn conflicts(&self, request: &MergeRequest) -> AutomatorResult<Vec<String>> {
        envfile::conflicts(&read_text(&self.path)?, request)
    }

    /// Merge the request into the file and replace it atomically
    pub fn merge(&self, request: &MergeRequest) -> AutomatorResult<MergeReport> {
        let existing = read_text(&self.path)?;
        let outcome = envfile::merge(&existing, request)?;

        if outcome.contents == existing {
            debug!(file = %self.path.display(), "merge produced no changes");
            return Ok(outcome.report);
        }

        write_text_atomic(&self.path, &outcome.contents)?;
        info!(
            file = %self.path.display(),
            appended = outcome.report.appended.len(),
            archived = outcome.report.archived.len(),
            renamed = outcome.report.renamed.len(),
            "merged entries into env file"
        );
        Ok(outcome.report)
    }

    /// Set a tool setting in place, appending it when absent
    pub fn set_flag(&self, key: &str, value: &str) -> AutomatorResult<()> {
        EnvEntry::validate_key(key)?;
        let entry = EnvEntry::new(key, value);

        let mut doc = self.read()?;
        if !doc.set(&entry) {
            doc.push_entry(&entry);
        }

        write_text_atomic(&self.path, &doc.render())?;
        info!(file = %self.path.display(), key, value, "updated setting");
        Ok(())
    }

    /// Every complete client id / secret pair for `provider`, in file order
    pub fn saved_credentials(&self, provider: Provider) -> AutomatorResult<Vec<SavedCredential>> {
        let doc = self.read()?;
        let id_key = provider.client_id_key();
        let secret_key = provider.client_secret_key();

        let mut found = Vec::new();
        for (key, value) in doc.entries() {
            let Some(prefix) = key.strip_suffix(id_key.as_str()) else {
                continue;
            };
            if !(prefix.is_empty() || prefix.ends_with('_')) {
                continue;
            }
            if let Some(secret) = doc.get(&format!("{}{}", prefix, secret_key)) {
                found.push(SavedCredential {
                    prefix: prefix.to_string(),
                    client_id: value.to_string(),
                    client_secret: SecureString::new(secret),
                });
            }
        }
        Ok(found)
    }
}
