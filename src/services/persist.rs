//! Credential persistence service
//!
//! The entry point for the automation layer: given a finished credential set,
//! merge it into the chosen env file and, when secure logging is on, append it
//! to the provider's encrypted history.

use std::path::{Path, PathBuf};

use clap::ValueEnum;
use tracing::{info, warn};

use crate::audit::{AuditLog, AuditRecord, Environment};
use crate::config::paths::AutomatorPaths;
use crate::config::settings::SECURE_LOGGING_VAR;
use crate::crypto::{load_or_create_key, SecretKey};
use crate::envfile::{ConflictPolicy, MergeReport, MergeRequest};
use crate::error::AutomatorResult;
use crate::models::{OAuthCredentials, Provider};
use crate::storage::EnvStore;

/// Prefix forcing production keys apart when dev and prod share one file
pub const PROD_KEY_PREFIX: &str = "PROD";

/// How a single credential set is persisted
#[derive(Debug, Clone, Default)]
pub struct PersistOptions {
    /// Env file to merge into; `None` skips the env file entirely
    pub env_file: Option<PathBuf>,
    pub policy: ConflictPolicy,
    /// Forced key prefix (e.g. `PROD`)
    pub key_prefix: Option<String>,
    pub environment: Environment,
    pub homepage: Option<String>,
    pub secure_logging: bool,
}

/// What persisting one credential set did
#[derive(Debug, Clone)]
pub struct PersistSummary {
    pub app_name: String,
    pub environment: Environment,
    pub env_file: Option<PathBuf>,
    pub merge: Option<MergeReport>,
    pub logged: bool,
    /// Offline format warnings about the credentials
    pub warnings: Vec<String>,
}

/// Where dev and prod credentials go when both are created together
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum DualWriteMode {
    /// Don't write env files
    None,
    /// Both into one file; prod keys get the `PROD_` prefix
    #[default]
    Combined,
    /// Dev into the dev file, prod with normal keys into the prod file
    Split,
}

/// Files and URLs for a dev + prod pair
#[derive(Debug, Clone)]
pub struct DualOptions {
    pub mode: DualWriteMode,
    pub dev_file: PathBuf,
    pub prod_file: PathBuf,
    pub policy: ConflictPolicy,
    pub dev_homepage: Option<String>,
    pub prod_homepage: Option<String>,
    pub secure_logging: bool,
}

/// Persists credentials into env files and the secure history
pub struct CredentialService<'a> {
    paths: &'a AutomatorPaths,
}

impl<'a> CredentialService<'a> {
    pub fn new(paths: &'a AutomatorPaths) -> Self {
        Self { paths }
    }

    /// Merge one credential set into its env file and optionally log it
    pub fn persist(
        &self,
        credentials: &OAuthCredentials,
        options: &PersistOptions,
    ) -> AutomatorResult<PersistSummary> {
        credentials.validate()?;

        let warnings = credentials.check_format();
        for warning in &warnings {
            warn!(app_name = %credentials.app_name, "{}", warning);
        }

        let merge = match &options.env_file {
            Some(path) => {
                let request =
                    merge_request(credentials, options.policy, options.key_prefix.as_deref());
                Some(EnvStore::new(path).merge(&request)?)
            }
            None => None,
        };

        if options.secure_logging {
            let mut record = AuditRecord::from_credentials(credentials, options.environment);
            if let Some(homepage) = &options.homepage {
                record = record.with_homepage(homepage.clone());
            }
            self.log(credentials.provider, &record)?;
        }

        Ok(PersistSummary {
            app_name: credentials.app_name.clone(),
            environment: options.environment,
            env_file: options.env_file.clone(),
            merge,
            logged: options.secure_logging,
            warnings,
        })
    }

    /// Keys of `credentials` that already exist in `env_file`
    ///
    /// Lets a caller choose a conflict policy before anything is written.
    pub fn conflicts(
        &self,
        credentials: &OAuthCredentials,
        env_file: &Path,
        key_prefix: Option<&str>,
    ) -> AutomatorResult<Vec<String>> {
        let request = merge_request(credentials, ConflictPolicy::default(), key_prefix);
        EnvStore::new(env_file).conflicts(&request)
    }

    /// Persist a dev and a prod credential set created together
    ///
    /// Both sets are validated before either is written.
    pub fn persist_dual(
        &self,
        dev: &OAuthCredentials,
        prod: &OAuthCredentials,
        options: &DualOptions,
    ) -> AutomatorResult<Vec<PersistSummary>> {
        dev.validate()?;
        prod.validate()?;

        let (dev_file, prod_file, prod_prefix) = match options.mode {
            DualWriteMode::None => (None, None, None),
            DualWriteMode::Combined => (
                Some(options.dev_file.clone()),
                Some(options.dev_file.clone()),
                Some(PROD_KEY_PREFIX.to_string()),
            ),
            DualWriteMode::Split => (
                Some(options.dev_file.clone()),
                Some(options.prod_file.clone()),
                None,
            ),
        };

        let dev_summary = self.persist(
            dev,
            &PersistOptions {
                env_file: dev_file,
                policy: options.policy,
                key_prefix: None,
                environment: Environment::Dev,
                homepage: options.dev_homepage.clone(),
                secure_logging: options.secure_logging,
            },
        )?;

        let prod_summary = self.persist(
            prod,
            &PersistOptions {
                env_file: prod_file,
                policy: options.policy,
                key_prefix: prod_prefix,
                environment: Environment::Prod,
                homepage: options.prod_homepage.clone(),
                secure_logging: options.secure_logging,
            },
        )?;

        Ok(vec![dev_summary, prod_summary])
    }

    /// Create the key (if needed) and turn secure logging on in `env_file`
    pub fn enable_secure_logging(&self, env_file: &Path) -> AutomatorResult<()> {
        for provider in [Provider::GitHub, Provider::Google] {
            self.paths.ensure_directories(provider)?;
        }
        load_or_create_key(&self.paths.key_file())?;
        EnvStore::new(env_file).set_flag(SECURE_LOGGING_VAR, "true")?;
        info!(env_file = %env_file.display(), "secure logging enabled");
        Ok(())
    }

    /// The history log for a provider
    pub fn history(&self, provider: Provider) -> AuditLog {
        AuditLog::new(self.paths.history_file(provider))
    }

    /// Load the existing history key; never creates one
    pub fn history_key(&self) -> AutomatorResult<SecretKey> {
        crate::crypto::load_key(&self.paths.key_file())
    }

    fn log(&self, provider: Provider, record: &AuditRecord) -> AutomatorResult<()> {
        self.paths.ensure_directories(provider)?;
        let key = load_or_create_key(&self.paths.key_file())?;
        self.history(provider).append(record, &key)
    }
}

fn merge_request(
    credentials: &OAuthCredentials,
    policy: ConflictPolicy,
    key_prefix: Option<&str>,
) -> MergeRequest {
    let request =
        MergeRequest::new(credentials.to_entries(), policy).with_header(credentials.header());
    match key_prefix {
        Some(prefix) => request.with_key_prefix(prefix),
        None => request,
    }
}
