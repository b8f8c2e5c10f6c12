//! Path management for oauth-automator
//!
//! All on-disk locations are derived from a single base directory carried in
//! an explicit [`AutomatorPaths`] value, so callers (and tests) decide where
//! the key file and the history files live.
//!
//! ## Path Resolution Order
//!
//! 1. `OAUTH_AUTOMATOR_HOME` environment variable (if set)
//! 2. `~/.oauth-automator`

use std::path::{Path, PathBuf};

use directories::BaseDirs;
use tracing::debug;

use crate::error::{AutomatorError, AutomatorResult};
use crate::models::Provider;

/// Environment variable overriding the base directory
pub const HOME_OVERRIDE_VAR: &str = "OAUTH_AUTOMATOR_HOME";

const BASE_DIR_NAME: &str = ".oauth-automator";
const KEY_FILE_NAME: &str = ".key";
const HISTORY_FILE_NAME: &str = "history.enc";

/// Manages all paths used by oauth-automator
#[derive(Debug, Clone)]
pub struct AutomatorPaths {
    /// Base directory for the key file and per-provider history
    base_dir: PathBuf,
}

impl AutomatorPaths {
    /// Resolve the paths from the environment
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> AutomatorResult<Self> {
        let base_dir = match std::env::var_os(HOME_OVERRIDE_VAR) {
            Some(custom) if !custom.is_empty() => PathBuf::from(custom),
            _ => {
                let dirs = BaseDirs::new().ok_or_else(|| {
                    AutomatorError::Config("Could not determine home directory".into())
                })?;
                dirs.home_dir().join(BASE_DIR_NAME)
            }
        };

        debug!(base_dir = %base_dir.display(), "resolved automator paths");
        Ok(Self { base_dir })
    }

    /// Create AutomatorPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Get the base directory (~/.oauth-automator/ or equivalent)
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Get the path to the symmetric key file
    pub fn key_file(&self) -> PathBuf {
        self.base_dir.join(KEY_FILE_NAME)
    }

    /// Get the directory holding a provider's history
    pub fn provider_dir(&self, provider: Provider) -> PathBuf {
        self.base_dir.join(provider.dir_name())
    }

    /// Get the path to a provider's encrypted history file
    pub fn history_file(&self, provider: Provider) -> PathBuf {
        self.provider_dir(provider).join(HISTORY_FILE_NAME)
    }

    /// Ensure the base and provider directories exist, owner-only on unix
    pub fn ensure_directories(&self, provider: Provider) -> AutomatorResult<()> {
        create_private_dir(&self.base_dir)?;
        create_private_dir(&self.provider_dir(provider))?;
        Ok(())
    }

    /// Check whether secure logging has been initialized (key file exists)
    pub fn is_initialized(&self) -> bool {
        self.key_file().exists()
    }
}

#[cfg(unix)]
fn create_private_dir(path: &Path) -> AutomatorResult<()> {
    use std::os::unix::fs::DirBuilderExt;

    std::fs::DirBuilder::new()
        .recursive(true)
        .mode(0o700)
        .create(path)
        .map_err(|e| {
            AutomatorError::Io(format!(
                "Failed to create directory {}: {}",
                path.display(),
                e
            ))
        })
}

#[cfg(not(unix))]
fn create_private_dir(path: &Path) -> AutomatorResult<()> {
    std::fs::create_dir_all(path).map_err(|e| {
        AutomatorError::Io(format!(
            "Failed to create directory {}: {}",
            path.display(),
            e
        ))
    })
}
