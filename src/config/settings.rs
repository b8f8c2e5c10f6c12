//! Tool settings loaded from a `.env` file
//!
//! The project's `.env` both receives generated credentials and configures the
//! tool itself. Values from the process environment win over the file, so a
//! one-off `ENABLE_SECURE_LOGGING=true oauth-automator ...` behaves as expected.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::crypto::SecureString;
use crate::error::{AutomatorError, AutomatorResult};

pub const APP_NAME_VAR: &str = "OAUTH_APP_NAME";
pub const GOOGLE_APP_NAME_VAR: &str = "GOOGLE_OAUTH_APP_NAME";
pub const APP_DESCRIPTION_VAR: &str = "OAUTH_APP_DESCRIPTION";
pub const BASE_URL_VAR: &str = "OAUTH_BASE_URL";
pub const PROD_BASE_URL_VAR: &str = "OAUTH_PROD_BASE_URL";
pub const CALLBACK_URL_VAR: &str = "OAUTH_CALLBACK_URL";
pub const GITHUB_PASSWORD_VAR: &str = "GITHUB_PASSWORD";
pub const SECURE_LOGGING_VAR: &str = "ENABLE_SECURE_LOGGING";
pub const BROWSER_PROFILE_VAR: &str = "BROWSER_PROFILE_PATH";
pub const BROWSER_EXECUTABLE_VAR: &str = "BROWSER_EXECUTABLE_PATH";

const GITHUB_CALLBACK_PATH: &str = "/api/auth/callback/github";

/// Settings recognized by the tool
#[derive(Debug, Clone)]
pub struct Settings {
    /// Default name for new GitHub OAuth apps
    pub app_name: String,

    /// Default name for new Google OAuth clients
    pub google_app_name: String,

    /// Description entered on the provider form
    pub app_description: String,

    /// Homepage URL for development apps
    pub base_url: String,

    /// Homepage URL for production apps
    pub prod_base_url: String,

    /// Authorization callback URL
    pub callback_url: String,

    /// Password for GitHub sudo mode, if stored
    pub github_password: Option<SecureString>,

    /// Whether created credentials are appended to the encrypted history
    pub secure_logging: bool,

    /// Persistent browser profile directory
    pub browser_profile_path: Option<PathBuf>,

    /// Explicit browser executable
    pub browser_executable_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl Settings {
    /// Load settings from an env file, overlaid by the process environment
    ///
    /// A missing file yields the defaults (still overlaid by the environment).
    pub fn load(env_file: &Path) -> AutomatorResult<Self> {
        let file_values = read_env_file(env_file)?;
        debug!(
            file = %env_file.display(),
            keys = file_values.len(),
            "loaded settings file"
        );

        Ok(Self::from_lookup(|key| {
            std::env::var(key)
                .ok()
                .or_else(|| file_values.get(key).cloned())
        }))
    }

    /// Build settings from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let base_url = get(BASE_URL_VAR).unwrap_or_else(|| "http://localhost:3000".to_string());
        let callback_url = get(CALLBACK_URL_VAR)
            .unwrap_or_else(|| format!("{}{}", base_url.trim_end_matches('/'), GITHUB_CALLBACK_PATH));

        Self {
            app_name: get(APP_NAME_VAR).unwrap_or_else(|| "my-oauth-app".to_string()),
            google_app_name: get(GOOGLE_APP_NAME_VAR)
                .unwrap_or_else(|| "my-google-app".to_string()),
            app_description: get(APP_DESCRIPTION_VAR)
                .unwrap_or_else(|| "Created via automation".to_string()),
            prod_base_url: get(PROD_BASE_URL_VAR)
                .unwrap_or_else(|| "https://your-production-domain.com".to_string()),
            base_url,
            callback_url,
            github_password: get(GITHUB_PASSWORD_VAR).map(SecureString::from),
            secure_logging: get(SECURE_LOGGING_VAR)
                .map(|v| v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            browser_profile_path: get(BROWSER_PROFILE_VAR).map(PathBuf::from),
            browser_executable_path: get(BROWSER_EXECUTABLE_VAR).map(PathBuf::from),
        }
    }
}

fn read_env_file(path: &Path) -> AutomatorResult<HashMap<String, String>> {
    if !path.exists() {
        return Ok(HashMap::new());
    }

    let iter = dotenvy::from_path_iter(path).map_err(|e| {
        AutomatorError::Config(format!("Failed to read {}: {}", path.display(), e))
    })?;

    let mut values = HashMap::new();
    for item in iter {
        let (key, value) = item.map_err(|e| {
            AutomatorError::Config(format!("Failed to parse {}: {}", path.display(), e))
        })?;
        values.insert(key, value);
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.app_name, "my-oauth-app");
        assert_eq!(settings.base_url, "http://localhost:3000");
        assert_eq!(
            settings.callback_url,
            "http://localhost:3000/api/auth/callback/github"
        );
        assert!(!settings.secure_logging);
        assert!(settings.github_password.is_none());
    }

    #[test]
    fn test_lookup_values() {
        let values: HashMap<&str, &str> = [
            ("OAUTH_APP_NAME", "acme-login"),
            ("OAUTH_BASE_URL", "https://acme.test/"),
            ("ENABLE_SECURE_LOGGING", "TRUE"),
            ("GITHUB_PASSWORD", "hunter2"),
            ("BROWSER_PROFILE_PATH", "  "),
        ]
        .into_iter()
        .collect();

        let settings = Settings::from_lookup(|k| values.get(k).map(|v| v.to_string()));

        assert_eq!(settings.app_name, "acme-login");
        assert_eq!(
            settings.callback_url,
            "https://acme.test/api/auth/callback/github"
        );
        assert!(settings.secure_logging);
        assert_eq!(settings.github_password.unwrap().as_str(), "hunter2");
        assert!(settings.browser_profile_path.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let env_file = temp_dir.path().join(".env");
        std::fs::write(
            &env_file,
            "# tool settings\nOAUTH_APP_DESCRIPTION=\"Nightly build\"\nOAUTH_PROD_BASE_URL=https://prod.acme.test\n",
        )
        .unwrap();

        let settings = Settings::load(&env_file).unwrap();
        assert_eq!(settings.app_description, "Nightly build");
        assert_eq!(settings.prod_base_url, "https://prod.acme.test");
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let settings = Settings::load(&temp_dir.path().join(".env.missing")).unwrap();
        assert_eq!(settings.google_app_name, "my-google-app");
    }
}
