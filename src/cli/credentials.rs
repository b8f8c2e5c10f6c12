//! Saved credentials CLI command

use std::path::Path;

use crate::display::format_saved_credentials;
use crate::error::AutomatorResult;
use crate::models::Provider;
use crate::storage::EnvStore;

/// Show the credential pairs saved in an env file, secrets masked
pub fn handle_credentials_command(path: &Path, provider: Provider) -> AutomatorResult<()> {
    let store = EnvStore::new(path);
    if !store.exists() {
        println!("{} does not exist.", path.display());
        return Ok(());
    }

    let saved = store.saved_credentials(provider)?;
    let output = format_saved_credentials(path, provider, &saved);
    println!("{}", output.trim_end());
    Ok(())
}
