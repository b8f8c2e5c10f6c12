//! Secure history CLI commands
//!
//! Provides commands for listing, revealing and enabling the encrypted
//! credential history.

use std::path::{Path, PathBuf};

use clap::Subcommand;

use crate::config::paths::AutomatorPaths;
use crate::crypto::SecretKey;
use crate::display::{format_history_list, format_record_details};
use crate::error::{AutomatorError, AutomatorResult};
use crate::models::Provider;
use crate::services::CredentialService;

/// Secure history commands
#[derive(Subcommand)]
pub enum HistoryCommands {
    /// List logged apps (secrets hidden)
    #[command(alias = "ls")]
    List {
        #[arg(short, long, value_enum, default_value_t = Provider::GitHub)]
        provider: Provider,
    },

    /// Show one logged app including its client secret
    Reveal {
        /// Record number as shown by `history list`
        index: usize,

        #[arg(short, long, value_enum, default_value_t = Provider::GitHub)]
        provider: Provider,
    },

    /// Create the history key and turn on ENABLE_SECURE_LOGGING
    Enable {
        /// Env file holding the setting (defaults to the global --env-file)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Handle history commands
pub fn handle_history_command(
    paths: &AutomatorPaths,
    env_file: &Path,
    cmd: HistoryCommands,
) -> AutomatorResult<()> {
    let service = CredentialService::new(paths);

    match cmd {
        HistoryCommands::List { provider } => {
            let log = service.history(provider);
            if !log.exists() {
                println!("No {} apps logged yet.", provider);
                return Ok(());
            }
            let key = load_key(&service)?;
            print!("{}", with_newline(format_history_list(&log.list(&key)?)));
        }
        HistoryCommands::Reveal { index, provider } => {
            let key = load_key(&service)?;
            let record = service.history(provider).reveal(&key, index)?;
            print!("{}", format_record_details(index, &record));
        }
        HistoryCommands::Enable { file } => {
            let file = file.unwrap_or_else(|| env_file.to_path_buf());
            service.enable_secure_logging(&file)?;
            println!("Secure logging enabled.");
            println!("Key file: {}", paths.key_file().display());
            println!("Setting:  ENABLE_SECURE_LOGGING=true in {}", file.display());
        }
    }

    Ok(())
}

fn load_key(service: &CredentialService<'_>) -> AutomatorResult<SecretKey> {
    service.history_key().map_err(|e| {
        if e.is_not_found() {
            AutomatorError::Config(
                "Secure logging is not set up. Run 'oauth-automator history enable' first."
                    .to_string(),
            )
        } else {
            e
        }
    })
}

fn with_newline(mut text: String) -> String {
    if !text.ends_with('\n') {
        text.push('\n');
    }
    text
}
