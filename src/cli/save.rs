//! Save CLI commands
//!
//! Hands a finished credential set (or a dev + prod pair) to the persistence
//! service. When no conflict policy is given and the target keys already
//! exist, an interactive terminal is asked which policy to use.

use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};

use clap::Args;
use tracing::info;

use crate::audit::Environment;
use crate::config::{paths::AutomatorPaths, settings::Settings};
use crate::display::format_persist_summary;
use crate::envfile::ConflictPolicy;
use crate::error::AutomatorResult;
use crate::models::{EnvTarget, OAuthCredentials, Provider};
use crate::services::{CredentialService, DualOptions, DualWriteMode, PersistOptions};

/// Arguments for saving one credential set
#[derive(Args)]
pub struct SaveArgs {
    /// OAuth provider the app belongs to
    #[arg(short, long, value_enum, default_value_t = Provider::GitHub)]
    pub provider: Provider,

    /// App name (defaults to OAUTH_APP_NAME / GOOGLE_OAUTH_APP_NAME)
    #[arg(short, long)]
    pub app_name: Option<String>,

    /// Client ID issued by the provider
    #[arg(long)]
    pub client_id: String,

    /// Client secret issued by the provider
    #[arg(long, env = "OAUTH_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: String,

    /// Google Cloud project ID
    #[arg(long)]
    pub project_id: Option<String>,

    /// Env file to write to
    #[arg(short, long, conflicts_with = "target")]
    pub file: Option<PathBuf>,

    /// Well-known env file in the current directory
    #[arg(short, long, value_enum, default_value_t = EnvTarget::Env)]
    pub target: EnvTarget,

    /// What to do with keys that already exist (asks when omitted)
    #[arg(long, value_enum)]
    pub policy: Option<ConflictPolicy>,

    /// Force a prefix onto every written key (e.g. PROD)
    #[arg(long)]
    pub prefix: Option<String>,

    /// Environment the app was created for
    #[arg(short, long, value_enum, default_value_t = Environment::Dev)]
    pub environment: Environment,

    /// Homepage URL registered for the app
    #[arg(long)]
    pub homepage: Option<String>,

    /// Record the credentials in the secure history
    #[arg(long, overrides_with = "no_log")]
    pub log: bool,

    /// Don't record the credentials, even if ENABLE_SECURE_LOGGING is set
    #[arg(long, overrides_with = "log")]
    pub no_log: bool,
}

/// Arguments for saving a dev + prod pair
#[derive(Args)]
pub struct SaveDualArgs {
    #[arg(short, long, value_enum, default_value_t = Provider::GitHub)]
    pub provider: Provider,

    /// Base app name; `-dev` and `-prod` are appended
    #[arg(short, long)]
    pub app_name: Option<String>,

    #[arg(long)]
    pub dev_client_id: String,

    #[arg(long, env = "OAUTH_DEV_CLIENT_SECRET", hide_env_values = true)]
    pub dev_client_secret: String,

    #[arg(long)]
    pub prod_client_id: String,

    #[arg(long, env = "OAUTH_PROD_CLIENT_SECRET", hide_env_values = true)]
    pub prod_client_secret: String,

    #[arg(long)]
    pub project_id: Option<String>,

    /// How the two sets are written
    #[arg(short, long, value_enum, default_value_t = DualWriteMode::Combined)]
    pub mode: DualWriteMode,

    /// File for dev credentials (and prod too in combined mode)
    #[arg(long, default_value = ".env")]
    pub dev_file: PathBuf,

    /// File for prod credentials in split mode
    #[arg(long, default_value = ".env.production")]
    pub prod_file: PathBuf,

    #[arg(long, value_enum, default_value_t = ConflictPolicy::Prefix)]
    pub policy: ConflictPolicy,

    #[arg(long, overrides_with = "no_log")]
    pub log: bool,

    #[arg(long, overrides_with = "log")]
    pub no_log: bool,
}

/// Handle `save`
pub fn handle_save_command(
    paths: &AutomatorPaths,
    settings: &Settings,
    args: SaveArgs,
) -> AutomatorResult<()> {
    let app_name = args
        .app_name
        .unwrap_or_else(|| default_app_name(settings, args.provider).to_string());
    let credentials = build_credentials(
        args.provider,
        app_name,
        args.client_id,
        args.client_secret,
        args.project_id,
    );

    let env_file = match args.file {
        Some(file) => file,
        None => args.target.path_in(std::env::current_dir()?),
    };

    let service = CredentialService::new(paths);
    let policy = match args.policy {
        Some(policy) => policy,
        None => {
            let conflicts =
                service.conflicts(&credentials, &env_file, args.prefix.as_deref())?;
            if conflicts.is_empty() {
                ConflictPolicy::default()
            } else {
                choose_policy(&env_file, &conflicts)?
            }
        }
    };

    let homepage = args.homepage.or_else(|| {
        Some(match args.environment {
            Environment::Dev => settings.base_url.clone(),
            Environment::Prod => settings.prod_base_url.clone(),
        })
    });

    let summary = service.persist(
        &credentials,
        &PersistOptions {
            env_file: Some(env_file),
            policy,
            key_prefix: args.prefix,
            environment: args.environment,
            homepage,
            secure_logging: logging_enabled(settings, args.log, args.no_log),
        },
    )?;

    print!("{}", format_persist_summary(&summary));
    Ok(())
}

/// Handle `save-dual`
pub fn handle_save_dual_command(
    paths: &AutomatorPaths,
    settings: &Settings,
    args: SaveDualArgs,
) -> AutomatorResult<()> {
    let base_name = args
        .app_name
        .unwrap_or_else(|| default_app_name(settings, args.provider).to_string());

    let dev = build_credentials(
        args.provider,
        format!("{}-dev", base_name),
        args.dev_client_id,
        args.dev_client_secret,
        args.project_id.clone(),
    );
    let prod = build_credentials(
        args.provider,
        format!("{}-prod", base_name),
        args.prod_client_id,
        args.prod_client_secret,
        args.project_id,
    );

    let service = CredentialService::new(paths);
    let summaries = service.persist_dual(
        &dev,
        &prod,
        &DualOptions {
            mode: args.mode,
            dev_file: args.dev_file,
            prod_file: args.prod_file,
            policy: args.policy,
            dev_homepage: Some(settings.base_url.clone()),
            prod_homepage: Some(settings.prod_base_url.clone()),
            secure_logging: logging_enabled(settings, args.log, args.no_log),
        },
    )?;

    for (i, summary) in summaries.iter().enumerate() {
        if i > 0 {
            println!();
        }
        print!("{}", format_persist_summary(summary));
    }
    Ok(())
}

fn default_app_name(settings: &Settings, provider: Provider) -> &str {
    match provider {
        Provider::GitHub => &settings.app_name,
        Provider::Google => &settings.google_app_name,
    }
}

fn build_credentials(
    provider: Provider,
    app_name: String,
    client_id: String,
    client_secret: String,
    project_id: Option<String>,
) -> OAuthCredentials {
    match provider {
        Provider::GitHub => OAuthCredentials::github(app_name, client_id, client_secret),
        Provider::Google => {
            OAuthCredentials::google(app_name, client_id, client_secret, project_id)
        }
    }
}

fn logging_enabled(settings: &Settings, log: bool, no_log: bool) -> bool {
    if no_log {
        false
    } else {
        log || settings.secure_logging
    }
}

/// Ask which policy to apply; non-interactive runs keep both values
fn choose_policy(env_file: &Path, conflicts: &[String]) -> AutomatorResult<ConflictPolicy> {
    if !std::io::stdin().is_terminal() {
        info!(
            file = %env_file.display(),
            keys = ?conflicts,
            "existing keys found, writing new values under a generated prefix"
        );
        return Ok(ConflictPolicy::Prefix);
    }

    println!("These keys already exist in {}:", env_file.display());
    for key in conflicts {
        println!("  {}", key);
    }
    println!();
    println!("  [a] Archive: comment out the old values and write the new ones");
    println!("  [p] Prefix:  keep the old values, write the new ones as GENERATED_*");
    print!("Choose [a/P]: ");
    std::io::stdout().flush()?;

    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;

    Ok(parse_policy_answer(&answer))
}

fn parse_policy_answer(answer: &str) -> ConflictPolicy {
    match answer.trim().to_lowercase().as_str() {
        "a" | "archive" => ConflictPolicy::Archive,
        _ => ConflictPolicy::Prefix,
    }
}
