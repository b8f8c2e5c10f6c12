use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use oauth_automator::cli::{
    handle_credentials_command, handle_history_command, handle_save_command,
    handle_save_dual_command, HistoryCommands, SaveArgs, SaveDualArgs,
};
use oauth_automator::config::{paths::AutomatorPaths, settings::Settings};
use oauth_automator::models::Provider;

#[derive(Parser)]
#[command(
    name = "oauth-automator",
    version,
    about = "Save OAuth app credentials to env files and an encrypted history",
    long_about = "oauth-automator stores the client id and secret of newly created \
                  OAuth apps. Existing keys in the target env file are either \
                  archived as comments or kept, with the new values written under \
                  a GENERATED_ prefix. Optionally every app is also recorded in an \
                  encrypted, append-only history."
)]
struct Cli {
    /// Increase log output (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Env file to read settings from
    #[arg(long, global = true, default_value = ".env")]
    env_file: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Save one app's credentials
    Save(SaveArgs),

    /// Save a dev and a prod app's credentials together
    SaveDual(SaveDualArgs),

    /// Show credential pairs saved in an env file (secrets masked)
    #[command(alias = "creds")]
    Credentials {
        /// Env file to inspect (defaults to --env-file)
        #[arg(short, long)]
        file: Option<PathBuf>,

        #[arg(short, long, value_enum, default_value_t = Provider::GitHub)]
        provider: Provider,
    },

    /// Encrypted history commands
    #[command(subcommand)]
    History(HistoryCommands),

    /// Show current configuration and paths
    Config,
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = if verbose > 0 {
        EnvFilter::new(default_level)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let paths = AutomatorPaths::new()?;
    let settings = Settings::load(&cli.env_file)?;

    match cli.command {
        Some(Commands::Save(args)) => {
            handle_save_command(&paths, &settings, args)?;
        }
        Some(Commands::SaveDual(args)) => {
            handle_save_dual_command(&paths, &settings, args)?;
        }
        Some(Commands::Credentials { file, provider }) => {
            let file = file.unwrap_or_else(|| cli.env_file.clone());
            handle_credentials_command(&file, provider)?;
        }
        Some(Commands::History(cmd)) => {
            handle_history_command(&paths, &cli.env_file, cmd)?;
        }
        Some(Commands::Config) => {
            println!("oauth-automator Configuration");
            println!("=============================");
            println!("Base directory: {}", paths.base_dir().display());
            println!("Key file:       {}", paths.key_file().display());
            println!("GitHub history: {}", paths.history_file(Provider::GitHub).display());
            println!("Google history: {}", paths.history_file(Provider::Google).display());
            println!("Settings file:  {}", cli.env_file.display());
            println!();
            println!("Settings:");
            println!("  App name:          {}", settings.app_name);
            println!("  Google app name:   {}", settings.google_app_name);
            println!("  Description:       {}", settings.app_description);
            println!("  Base URL:          {}", settings.base_url);
            println!("  Production URL:    {}", settings.prod_base_url);
            println!("  Callback URL:      {}", settings.callback_url);
            println!(
                "  GitHub password:   {}",
                if settings.github_password.is_some() { "set" } else { "not set" }
            );
            println!("  Secure logging:    {}", settings.secure_logging);
            println!("  Key initialized:   {}", paths.is_initialized());
            if let Some(profile) = &settings.browser_profile_path {
                println!("  Browser profile:   {}", profile.display());
            }
            if let Some(executable) = &settings.browser_executable_path {
                println!("  Browser:           {}", executable.display());
            }
        }
        None => {
            println!("oauth-automator - OAuth credential persistence");
            println!();
            println!("Run 'oauth-automator --help' for usage information.");
        }
    }

    Ok(())
}
