//! Law office CLI - store maintenance and account management.
//!
//! # Usage
//!
//! ```bash
//! # Create the store (or bring its schema up to date)
//! lo-cli migrate
//!
//! # Manage accounts, acting as an administrator
//! lo-cli user create --as admin -u alice -n "Alice Example" -r lawyer
//! lo-cli user list --as admin
//! lo-cli user deactivate alice --as admin
//! lo-cli user passwd alice --as admin
//!
//! # Snapshots
//! lo-cli backup --as admin
//! lo-cli restore data/backups/law_office_backup_20260301_120000.db --as admin --yes
//! ```
//!
//! # Environment Variables
//!
//! - `LAW_OFFICE_*` - store location and bootstrap account, see `OfficeConfig`
//! - `LAW_OFFICE_PASSWORD` - password for `--as`; prompted for when unset
//! - `LAW_OFFICE_NEW_PASSWORD` - password for `user create`/`user passwd`
//! - `LAW_OFFICE_LOG_FORMAT=json` - emit JSON log lines
//! - `RUST_LOG` - log filter (default: `info`)

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use law_office_core::{Email, Role};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "lo-cli")]
#[command(author, version, about = "Law office records maintenance tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the store if needed and apply pending migrations
    Migrate,
    /// Manage user accounts
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Write a snapshot of the store
    Backup {
        #[command(flatten)]
        actor: Actor,

        /// Snapshot file to create (default: timestamped file in the backups directory)
        #[arg(short, long)]
        path: Option<PathBuf>,
    },
    /// Replace the store with a snapshot
    Restore {
        /// Snapshot file to restore from
        file: PathBuf,

        #[command(flatten)]
        actor: Actor,

        /// Confirm that everything written since the snapshot will be lost
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a new account
    Create {
        #[command(flatten)]
        actor: Actor,

        /// Login name
        #[arg(short, long)]
        username: String,

        /// Display name
        #[arg(short, long)]
        name: String,

        /// Role (`admin`, `lawyer`, `secretary`)
        #[arg(short, long, default_value = "secretary")]
        role: Role,

        /// Email address
        #[arg(short, long)]
        email: Option<Email>,

        /// Phone number
        #[arg(long)]
        phone: Option<String>,
    },
    /// List active accounts
    List {
        #[command(flatten)]
        actor: Actor,
    },
    /// Deactivate an account (it is kept, and its username stays reserved)
    Deactivate {
        /// Account to deactivate
        username: String,

        #[command(flatten)]
        actor: Actor,
    },
    /// Set a new password for an account
    Passwd {
        /// Account whose password changes
        username: String,

        #[command(flatten)]
        actor: Actor,
    },
}

/// The account the command runs as.
#[derive(Args)]
struct Actor {
    /// Username to log in as (default: the bootstrap administrator)
    #[arg(long = "as", value_name = "USERNAME")]
    username: Option<String>,
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,sqlx=warn".into());

    let json = std::env::var("LAW_OFFICE_LOG_FORMAT").is_ok_and(|v| v == "json");
    let json_layer = json.then(|| tracing_subscriber::fmt::layer().json().flatten_event(true));
    let text_layer = (!json).then(tracing_subscriber::fmt::layer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}

async fn run(cli: Cli) -> Result<(), commands::CliError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::User { action } => match action {
            UserAction::Create {
                actor,
                username,
                name,
                role,
                email,
                phone,
            } => {
                let account = commands::user::NewAccount {
                    username,
                    full_name: name,
                    role,
                    email,
                    phone,
                };
                commands::user::create(actor.username.as_deref(), account).await?;
            }
            UserAction::List { actor } => commands::user::list(actor.username.as_deref()).await?,
            UserAction::Deactivate { username, actor } => {
                commands::user::deactivate(actor.username.as_deref(), &username).await?;
            }
            UserAction::Passwd { username, actor } => {
                commands::user::passwd(actor.username.as_deref(), &username).await?;
            }
        },
        Commands::Backup { actor, path } => {
            commands::store::backup(actor.username.as_deref(), path.as_deref()).await?;
        }
        Commands::Restore { file, actor, yes } => {
            commands::store::restore(actor.username.as_deref(), &file, yes).await?;
        }
    }
    Ok(())
}
