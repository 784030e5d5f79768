use std::{path::PathBuf, process::ExitCode, sync::Arc};

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use registry::Registry;
use shared::{domain::Role, error::AppError};
use storage::{KeyValueStore, MemoryStore, Storage};
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use commands::{run, StdinPrompter};
use config::load_settings;

#[derive(Parser, Debug)]
#[command(name = "temu-balik", about = "Campus lost-and-found desk")]
struct Cli {
    /// Configuration file; defaults to ./temu-balik.toml when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[arg(long, global = true)]
    database_url: Option<String>,
    /// Keep everything in memory for this invocation only.
    #[arg(long, global = true)]
    ephemeral: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum RoleArg {
    User,
    Admin,
}

impl From<RoleArg> for Role {
    fn from(value: RoleArg) -> Self {
        match value {
            RoleArg::User => Role::User,
            RoleArg::Admin => Role::Admin,
        }
    }
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// Show or switch the active role.
    Role {
        #[arg(value_enum)]
        role: Option<RoleArg>,
    },
    /// List available items, newest first.
    Gallery {
        #[arg(long, default_value = "")]
        query: String,
    },
    Show {
        item_id: String,
    },
    /// Report a found item for admin verification.
    Report {
        #[arg(long)]
        title: String,
        #[arg(long)]
        location: String,
        #[arg(long)]
        date: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "")]
        contact: String,
        #[arg(long)]
        image: Option<PathBuf>,
    },
    Claim {
        item_id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        contact: String,
        #[arg(long)]
        note: Option<String>,
    },
    Queue {
        #[arg(long, default_value = "")]
        query: String,
    },
    Approve {
        report_id: String,
    },
    Reject {
        report_id: String,
    },
    /// List pending claims.
    Claims,
    AcceptClaim {
        claim_id: String,
    },
    RejectClaim {
        claim_id: String,
    },
    Stats,
    Export {
        #[arg(long)]
        out: Option<PathBuf>,
    },
    Import {
        path: PathBuf,
        #[arg(long)]
        yes: bool,
    },
    /// Restore the demo data.
    Reset {
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    match start(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => match err.downcast_ref::<AppError>() {
            Some(app) => {
                eprintln!("{}", app.message);
                if app.is_user_error() {
                    ExitCode::from(2)
                } else {
                    ExitCode::FAILURE
                }
            }
            None => {
                error!("{err:#}");
                ExitCode::FAILURE
            }
        },
    }
}

async fn start(cli: Cli) -> Result<()> {
    let mut settings = load_settings(cli.config.as_deref())?;
    if let Some(url) = cli.database_url {
        settings.database_url = url;
    }

    let store: Arc<dyn KeyValueStore> = if cli.ephemeral {
        Arc::new(MemoryStore::new())
    } else {
        let database_url = settings.prepared_database_url();
        let storage = Storage::new(&database_url).await?;
        storage.health_check().await?;
        debug!(%database_url, "storage ready");
        Arc::new(storage)
    };

    let mut registry = Registry::open(store, settings.registry_options()).await;
    let mut stdout = std::io::stdout().lock();
    run(&mut registry, cli.command, &mut stdout, &mut StdinPrompter).await
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
