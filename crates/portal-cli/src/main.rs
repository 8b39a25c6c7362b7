// Operator CLI for the portal: sign in, review posts, rebrand projects.

use anyhow::Context;
use async_lock::RwLock;
use clap::{Parser, Subcommand};
use portal_app::{AppConfig, AppCore, SyncStatusBroadcaster};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{BrandingCommand, PostsCommand};

const DEFAULT_STORAGE_DIR: &str = ".portal/data";

#[derive(Parser)]
#[command(name = "portal")]
#[command(about = "Portal - multi-tenant content approval", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file path
    #[arg(short, long, global = true, default_value = ".portal/config.toml")]
    config: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and remember the session
    Login {
        /// Account username
        username: String,

        /// Account password; read from stdin when omitted
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Forget the stored session
    Logout,

    /// Show the signed-in principal and its capabilities
    Whoami,

    /// List projects the session can view
    Projects,

    /// Switch the selected project
    Select {
        /// Project id (zrmc, tvh, sbh)
        project: String,
    },

    /// Review and schedule posts in the selected project
    Posts {
        #[command(subcommand)]
        command: PostsCommand,
    },

    /// Show or change project branding
    Branding {
        #[command(subcommand)]
        command: BrandingCommand,
    },

    /// Show the last sync status
    SyncStatus,
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let app = open_app(&cli.config).await?;
    portal_app::workflows::rehydrate(&app)
        .await
        .context("restoring stored session")?;

    match cli.command {
        Commands::Login { username, password } => {
            let password = match password {
                Some(password) => password,
                None => commands::account::prompt_password()?,
            };
            commands::account::login(&app, &username, &password).await?;
        }
        Commands::Logout => commands::account::logout(&app).await?,
        Commands::Whoami => commands::account::whoami(&app).await,
        Commands::Projects => commands::account::projects(&app).await,
        Commands::Select { project } => commands::account::select(&app, &project).await?,
        Commands::Posts { command } => commands::posts::run(&app, command).await?,
        Commands::Branding { command } => commands::branding::run(&app, command).await?,
        Commands::SyncStatus => commands::sync::show(&app).await,
    }
    Ok(())
}

async fn open_app(config_path: &Path) -> anyhow::Result<Arc<RwLock<AppCore>>> {
    let mut config = AppConfig::load(config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    if config.storage_dir.is_none() {
        config.storage_dir = Some(PathBuf::from(DEFAULT_STORAGE_DIR));
    }
    if let Some(dir) = &config.storage_dir {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("creating {}", dir.display()))?;
    }

    debug!(config = %config_path.display(), storage = ?config.storage_dir, "Opening portal");
    let core = AppCore::new(config)?.with_sync(SyncStatusBroadcaster::global().clone());
    Ok(Arc::new(RwLock::new(core)))
}
