//! colnexa - command-line client for the Colnexa admin dashboard backend.
//!
//! Signs in against the content backend, keeps the session between runs,
//! and manages the services resource and the users listing.

mod app;

use std::io;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use colnexa_core::{Config, UserStatusFilter};

use app::App;

#[derive(Parser)]
#[command(name = "colnexa", version, about = "Colnexa admin dashboard client")]
struct Cli {
    /// Backend base URL (overrides config and COLNEXA_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Keep the session in the OS keychain instead of the cache directory
    #[arg(long, global = true)]
    keyring: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in with email or username
    Login {
        /// Email or username; prompted for if omitted
        identifier: Option<String>,
    },
    /// Sign out and forget the stored session
    Logout,
    /// Check the stored session against the backend
    Status,
    /// List users
    Users {
        /// Case-insensitive filter on username or email
        #[arg(long, default_value = "")]
        search: String,
        /// all, active or blocked
        #[arg(long, default_value = "all")]
        status: UserStatusFilter,
    },
    /// Manage services
    Services {
        #[command(subcommand)]
        command: ServiceCommand,
    },
}

#[derive(Subcommand)]
enum ServiceCommand {
    /// List services
    List {
        /// Case-insensitive filter on title or description
        #[arg(long, default_value = "")]
        search: String,
    },
    /// Create a service
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
    },
    /// Replace a service's title and description
    Update {
        id: i64,
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
    },
    /// Delete a service
    Delete { id: i64 },
}

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();
    let cli = Cli::parse();

    let mut config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            warn!(error = %e, "Failed to load config, using defaults");
            let mut c = Config::default();
            c.apply_overrides(|name| std::env::var(name).ok());
            c
        }
    };
    if let Some(url) = cli.api_url {
        config.api_url = url;
    }
    info!(api_url = %config.api_url, "colnexa starting");

    let mut app = App::new(config, cli.keyring)?;

    match cli.command {
        Commands::Login { identifier } => app.login(identifier).await,
        Commands::Logout => {
            app.logout().await;
            Ok(())
        }
        Commands::Status => {
            app.status().await;
            Ok(())
        }
        Commands::Users { search, status } => app.list_users(&search, status).await,
        Commands::Services { command } => match command {
            ServiceCommand::List { search } => app.list_services(&search).await,
            ServiceCommand::Create { title, description } => {
                app.create_service(title, description).await
            }
            ServiceCommand::Update {
                id,
                title,
                description,
            } => app.update_service(id, title, description).await,
            ServiceCommand::Delete { id } => app.delete_service(id).await,
        },
    }
}
