//! gdocs-mcp CLI entry point

use std::path::PathBuf;
use std::sync::Arc;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use anyhow::Result;

use gdocs_mcp::auth::{CredentialManager, CredentialState, CredentialStore, FileCredentialStore, OAuthFlow};
use gdocs_mcp::config::{ClientSecrets, Config};
use gdocs_mcp::google::GoogleServices;
use gdocs_mcp::mcp::McpServer;
use gdocs_mcp::tools::ToolRunner;
use gdocs_mcp::ui;

#[derive(Parser)]
#[command(name = "gdocs-mcp")]
#[command(about = "Google Docs list/read/create tools over MCP (stdio)")]
#[command(version)]
struct Cli {
    /// OAuth client secret file (default: credentials.json next to the binary)
    #[arg(long, global = true)]
    credentials: Option<PathBuf>,

    /// Cached token file (default: token.json next to the binary)
    #[arg(long, global = true)]
    token: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the MCP server on stdin/stdout (default)
    Serve,

    /// Authorize with Google now instead of on the first tool call
    Login,

    /// Remove the cached token
    Logout,

    /// Show file locations and credential state
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    // stdout is the protocol channel; logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::with_paths(cli.credentials, cli.token);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => run_server(&config).await?,
        Commands::Login => run_login(&config).await?,
        Commands::Logout => {
            FileCredentialStore::new(&config.token_path).delete()?;
            ui::print_success(&format!("Removed cached token {:?}", config.token_path));
        }
        Commands::Status => show_status(&config)?,
    }

    Ok(())
}

fn credential_manager(config: &Config) -> Result<CredentialManager> {
    let secrets = ClientSecrets::load(&config.credentials_path)?;
    let store = Arc::new(FileCredentialStore::new(&config.token_path));
    let flow = Arc::new(OAuthFlow::new(secrets, config.scopes.clone()));
    Ok(CredentialManager::new(store, flow))
}

async fn run_server(config: &Config) -> Result<()> {
    let manager = credential_manager(config)?;
    let services = Arc::new(GoogleServices::new(manager, config));
    let server = McpServer::new(ToolRunner::new_with_defaults(services));
    server.serve_stdio().await?;
    Ok(())
}

async fn run_login(config: &Config) -> Result<()> {
    ui::print_header("login");

    let manager = match credential_manager(config) {
        Ok(manager) => manager,
        Err(e) => {
            ui::print_error(&e.to_string());
            return Err(e);
        }
    };

    let credential = manager.ensure_valid_credential().await?;
    ui::print_success("Authorized with Google");
    if let Some(expiry) = credential.credential().expiry {
        ui::print_step(&format!("Access token valid until {}", expiry.to_rfc3339()));
    }
    ui::print_step(&format!("Token cached at {:?}", config.token_path));
    Ok(())
}

fn show_status(config: &Config) -> Result<()> {
    ui::print_header("status");
    ui::print_step(&format!("Client secret: {:?}", config.credentials_path));
    if !config.credentials_path.exists() {
        ui::print_warning("Client secret file is missing; download it from the Google Cloud console");
    }
    ui::print_step(&format!("Token cache:   {:?}", config.token_path));

    let cached = FileCredentialStore::new(&config.token_path).load()?;
    match CredentialState::classify(cached.as_ref()) {
        CredentialState::Valid => ui::print_success("Cached credential is valid"),
        CredentialState::Refreshable => ui::print_step("Cached credential expired; it will be refreshed on next use"),
        CredentialState::NoCredential => ui::print_warning("No cached credential (run 'gdocs-mcp login')"),
        _ => ui::print_warning("Cached credential is unusable; consent will be requested on next use"),
    }
    Ok(())
}
