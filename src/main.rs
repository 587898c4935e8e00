//! Repo Gateway - HTTP front for browsing and editing hosted repositories
//!
//! # Usage
//! ```bash
//! GITHUB_TOKEN=... GITHUB_USER=octo repo-gateway              # Start server on 0.0.0.0:5000
//! repo-gateway --token ... --owner octo --port 8080           # Explicit settings
//! repo-gateway --token ... --owner octo check-token           # Verify the credential
//! ```

mod error;
mod explorer;
mod hosting;
mod models;
mod routes;

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use clap::{Parser, Subcommand};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hosting::github::DEFAULT_API_URL;
use hosting::{GitHubClient, HostingClient, SharedClient};

/// Repo Gateway - Browse and edit hosted repositories over a small JSON API
#[derive(Parser)]
#[command(name = "repo-gateway")]
#[command(about = "HTTP gateway to a source-control hosting API", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// API token used for every hosting API call
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: String,

    /// User or organisation owning the served repositories
    #[arg(long, env = "GITHUB_USER")]
    owner: String,

    /// Base URL of the hosting API
    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Address to bind the server to
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Port to run the server on
    #[arg(short, long, default_value = "5000")]
    port: u16,
}

#[derive(Subcommand)]
enum Commands {
    /// Authenticate with the token and list a few repositories
    CheckToken,
}

const CHECK_TOKEN_REPO_LIMIT: u8 = 5;

async fn handle_check_token(client: &dyn HostingClient) -> anyhow::Result<()> {
    let login = client
        .authenticated_user()
        .await
        .context("Failed to authenticate")?;
    let repos = client
        .repositories(CHECK_TOKEN_REPO_LIMIT)
        .await
        .context("Failed to list repositories")?;

    println!("Authenticated as: {}", login);
    println!("Repos: {}", repos.join(", "));
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    if cli.token.trim().is_empty() {
        anyhow::bail!("Please set a non-empty token with --token or GITHUB_TOKEN");
    }

    let client = GitHubClient::new(&cli.api_url, cli.token.trim(), cli.owner.as_str())
        .context("Failed to build hosting client")?;
    tracing::info!("Serving repositories of {} via {}", client.owner(), cli.api_url);

    if let Some(Commands::CheckToken) = cli.command {
        return handle_check_token(&client).await;
    }

    let client: SharedClient = Arc::new(client);

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .merge(routes::create_router(client))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", cli.host, cli.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
