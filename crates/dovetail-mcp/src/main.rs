//! Dovetail MCP server
//!
//! Serves the Dovetail research API as MCP tools over stdin/stdout. Logs go
//! to stderr since stdout carries the protocol.

mod cli;
mod protocol;
mod server;
mod tools;

use anyhow::{Context, Result};
use clap::Parser;
use dovetail_api::DovetailClient;
use dovetail_core::DovetailConfig;
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::Cli;
use server::McpServer;
use tools::ToolRegistry;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize rustls crypto provider (required for rustls 0.23+)
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    run(cli).await
}

async fn run(cli: Cli) -> Result<()> {
    let config = DovetailConfig::load(cli.config.as_deref())
        .context("Failed to load configuration")?
        .with_token(cli.api_token)
        .with_base_url(cli.base_url)
        .with_max_retries(cli.max_retries);
    config.validate().context("Invalid configuration")?;

    let client = DovetailClient::new(&config).context("Failed to create Dovetail API client")?;
    let server = McpServer::new(ToolRegistry::new(client));

    info!(
        base_url = %config.api.base_url,
        max_retries = config.retry.max_retries,
        "Dovetail MCP server running on stdio"
    );

    server
        .serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
        .await
}

/// Initialize tracing on stderr with appropriate verbosity
fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}
