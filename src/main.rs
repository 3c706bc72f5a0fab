use anyhow::Context;
use listing_search::{ListingServer, SearchConfig, SearchState};
use rmcp::{ServiceExt, transport::stdio};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries the MCP protocol
    listing_search::tracing::init();

    tracing::info!("Starting listing-search MCP server");

    let config = SearchConfig::load().context("Failed to load configuration")?;
    match &config.source {
        Some(source) => tracing::info!("Default listing source: {}", source.display()),
        None => tracing::warn!(
            "No default listing source configured; requests must name one (set {})",
            listing_search::config::SOURCE_ENV
        ),
    }

    let state = SearchState::new(config).context("Failed to build search vocabularies")?;
    let server = ListingServer::new(state);

    let service = server.serve(stdio()).await.inspect_err(|e| {
        tracing::error!("Error serving MCP server: {:?}", e);
    })?;

    service.waiting().await?;

    Ok(())
}
