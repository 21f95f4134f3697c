use anyhow::{Context, bail};
use clap::Parser;
use docsearch_mcp::cli::{Cli, Commands};
use docsearch_mcp::server::DocSearchServer;
use docsearch_mcp::state::{IndexState, LoadedIndex};
use docsearch_mcp::tools::{
    SearchMode, SearchRequest, execute_search, format_response, handle_list_pages, handle_search,
};
use rmcp::{ServiceExt, transport::stdio};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.resolve_config().context("Invalid configuration")?;

    // Logs go to stderr so they never interleave with MCP traffic on stdout
    docsearch_mcp::tracing::init(config.log.format);
    match &config.source {
        Some(path) => tracing::debug!("Loaded config from {}", path.display()),
        None => tracing::debug!("No config file found, using defaults"),
    }

    let state = Arc::new(IndexState::new(config));

    match cli.command() {
        Commands::Serve => serve(state).await,
        Commands::Search {
            query,
            ranked,
            category,
            page,
            limit,
            json,
        } => {
            let request = SearchRequest {
                query: query.clone(),
                mode: if *ranked {
                    SearchMode::Ranked
                } else {
                    SearchMode::Substring
                },
                category: category.clone(),
                page: page.clone(),
                limit: *limit,
            };
            let loaded = open_configured(&state).await?;

            if *json {
                let outcome = execute_search(&loaded, &request, state.config())
                    .map_err(anyhow::Error::msg)?;
                println!("{}", serde_json::to_string_pretty(&outcome.hits)?);
            } else {
                let output = handle_search(&state, request)
                    .await
                    .map_err(anyhow::Error::msg)?;
                print!("{}", output);
            }
            Ok(())
        }
        Commands::Pages => {
            open_configured(&state).await?;
            let output = handle_list_pages(&state).await.map_err(anyhow::Error::msg)?;
            print!("{}", output);
            Ok(())
        }
        Commands::Check => {
            let loaded = open_configured(&state).await?;
            print!("{}", format_response(&loaded, None, true));
            Ok(())
        }
    }
}

async fn serve(state: Arc<IndexState>) -> anyhow::Result<()> {
    tracing::info!("Starting docsearch-mcp MCP server");

    if let Some(path) = state.config().index.clone() {
        // A broken startup index should not keep the server down; set_index can fix it
        if let Err(e) = state.set_active(&path).await {
            tracing::warn!("Could not load search index {}: {:#}", path.display(), e);
        }
    } else {
        tracing::info!("No search index configured; waiting for set_index");
    }

    let server = DocSearchServer::with_state(state);
    let service = server.serve(stdio()).await.inspect_err(|e| {
        tracing::error!("Error serving MCP server: {:?}", e);
    })?;

    service.waiting().await?;

    Ok(())
}

/// Activate the index named by the configuration, for one-shot commands.
async fn open_configured(state: &IndexState) -> anyhow::Result<Arc<LoadedIndex>> {
    let Some(path) = state.config().index.clone() else {
        bail!("No search index given; pass --index or set DOCSEARCH_INDEX");
    };
    let (loaded, _) = state.set_active(&path).await?;
    Ok(loaded)
}
