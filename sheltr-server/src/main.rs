mod api;
mod config;
mod error;
mod store;

use std::sync::Arc;

use clap::Parser;
use sheltr_core::RawNetwork;

use crate::api::AppState;
use crate::config::{Args, ServerConfig};
use crate::store::GraphStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => ServerConfig::from_toml_file(path)?,
        None => ServerConfig::default(),
    };
    config.routing.validate()?;
    let area_of_interest = args.area_of_interest()?;

    tracing::info!(snapshot = %args.snapshot.display(), "Loading street network snapshot");
    let snapshot = RawNetwork::from_json_file(&args.snapshot)?;
    tracing::info!(
        nodes = snapshot.nodes.len(),
        edges = snapshot.edges.len(),
        "Snapshot loaded"
    );

    let store = GraphStore::new(snapshot, config.network.clone(), config.max_cached_graphs)?;
    if let Some(bbox) = &area_of_interest {
        // Warm the cache so the first request does not pay for the build
        store.graph_for(bbox)?;
    }

    let state = AppState {
        store: Arc::new(store),
        area_of_interest,
        options: config.routing.clone(),
        default_k: config.default_k,
        max_k: config.max_k,
        timeout: config.query_timeout(),
    };
    let app = api::router(state, config.max_concurrent_queries);

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Sheltr server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(%err, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutting down");
}
