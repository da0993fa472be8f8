use anyhow::Result;
use axum::Router;
use ragview::{
    config::AppConfig,
    routes,
    services::{layout::ArtifactLayout, processor::CommandProcessor},
    state::AppState,
};
use std::{io::ErrorKind, sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // --- Logging setup ---
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // --- Parse config ---
    let cfg = AppConfig::from_env_and_args()?;

    tracing::info!("Starting ragview with config: {:?}", cfg);

    // --- Storage root (created and canonicalized by the layout) ---
    let layout = ArtifactLayout::new(&cfg.storage_dir)?;
    tracing::info!("Storage root at {}", layout.root().display());

    // --- External document processor ---
    let processor = Arc::new(CommandProcessor::new(
        cfg.processor_cmd.clone(),
        Duration::from_secs(cfg.processor_timeout_secs),
    ));

    // --- Build router ---
    let state = AppState::new(layout, processor);
    let app: Router = routes::routes::routes().with_state(state);

    // --- Start server ---
    let addr = cfg.addr();
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err)
            if err.kind() == ErrorKind::PermissionDenied
                && matches!(cfg.host.as_str(), "0.0.0.0" | "::") =>
        {
            let fallback_addr = format!("127.0.0.1:{}", cfg.port);
            tracing::warn!(
                "Permission denied binding to {} ({}). Falling back to {}",
                addr,
                err,
                fallback_addr
            );
            TcpListener::bind(&fallback_addr).await?
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!("Server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
