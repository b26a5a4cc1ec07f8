use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use neon_genesis::backend::{ActorHandle, Backend, HttpBackend, MemoryBackend};
use neon_genesis::config::{BackendMode, Cli, Config};
use neon_genesis::routes;
use neon_genesis::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Parse CLI args and load config
    let cli = Cli::parse();
    let config = Config::load(&cli)?;

    let backend: Arc<dyn Backend> = match config.backend.mode {
        BackendMode::Http => {
            let client =
                HttpBackend::new(&config.backend.url, config.backend.request_timeout())?;
            tracing::info!("Backend gateway: {}", client.base_url());
            Arc::new(client)
        }
        BackendMode::Memory => {
            tracing::warn!("Using in-memory backend; data is lost on exit");
            Arc::new(MemoryBackend::new())
        }
    };

    let state = AppState::new(config.clone(), ActorHandle::ready(backend));
    let app = routes::router(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
