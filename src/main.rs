use std::sync::Arc;

use press_hook::{create_router, serve, Config, Result};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))?;
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let state = Arc::new(config.app_state()?);
    let app = create_router(state, &config.hook_path);

    let shutdown = CancellationToken::new();
    let ctrl_c = shutdown.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Could not listen for shutdown signal: {e}");
            return;
        }
        tracing::info!("Shutting down");
        ctrl_c.cancel();
    });

    tracing::info!("Accepting Forgejo pushes on {}", config.hook_path);
    serve(&config.listen, app, shutdown).await
}
