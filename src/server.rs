use std::sync::Arc;

use axum::routing::{get, post};
use axum::{Extension, Router};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::app_state::AppState;
use crate::error::Result;
use crate::handlers::{health_handler, push_hook_handler};

pub fn create_router(state: Arc<AppState>, hook_path: &str) -> Router {
    Router::new()
        .route(hook_path, post(push_hook_handler))
        .route("/health", get(health_handler))
        .layer(Extension(state))
}

/// Serves `app` until `shutdown` is cancelled.
pub async fn serve(listen: &str, app: Router, shutdown: CancellationToken) -> Result<()> {
    let listener = TcpListener::bind(listen).await?;
    tracing::info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}
