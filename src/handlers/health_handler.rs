use axum::Json;
use serde_json::json;

pub async fn health_handler() -> Json<serde_json::Value> {
    tracing::trace!("Liveness check");

    Json(json!({ "status": "alive", "service": env!("CARGO_PKG_NAME") }))
}
