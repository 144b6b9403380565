use axum::Json;
use serde_json::{json, Value};

/// GET /healthz
pub async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}
