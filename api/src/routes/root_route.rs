use axum::Json;
use serde_json::{Value, json};

/// Liveness probe used by the frontend to confirm the relay is reachable.
pub async fn backend_running() -> Json<Value> {
    Json(json!({ "message": "Backend is running" }))
}
