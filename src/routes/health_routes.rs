use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};

use crate::state::AppState;

pub fn create_health_router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "flota_dashboard",
        "version": env!("CARGO_PKG_VERSION"),
        "environment": state.config.environment,
        "data_source": state.data_source.name(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
