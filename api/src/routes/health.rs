use crate::AppState;
use axum::{Json, extract::State};
use chrono::Utc;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: &'static str,
    service: &'static str,
    version: &'static str,
    users: usize,
    posts: usize,
    timestamp: String,
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        users: state.users.count(),
        posts: state.posts.count(),
        timestamp: Utc::now().to_rfc3339(),
    })
}
