//! Blog backend: user accounts, token authentication and post CRUD with
//! thumbnail/avatar uploads, served over HTTP with axum.

pub mod auth;
pub mod config;
pub mod dto;
pub mod errors;
pub mod extract;
pub mod media;
pub mod models;
pub mod policy;
pub mod routes;
pub mod states;
pub mod store;

pub use states::AppState;

use axum::{Router, extract::DefaultBodyLimit};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

/// Builds the full application: API routes, uploaded files under
/// `/uploads`, and the shared middleware stack.
pub fn app(state: AppState, max_body_bytes: usize) -> Router {
    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let uploads = ServeDir::new(state.media.root());

    routes::routes()
        .nest_service("/uploads", uploads)
        .fallback(routes::fallback)
        .method_not_allowed_fallback(routes::method_not_allowed)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(DefaultBodyLimit::max(max_body_bytes)),
        )
}
