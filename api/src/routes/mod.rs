use crate::{errors::ApiError, states::AppState};
use axum::{
    Router,
    http::{Method, Uri},
    routing::get,
};

mod health;
mod post;
mod user;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api/users", user::routes())
        .nest("/api/posts", post::routes())
}

pub async fn fallback(uri: Uri) -> ApiError {
    ApiError::NotFound(format!("Not Found - {uri}"))
}

pub async fn method_not_allowed(method: Method) -> ApiError {
    ApiError::MethodNotAllowed(method.to_string())
}
