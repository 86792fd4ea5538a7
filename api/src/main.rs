// ============================================================================
// BLOG API
// ============================================================================

// - User registration/login with bcrypt password hashing
// - JWT authentication & per-post ownership checks
// - Thumbnail and avatar uploads served from /uploads
// - Uniform JSON errors
// - Structured logging

use blog_api::{AppState, config::{Config, ConfigError}};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Error)]
enum InitError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Error creating upload directory: {0}")]
    UploadDir(std::io::Error),
    #[error("Error binding tcp listener: {0}")]
    TcpBind(std::io::Error),
    #[error("Error serving server: {0}")]
    TcpServe(std::io::Error),
}

fn install_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "blog_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false).compact())
        .init();
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
    }
    info!("Shutting down");
}

#[tokio::main]
async fn main() -> Result<(), InitError> {
    install_tracing();
    let config = Config::from_env()?;

    // Create application state
    let state = AppState::new(&config);
    state
        .media
        .ensure_root()
        .await
        .map_err(InitError::UploadDir)?;

    let app = blog_api::app(state, config.max_body_bytes);

    // Start server
    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(InitError::TcpBind)?;

    info!("Server running on http://{}", addr);
    info!(upload_dir = %config.upload_dir.display(), "Serving uploads from /uploads");
    info!("API Endpoints:");
    info!("  GET    /health                          - Health check");
    info!("  POST   /api/users/register              - Create account");
    info!("  POST   /api/users/login                 - Login");
    info!("  GET    /api/users                       - List authors");
    info!("  GET    /api/users/:id                   - Get user");
    info!("  POST   /api/users/change-avatar         - Change avatar (auth)");
    info!("  PUT    /api/users/edit-user             - Edit profile (auth)");
    info!("  POST   /api/posts                       - Create post (auth)");
    info!("  GET    /api/posts                       - List posts");
    info!("  GET    /api/posts/:id                   - Get post");
    info!("  PUT    /api/posts/:id                   - Edit post (auth, owner only)");
    info!("  DELETE /api/posts/:id                   - Delete post (auth, owner only)");
    info!("  GET    /api/posts/categories/:category  - Posts in category");
    info!("  GET    /api/posts/users/:id             - Posts by author");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(InitError::TcpServe)
}
