use crate::{
    auth::{PasswordHasher, TokenService},
    config::Config,
    media::MediaStore,
    store::{PostStore, UserStore},
};
use axum::extract::FromRef;
use std::sync::Arc;

// ============================================================================
// APPLICATION STATE - Shared data across all requests
// ============================================================================
/// Cloned into every request. Everything behind an `Arc` is shared; the
/// stores handle their own synchronization.
///
/// `FromRef` lets extractors such as `AuthUser` pull out just the piece
/// they need.
#[derive(Clone, FromRef)]
pub struct AppState {
    pub users: Arc<UserStore>,
    pub posts: Arc<PostStore>,
    pub tokens: Arc<TokenService>,
    pub media: Arc<MediaStore>,
    pub passwords: PasswordHasher,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            users: Arc::new(UserStore::new()),
            posts: Arc::new(PostStore::new()),
            tokens: Arc::new(TokenService::new(&config.jwt_secret)),
            media: Arc::new(MediaStore::new(&config.upload_dir)),
            passwords: PasswordHasher::new(config.bcrypt_cost),
        }
    }
}
