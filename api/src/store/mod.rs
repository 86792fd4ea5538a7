//! In-process document store.
//!
//! Users and posts live in `DashMap`s keyed by id. Each map entry is one
//! document, so single-document updates are atomic without extra locking.

mod posts;
mod users;

use thiserror::Error;
use uuid::Uuid;

pub use posts::{NewPost, PostStore, PostUpdate};
pub use users::{NewUser, ProfileUpdate, UserStore, normalize_email};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Email already exists.")]
    DuplicateEmail,
    #[error("User {0} not found")]
    UserNotFound(Uuid),
    #[error("Post {0} not found")]
    PostNotFound(Uuid),
}
