use crate::{
    AppState,
    auth::AuthUser,
    dto::{MessageResponse, PostForm},
    errors::ApiError,
    extract::{Json, Path},
    media::{MediaError, THUMBNAIL_LIMIT},
    models::Post,
    policy::ensure_owner,
    store::{NewPost, PostUpdate},
};
use axum::{Router, extract::State, routing::get};
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_posts).post(create_post))
        .route("/{id}", get(get_post).put(edit_post).delete(delete_post))
        .route("/categories/{category}", get(get_category_posts))
        .route("/users/{id}", get(get_user_posts))
}

/// POST /api/posts
/// Headers: Authorization: Bearer <token>
/// Body: multipart with `title`, `category`, `desc` and a `thumbnail` file
pub async fn create_post(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    form: PostForm,
) -> Result<Json<Post>, ApiError> {
    form.validate()?;

    let PostForm {
        title,
        category,
        description,
        thumbnail,
    } = form;
    let thumbnail = thumbnail.ok_or_else(|| {
        ApiError::ValidationError("Fill in all fields and choose thumbnail.".into())
    })?;

    let file_name = state.media.store(&thumbnail, THUMBNAIL_LIMIT).await?;

    let post = state.posts.create(NewPost {
        title,
        category,
        description,
        thumbnail: file_name,
        creator: identity.user_id,
    });

    if let Err(err) = state.users.adjust_post_count(&identity.user_id, 1) {
        warn!(user_id = %identity.user_id, error = %err, "Post count not incremented");
    }

    info!(post_id = %post.id, user_id = %identity.user_id, "Post created");

    Ok(Json(post))
}

/// GET /api/posts
pub async fn get_posts(State(state): State<AppState>) -> Json<Vec<Post>> {
    Json(state.posts.all())
}

/// GET /api/posts/{id}
pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Post>, ApiError> {
    let post = state
        .posts
        .find_by_id(&id)
        .ok_or_else(ApiError::post_not_found)?;

    Ok(Json(post))
}

/// GET /api/posts/categories/{category}
pub async fn get_category_posts(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Json<Vec<Post>> {
    Json(state.posts.find_by_category(&category))
}

/// GET /api/posts/users/{id}
pub async fn get_user_posts(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Json<Vec<Post>> {
    Json(state.posts.find_by_creator(&id))
}

/// PUT /api/posts/{id}
/// Headers: Authorization: Bearer <token>
/// Body: multipart with `title`, `category`, `desc` and an optional `thumbnail`
pub async fn edit_post(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(id): Path<Uuid>,
    form: PostForm,
) -> Result<Json<Post>, ApiError> {
    form.validate()?;
    if form.has_short_description() {
        return Err(ApiError::ValidationError("Fill in all fields.".into()));
    }

    let existing = state
        .posts
        .find_by_id(&id)
        .ok_or_else(ApiError::post_not_found)?;
    ensure_owner(&identity, &existing)?;

    let new_thumbnail = match &form.thumbnail {
        Some(upload) => Some(state.media.store(upload, THUMBNAIL_LIMIT).await?),
        None => None,
    };

    let update = PostUpdate {
        title: form.title,
        category: form.category,
        description: form.description,
        thumbnail: new_thumbnail.clone(),
    };

    let (post, replaced) = match state.posts.update(&id, update) {
        Ok(updated) => updated,
        Err(err) => {
            if let Some(file_name) = &new_thumbnail {
                state.media.discard(file_name).await;
            }
            return Err(err.into());
        }
    };

    // Old thumbnail goes only once the record points at the new one.
    if let Some(previous) = replaced {
        state.media.discard(&previous).await;
    }

    info!(post_id = %post.id, user_id = %identity.user_id, "Post updated");

    Ok(Json(post))
}

/// DELETE /api/posts/{id}
/// Headers: Authorization: Bearer <token>
pub async fn delete_post(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    let post = state
        .posts
        .find_by_id(&id)
        .ok_or_else(ApiError::post_not_found)?;

    // Check ownership
    ensure_owner(&identity, &post)?;

    // A thumbnail that is already gone does not block the delete; any other
    // filesystem failure does, and the record is kept.
    match state.media.remove(&post.thumbnail).await {
        Ok(()) => {}
        Err(MediaError::NotFound(file)) => {
            warn!(post_id = %id, %file, "Thumbnail was already missing");
        }
        Err(err) => return Err(err.into()),
    }

    state.posts.delete(&id)?;

    if let Err(err) = state.users.adjust_post_count(&identity.user_id, -1) {
        warn!(user_id = %identity.user_id, error = %err, "Post count not decremented");
    }

    info!(post_id = %id, user_id = %identity.user_id, "Post deleted");

    Ok(Json(MessageResponse {
        message: format!("Post {id} deleted successfully!"),
    }))
}
