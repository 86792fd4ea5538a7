use crate::{
    AppState,
    auth::AuthUser,
    dto::{
        AvatarForm, EditUserRequest, LoginRequest, LoginResponse, MIN_PASSWORD_LEN,
        RegisterRequest, UserResponse,
    },
    errors::ApiError,
    extract::{Json, Path},
    media::AVATAR_LIMIT,
    store::{NewUser, ProfileUpdate},
};
use axum::{
    Router,
    extract::State,
    routing::{get, post, put},
};
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_authors))
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/change-avatar", post(change_avatar))
        .route("/edit-user", put(edit_user))
        .route("/{id}", get(get_user))
}

fn check_new_password(password: &str, confirmation: &str, mismatch: &str) -> Result<(), ApiError> {
    if password.trim().chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::ValidationError(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters."
        )));
    }
    if password != confirmation {
        return Err(ApiError::ValidationError(mismatch.into()));
    }
    Ok(())
}

/// POST /api/users/register
/// Body: { "name": "...", "email": "...", "password": "...", "password2": "..." }
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    payload.validate()?;
    check_new_password(&payload.password, &payload.password2, "Passwords do not match.")?;

    // Cheap check before paying for a hash; `register` re-checks atomically.
    if state.users.find_by_email(&payload.email).is_some() {
        return Err(ApiError::DuplicateEmail);
    }

    let password_hash = state.passwords.hash(&payload.password)?;

    let user = state.users.register(NewUser {
        name: payload.name,
        email: payload.email,
        password_hash,
    })?;

    info!(user_id = %user.id, email = %user.email, "New user registered");

    Ok(Json(user.into()))
}

/// POST /api/users/login
/// Body: { "email": "...", "password": "..." }
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    payload.validate()?;

    let user = state
        .users
        .find_by_email(&payload.email)
        .ok_or(ApiError::InvalidCredentials)?;

    if !state.passwords.verify(&payload.password, &user.password_hash)? {
        return Err(ApiError::InvalidCredentials);
    }

    let token = state.tokens.issue(user.id, &user.name)?;

    info!(user_id = %user.id, "User logged in");

    Ok(Json(LoginResponse {
        token,
        id: user.id,
        name: user.name,
    }))
}

/// GET /api/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state
        .users
        .find_by_id(&id)
        .ok_or_else(ApiError::user_not_found)?;

    Ok(Json(user.into()))
}

/// GET /api/users
pub async fn get_authors(State(state): State<AppState>) -> Json<Vec<UserResponse>> {
    Json(state.users.all().into_iter().map(Into::into).collect())
}

/// POST /api/users/change-avatar
/// Headers: Authorization: Bearer <token>
/// Body: multipart with an `avatar` file
///
/// The new file is written and committed before the old one is removed, so
/// a failure part-way leaves at worst an orphaned old file.
pub async fn change_avatar(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    form: AvatarForm,
) -> Result<Json<UserResponse>, ApiError> {
    let avatar = form
        .avatar
        .ok_or_else(|| ApiError::ValidationError("Please select an image.".into()))?;

    let user = state
        .users
        .find_by_id(&identity.user_id)
        .ok_or_else(ApiError::user_not_found)?;

    let file_name = state.media.store(&avatar, AVATAR_LIMIT).await?;

    let (user, previous) = match state.users.set_avatar(&user.id, file_name.clone()) {
        Ok(changed) => changed,
        Err(err) => {
            state.media.discard(&file_name).await;
            return Err(err.into());
        }
    };

    if let Some(previous) = previous {
        state.media.discard(&previous).await;
    }

    info!(user_id = %user.id, file = %file_name, "Avatar changed");

    Ok(Json(user.into()))
}

/// PUT /api/users/edit-user
/// Headers: Authorization: Bearer <token>
/// Body: { "name", "email", "currentPassword", "newPassword", "confirmNewPassword" }
pub async fn edit_user(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Json(payload): Json<EditUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    payload.validate()?;

    let user = state
        .users
        .find_by_id(&identity.user_id)
        .ok_or_else(ApiError::user_not_found)?;

    if state
        .users
        .find_by_email(&payload.email)
        .is_some_and(|existing| existing.id != user.id)
    {
        return Err(ApiError::DuplicateEmail);
    }

    if !state
        .passwords
        .verify(&payload.current_password, &user.password_hash)?
    {
        warn!(user_id = %user.id, "Profile edit with wrong current password");
        return Err(ApiError::ValidationError("Invalid current password.".into()));
    }

    check_new_password(
        &payload.new_password,
        &payload.confirm_new_password,
        "New passwords do not match.",
    )?;

    let password_hash = state.passwords.hash(&payload.new_password)?;

    let updated = state.users.update_profile(
        &user.id,
        ProfileUpdate {
            name: payload.name,
            email: payload.email,
            password_hash,
        },
    )?;

    info!(user_id = %updated.id, "Profile updated");

    Ok(Json(updated.into()))
}
