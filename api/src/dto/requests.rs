use serde::Deserialize;
use validator::Validate;

/// Shortest accepted password, after trimming.
pub const MIN_PASSWORD_LEN: usize = 5;

// Missing fields deserialize as empty strings so they fail validation with
// a readable message instead of a JSON rejection.

#[derive(Debug, Validate, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Fill in all fields."))]
    pub name: String,
    #[serde(default)]
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Fill in all fields."))]
    pub password: String,
    #[serde(default)]
    pub password2: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Fill in all fields."))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Fill in all fields."))]
    pub password: String,
}

#[derive(Debug, Validate, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditUserRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Fill in all fields."))]
    pub name: String,
    #[serde(default)]
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Fill in all fields."))]
    pub current_password: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Fill in all fields."))]
    pub new_password: String,
    #[serde(default)]
    pub confirm_new_password: String,
}
