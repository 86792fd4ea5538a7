mod forms;
mod requests;
mod responses;

pub use forms::{AvatarForm, EDIT_DESCRIPTION_MIN_LEN, PostForm};
pub use requests::{EditUserRequest, LoginRequest, MIN_PASSWORD_LEN, RegisterRequest};
pub use responses::{LoginResponse, MessageResponse, UserResponse};
