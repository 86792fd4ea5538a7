//! Multipart bodies for the routes that take file uploads.

use crate::{errors::ApiError, media::Upload};
use axum::extract::{FromRequest, Multipart, Request, multipart::Field};
use validator::Validate;

/// Minimum description length on edit. The rich-text editor sends an empty
/// body as `<p><br></p>`, which is already 11 characters.
pub const EDIT_DESCRIPTION_MIN_LEN: usize = 12;

/// `title`, `category`, `desc` and an optional `thumbnail` file.
#[derive(Debug, Default, Validate)]
pub struct PostForm {
    #[validate(length(min = 1, message = "Fill in all fields."))]
    pub title: String,
    #[validate(length(min = 1, message = "Fill in all fields."))]
    pub category: String,
    #[validate(length(min = 1, message = "Fill in all fields."))]
    pub description: String,
    pub thumbnail: Option<Upload>,
}

impl PostForm {
    pub fn has_short_description(&self) -> bool {
        self.description.chars().count() < EDIT_DESCRIPTION_MIN_LEN
    }
}

impl<S> FromRequest<S> for PostForm
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let mut multipart = Multipart::from_request(req, state).await?;
        let mut form = PostForm::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_owned();
            match name.as_str() {
                "title" => form.title = field.text().await?,
                "category" => form.category = field.text().await?,
                "desc" | "description" => form.description = field.text().await?,
                "thumbnail" => form.thumbnail = read_upload(field).await?,
                _ => {}
            }
        }

        Ok(form)
    }
}

/// A single `avatar` file.
#[derive(Debug, Default)]
pub struct AvatarForm {
    pub avatar: Option<Upload>,
}

impl<S> FromRequest<S> for AvatarForm
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let mut multipart = Multipart::from_request(req, state).await?;
        let mut form = AvatarForm::default();

        while let Some(field) = multipart.next_field().await? {
            if field.name() == Some("avatar") {
                form.avatar = read_upload(field).await?;
            }
        }

        Ok(form)
    }
}

/// Browsers send an empty, unnamed part when no file was picked; that counts
/// as no upload.
async fn read_upload(field: Field<'_>) -> Result<Option<Upload>, ApiError> {
    let file_name = field.file_name().unwrap_or_default().to_owned();
    let bytes = field.bytes().await?;

    if file_name.is_empty() || bytes.is_empty() {
        return Ok(None);
    }

    Ok(Some(Upload { file_name, bytes }))
}
