use crate::{
    auth::Identity,
    errors::ApiError,
    models::Post,
};
use uuid::Uuid;

/// Something that belongs to exactly one user.
pub trait Owned {
    fn owner_id(&self) -> Uuid;
}

impl Owned for Post {
    fn owner_id(&self) -> Uuid {
        self.creator
    }
}

pub fn can_mutate(identity: &Identity, resource: &impl Owned) -> bool {
    identity.user_id == resource.owner_id()
}

/// Callers look the resource up first, so a missing resource is a 404 and
/// only an existing one owned by someone else is a 403.
pub fn ensure_owner(identity: &Identity, resource: &impl Owned) -> Result<(), ApiError> {
    if can_mutate(identity, resource) {
        Ok(())
    } else {
        Err(ApiError::Forbidden(
            "You are not allowed to modify this resource.".into(),
        ))
    }
}
