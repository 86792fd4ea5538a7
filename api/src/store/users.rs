use super::StoreError;
use crate::models::User;
use chrono::Utc;
use dashmap::{DashMap, mapref::entry::Entry};
use uuid::Uuid;

/// Emails are compared and stored lowercased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[derive(Debug)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

#[derive(Debug)]
pub struct ProfileUpdate {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

#[derive(Debug, Default)]
pub struct UserStore {
    users: DashMap<Uuid, User>,
    email_index: DashMap<String, Uuid>, // Quick Lookup by Email
}

impl UserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a new user unless the (normalized) email is already taken.
    ///
    /// The email index entry stays locked until the user document is in
    /// place, so two concurrent registrations cannot both claim an address.
    pub fn register(&self, new_user: NewUser) -> Result<User, StoreError> {
        let user = User {
            id: Uuid::new_v4(),
            name: new_user.name,
            email: normalize_email(&new_user.email),
            password_hash: new_user.password_hash,
            avatar: None,
            posts: 0,
            created_at: Utc::now(),
        };

        match self.email_index.entry(user.email.clone()) {
            Entry::Occupied(_) => Err(StoreError::DuplicateEmail),
            Entry::Vacant(slot) => {
                self.users.insert(user.id, user.clone());
                slot.insert(user.id);
                Ok(user)
            }
        }
    }

    pub fn find_by_email(&self, email: &str) -> Option<User> {
        let id = self
            .email_index
            .get(&normalize_email(email))
            .map(|entry| *entry.value())?;

        self.find_by_id(&id)
    }

    pub fn find_by_id(&self, id: &Uuid) -> Option<User> {
        self.users.get(id).map(|entry| entry.value().clone())
    }

    pub fn count(&self) -> usize {
        self.users.len()
    }

    /// All users, oldest account first.
    pub fn all(&self) -> Vec<User> {
        let mut users: Vec<User> = self
            .users
            .iter()
            .map(|entry| entry.value().clone())
            .collect();

        users.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        users
    }

    pub fn update_profile(&self, id: &Uuid, update: ProfileUpdate) -> Result<User, StoreError> {
        let current = self.find_by_id(id).ok_or(StoreError::UserNotFound(*id))?;
        let email = normalize_email(&update.email);

        // Claim the new address before releasing the old one. The index is
        // always locked before the user map, never the other way around.
        if email != current.email {
            match self.email_index.entry(email.clone()) {
                Entry::Occupied(_) => return Err(StoreError::DuplicateEmail),
                Entry::Vacant(slot) => {
                    slot.insert(*id);
                }
            }
            self.email_index.remove(&current.email);
        }

        let mut user = self.users.get_mut(id).ok_or(StoreError::UserNotFound(*id))?;
        user.name = update.name;
        user.email = email;
        user.password_hash = update.password_hash;

        Ok(user.clone())
    }

    /// Points the user at a new avatar file and hands back the one it replaced.
    pub fn set_avatar(
        &self,
        id: &Uuid,
        file_name: String,
    ) -> Result<(User, Option<String>), StoreError> {
        let mut user = self.users.get_mut(id).ok_or(StoreError::UserNotFound(*id))?;
        let previous = user.avatar.replace(file_name);

        Ok((user.clone(), previous))
    }

    /// Best-effort post counter; never drops below zero.
    pub fn adjust_post_count(&self, id: &Uuid, delta: i64) -> Result<u64, StoreError> {
        let mut user = self.users.get_mut(id).ok_or(StoreError::UserNotFound(*id))?;
        user.posts = user.posts.saturating_add_signed(delta);

        Ok(user.posts)
    }
}
