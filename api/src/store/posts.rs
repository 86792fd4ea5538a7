use super::StoreError;
use crate::models::Post;
use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

#[derive(Debug)]
pub struct NewPost {
    pub title: String,
    pub category: String,
    pub description: String,
    pub thumbnail: String,
    pub creator: Uuid,
}

/// Fields replaced by an edit. `thumbnail: None` keeps the current file.
#[derive(Debug)]
pub struct PostUpdate {
    pub title: String,
    pub category: String,
    pub description: String,
    pub thumbnail: Option<String>,
}

#[derive(Debug, Default)]
pub struct PostStore {
    posts: DashMap<Uuid, Post>,
}

impl PostStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, new_post: NewPost) -> Post {
        let now = Utc::now();
        let post = Post {
            id: Uuid::new_v4(),
            title: new_post.title,
            category: new_post.category,
            description: new_post.description,
            thumbnail: new_post.thumbnail,
            creator: new_post.creator,
            created_at: now,
            updated_at: now,
        };

        self.posts.insert(post.id, post.clone());
        post
    }

    pub fn count(&self) -> usize {
        self.posts.len()
    }

    /// Every post, most recently updated first.
    pub fn all(&self) -> Vec<Post> {
        let mut posts = self.matching(|_| true);
        posts.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        posts
    }

    pub fn find_by_id(&self, id: &Uuid) -> Option<Post> {
        self.posts.get(id).map(|entry| entry.value().clone())
    }

    /// Posts in `category`, newest first.
    pub fn find_by_category(&self, category: &str) -> Vec<Post> {
        self.newest_first(|post| post.category == category)
    }

    /// Posts written by `creator`, newest first.
    pub fn find_by_creator(&self, creator: &Uuid) -> Vec<Post> {
        self.newest_first(|post| post.creator == *creator)
    }

    /// Applies `update` and returns the post with the thumbnail it replaced,
    /// if any. The swap happens under the entry lock, so concurrent edits each
    /// see the file the other one installed.
    pub fn update(
        &self,
        id: &Uuid,
        update: PostUpdate,
    ) -> Result<(Post, Option<String>), StoreError> {
        let mut post = self.posts.get_mut(id).ok_or(StoreError::PostNotFound(*id))?;

        post.title = update.title;
        post.category = update.category;
        post.description = update.description;
        let replaced = update
            .thumbnail
            .map(|thumbnail| std::mem::replace(&mut post.thumbnail, thumbnail));
        post.updated_at = Utc::now();

        Ok((post.clone(), replaced))
    }

    pub fn delete(&self, id: &Uuid) -> Result<Post, StoreError> {
        self.posts
            .remove(id)
            .map(|(_, post)| post)
            .ok_or(StoreError::PostNotFound(*id))
    }

    fn matching(&self, filter: impl Fn(&Post) -> bool) -> Vec<Post> {
        self.posts
            .iter()
            .filter(|entry| filter(entry.value()))
            .map(|entry| entry.value().clone())
            .collect()
    }

    fn newest_first(&self, filter: impl Fn(&Post) -> bool) -> Vec<Post> {
        let mut posts = self.matching(filter);
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        posts
    }
}
