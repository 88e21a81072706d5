/// In-memory store used by tests and `STORE_BACKEND=memory` local runs.
///
/// Every mutation holds the write lock for its whole check-and-update, which gives
/// the same per-post atomicity as the conditional UPDATEs in PostgreSQL.
use super::{MembershipChange, PostStore, UserStore};
use crate::error::Result;
use crate::models::{AuthorSummary, NewPost, Post, PostView, ProviderProfile, User};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct State {
    posts: HashMap<Uuid, Post>,
    users: HashMap<Uuid, User>,
    last_created_at: Option<DateTime<Utc>>,
}

impl State {
    /// Strictly increasing timestamps keep newest-first ordering deterministic
    fn next_timestamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let ts = match self.last_created_at {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_created_at = Some(ts);
        ts
    }
}

#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<State>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PostStore for InMemoryStore {
    async fn insert(&self, new_post: NewPost) -> Result<Post> {
        let mut state = self.state.write().await;
        let post = Post {
            id: Uuid::new_v4(),
            text: new_post.text,
            file_url: new_post.file_url,
            likes: 0,
            liked_by: Vec::new(),
            author_id: new_post.author_id,
            created_at: state.next_timestamp(),
        };
        state.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn find_by_id(&self, post_id: Uuid) -> Result<Option<Post>> {
        Ok(self.state.read().await.posts.get(&post_id).cloned())
    }

    async fn find_page(&self, skip: i64, limit: i64, with_author: bool) -> Result<Vec<PostView>> {
        let state = self.state.read().await;

        let mut posts: Vec<&Post> = state.posts.values().collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let views = posts
            .into_iter()
            .skip(skip.max(0) as usize)
            .take(limit.max(0) as usize)
            .map(|post| {
                let author = with_author
                    .then(|| post.author_id.and_then(|id| state.users.get(&id)))
                    .flatten()
                    .map(|user| AuthorSummary {
                        id: user.id,
                        display_name: user.display_name.clone(),
                    });
                PostView {
                    post: post.clone(),
                    author,
                }
            })
            .collect();

        Ok(views)
    }

    async fn count(&self) -> Result<i64> {
        Ok(self.state.read().await.posts.len() as i64)
    }

    async fn delete(&self, post_id: Uuid) -> Result<bool> {
        Ok(self.state.write().await.posts.remove(&post_id).is_some())
    }

    async fn add_like(&self, post_id: Uuid, user_id: Uuid) -> Result<MembershipChange> {
        let mut state = self.state.write().await;
        let Some(post) = state.posts.get_mut(&post_id) else {
            return Ok(MembershipChange::PostMissing);
        };

        if post.is_liked_by(user_id) {
            return Ok(MembershipChange::Unchanged);
        }

        post.liked_by.push(user_id);
        post.likes += 1;
        Ok(MembershipChange::Applied(post.clone()))
    }

    async fn remove_like(&self, post_id: Uuid, user_id: Uuid) -> Result<MembershipChange> {
        let mut state = self.state.write().await;
        let Some(post) = state.posts.get_mut(&post_id) else {
            return Ok(MembershipChange::PostMissing);
        };

        let Some(index) = post.liked_by.iter().position(|id| *id == user_id) else {
            return Ok(MembershipChange::Unchanged);
        };

        post.liked_by.remove(index);
        post.likes -= 1;
        Ok(MembershipChange::Applied(post.clone()))
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<User>> {
        Ok(self.state.read().await.users.get(&user_id).cloned())
    }

    async fn find_by_external_id(&self, external_id: &str) -> Result<Option<User>> {
        Ok(self
            .state
            .read()
            .await
            .users
            .values()
            .find(|user| user.external_id == external_id)
            .cloned())
    }

    async fn find_or_create(&self, profile: &ProviderProfile) -> Result<(User, bool)> {
        let mut state = self.state.write().await;

        if let Some(existing) = state
            .users
            .values()
            .find(|user| user.external_id == profile.external_id)
        {
            return Ok((existing.clone(), false));
        }

        let user = User {
            id: Uuid::new_v4(),
            external_id: profile.external_id.clone(),
            display_name: profile.display_name.clone(),
            emails: profile.emails.clone(),
            created_at: Utc::now(),
        };
        state.users.insert(user.id, user.clone());
        Ok((user, true))
    }
}
