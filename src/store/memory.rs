use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use time::OffsetDateTime;

use super::{Store, StoreError, StoreResult};
use crate::db::{Post, User};

#[derive(Default)]
struct Tables {
    next_post_id: i32,
    next_user_id: i32,
    posts: BTreeMap<i32, Post>,
    users: BTreeMap<i32, User>,
}

/// Process-local store with the same uniqueness rules as the Postgres schema.
/// Forked handles share the same tables.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_count(&self) -> usize {
        self.lock().users.len()
    }

    // A poisoned lock only means another test thread panicked mid-write;
    // the maps are still structurally valid.
    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl Store for InMemoryStore {
    fn fork(&self) -> Arc<dyn Store> {
        Arc::new(self.clone())
    }

    async fn list_posts(&self) -> StoreResult<Vec<Post>> {
        Ok(self.lock().posts.values().cloned().collect())
    }

    async fn find_post(&self, id: i32) -> StoreResult<Option<Post>> {
        Ok(self.lock().posts.get(&id).cloned())
    }

    async fn create_post(&self, title: &str) -> StoreResult<Post> {
        let mut tables = self.lock();
        tables.next_post_id += 1;
        let now = OffsetDateTime::now_utc();
        let post = Post {
            id: tables.next_post_id,
            title: title.to_string(),
            created_at: now,
            updated_at: now,
        };
        tables.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn update_post_title(&self, id: i32, title: &str) -> StoreResult<Option<Post>> {
        let mut tables = self.lock();
        let Some(post) = tables.posts.get_mut(&id) else {
            return Ok(None);
        };
        post.title = title.to_string();
        post.updated_at = OffsetDateTime::now_utc();
        Ok(Some(post.clone()))
    }

    async fn delete_post(&self, id: i32) -> StoreResult<u64> {
        Ok(u64::from(self.lock().posts.remove(&id).is_some()))
    }

    async fn create_user(&self, username: &str, password_hash: &str) -> StoreResult<User> {
        let mut tables = self.lock();
        if tables.users.values().any(|u| u.username == username) {
            return Err(StoreError::UniqueViolation {
                constraint: "users_username_key".into(),
            });
        }
        tables.next_user_id += 1;
        let now = OffsetDateTime::now_utc();
        let user = User {
            id: tables.next_user_id,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        Ok(self
            .lock()
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_user_by_id(&self, id: i32) -> StoreResult<Option<User>> {
        Ok(self.lock().users.get(&id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn duplicate_username_is_a_unique_violation() {
        let store = InMemoryStore::new();
        store.create_user("alice", "hash").await.expect("first insert");

        let err = store.create_user("alice", "other").await.unwrap_err();
        assert!(err.is_unique_violation());
        assert_eq!(store.user_count(), 1);
    }

    #[tokio::test]
    async fn forked_handles_see_the_same_rows() {
        let store = InMemoryStore::new();
        let post = store.fork().create_post("shared").await.expect("create");

        let found = store.fork().find_post(post.id).await.expect("find");
        assert_eq!(found.map(|p| p.title), Some("shared".to_string()));
    }

    #[tokio::test]
    async fn delete_reports_rows_removed() {
        let store = InMemoryStore::new();
        let post = store.create_post("gone").await.expect("create");

        assert_eq!(store.delete_post(post.id).await.expect("delete"), 1);
        assert_eq!(store.delete_post(post.id).await.expect("delete again"), 0);
    }
}
