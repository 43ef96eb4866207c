use std::sync::Arc;

use async_trait::async_trait;

use crate::db::{Post, User};

mod memory;
mod postgres;

pub use memory::InMemoryStore;
pub use postgres::PgStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("unique constraint violated: {constraint}")]
    UniqueViolation { constraint: String },
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl StoreError {
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, StoreError::UniqueViolation { .. })
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        let constraint = err
            .as_database_error()
            .filter(|db_err| db_err.is_unique_violation())
            .map(|db_err| db_err.constraint().unwrap_or_default().to_string());
        match constraint {
            Some(constraint) => StoreError::UniqueViolation { constraint },
            None => StoreError::Database(err),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Entity store used by the resolvers.
///
/// One long-lived instance lives in [`crate::state::AppState`]; every request
/// works on its own handle obtained with [`Store::fork`].
#[async_trait]
pub trait Store: Send + Sync {
    /// Cheap, request-scoped handle sharing the underlying pool.
    fn fork(&self) -> Arc<dyn Store>;

    async fn list_posts(&self) -> StoreResult<Vec<Post>>;
    async fn find_post(&self, id: i32) -> StoreResult<Option<Post>>;
    async fn create_post(&self, title: &str) -> StoreResult<Post>;
    /// Returns `None` when no post has this id.
    async fn update_post_title(&self, id: i32, title: &str) -> StoreResult<Option<Post>>;
    /// Returns the number of rows removed.
    async fn delete_post(&self, id: i32) -> StoreResult<u64>;

    /// Fails with [`StoreError::UniqueViolation`] when the username is taken.
    async fn create_user(&self, username: &str, password_hash: &str) -> StoreResult<User>;
    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>>;
    async fn find_user_by_id(&self, id: i32) -> StoreResult<Option<User>>;
}
