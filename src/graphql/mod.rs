//! GraphQL schema: health check, post CRUD and session-backed user auth.
//!
//! Resolvers read their [`crate::context::RequestContext`] from request data;
//! the schema itself carries no shared state.

use async_graphql::{EmptySubscription, MergedObject, Schema};
use tracing::error;

mod hello;
mod post;
pub mod types;
mod user;

pub use hello::HelloQuery;
pub use post::{PostMutation, PostQuery};
pub use user::{UserMutation, UserQuery};

#[derive(MergedObject, Default)]
pub struct QueryRoot(HelloQuery, PostQuery, UserQuery);

#[derive(MergedObject, Default)]
pub struct MutationRoot(PostMutation, UserMutation);

pub type AppSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

pub fn build_schema() -> AppSchema {
    Schema::build(QueryRoot::default(), MutationRoot::default(), EmptySubscription).finish()
}

/// Logs the cause and hands the client a generic message.
pub(crate) fn internal<E: std::fmt::Display>(e: E) -> async_graphql::Error {
    error!(error = %e, "resolver failed");
    async_graphql::Error::new("internal server error")
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use async_graphql::{Request, Response};
    use async_trait::async_trait;
    use tower_sessions::{
        session::{Id, Record},
        session_store, MemoryStore, Session, SessionStore,
    };

    use super::{build_schema, AppSchema};
    use crate::{
        auth::AuthSession,
        context::RequestContext,
        db::{Post, User},
        store::{InMemoryStore, Store, StoreError, StoreResult},
    };

    /// Runs operations against the real schema with one browser-like
    /// session that persists across calls.
    pub struct TestClient {
        pub schema: AppSchema,
        /// Row counts and seeding; empty when the client runs on [`FailingStore`].
        pub store: InMemoryStore,
        backend: Arc<dyn Store>,
        session: Session,
    }

    impl TestClient {
        pub fn new() -> Self {
            let store = InMemoryStore::new();
            Self::build(Arc::new(store.clone()), store, memory_session())
        }

        /// A second client (fresh session) over the same data.
        pub fn sharing_store(other: &TestClient) -> Self {
            Self::build(other.backend.fork(), other.store.clone(), memory_session())
        }

        /// Every store call fails as if the pool timed out.
        pub fn failing() -> Self {
            Self::build(Arc::new(FailingStore), InMemoryStore::new(), memory_session())
        }

        /// Healthy data, but the session backend rejects every read and write.
        pub fn with_broken_session() -> Self {
            let store = InMemoryStore::new();
            let session = Session::new(Some(Id::default()), Arc::new(BrokenSessionStore), None);
            Self::build(Arc::new(store.clone()), store, session)
        }

        fn build(backend: Arc<dyn Store>, store: InMemoryStore, session: Session) -> Self {
            Self {
                schema: build_schema(),
                store,
                backend,
                session,
            }
        }

        pub async fn execute(&self, query: &str) -> Response {
            let ctx = RequestContext::new(
                self.backend.fork(),
                AuthSession::new(self.session.clone()),
            );
            self.schema.execute(Request::new(query).data(ctx)).await
        }

        /// Like [`TestClient::execute`], asserting the response carries no errors.
        pub async fn run(&self, query: &str) -> serde_json::Value {
            let response = self.execute(query).await;
            assert!(
                response.errors.is_empty(),
                "unexpected graphql errors: {:?}",
                response.errors
            );
            response.data.into_json().expect("response data is json")
        }

        /// Writes `user_id` into the session without going through `login`.
        pub async fn bind_session_to(&self, user_id: i32) {
            AuthSession::new(self.session.clone())
                .log_in(user_id)
                .await
                .expect("session writable");
        }

        pub async fn session_user_id(&self) -> Option<i32> {
            AuthSession::new(self.session.clone())
                .user_id()
                .await
                .expect("session readable")
        }
    }

    fn memory_session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    fn unavailable<T>() -> StoreResult<T> {
        Err(StoreError::Database(sqlx::Error::PoolTimedOut))
    }

    pub struct FailingStore;

    #[async_trait]
    impl Store for FailingStore {
        fn fork(&self) -> Arc<dyn Store> {
            Arc::new(FailingStore)
        }

        async fn list_posts(&self) -> StoreResult<Vec<Post>> {
            unavailable()
        }

        async fn find_post(&self, _id: i32) -> StoreResult<Option<Post>> {
            unavailable()
        }

        async fn create_post(&self, _title: &str) -> StoreResult<Post> {
            unavailable()
        }

        async fn update_post_title(&self, _id: i32, _title: &str) -> StoreResult<Option<Post>> {
            unavailable()
        }

        async fn delete_post(&self, _id: i32) -> StoreResult<u64> {
            unavailable()
        }

        async fn create_user(&self, _username: &str, _password_hash: &str) -> StoreResult<User> {
            unavailable()
        }

        async fn find_user_by_username(&self, _username: &str) -> StoreResult<Option<User>> {
            unavailable()
        }

        async fn find_user_by_id(&self, _id: i32) -> StoreResult<Option<User>> {
            unavailable()
        }
    }

    #[derive(Debug, Clone)]
    struct BrokenSessionStore;

    #[async_trait]
    impl SessionStore for BrokenSessionStore {
        async fn save(&self, _record: &Record) -> session_store::Result<()> {
            Err(session_store::Error::Backend("session backend down".into()))
        }

        async fn load(&self, _id: &Id) -> session_store::Result<Option<Record>> {
            Err(session_store::Error::Backend("session backend down".into()))
        }

        async fn delete(&self, _id: &Id) -> session_store::Result<()> {
            Err(session_store::Error::Backend("session backend down".into()))
        }
    }
}
