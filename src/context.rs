use std::sync::Arc;

use crate::{auth::AuthSession, store::Store};

/// Everything a resolver may touch while serving one request: a store handle
/// forked for this request and the request's session.
///
/// Built in the `/graphql` handler and handed to the schema as request data,
/// so it is dropped together with the request.
#[derive(Clone)]
pub struct RequestContext {
    store: Arc<dyn Store>,
    session: AuthSession,
}

impl RequestContext {
    pub fn new(store: Arc<dyn Store>, session: AuthSession) -> Self {
        Self { store, session }
    }

    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }

    pub fn session(&self) -> &AuthSession {
        &self.session
    }

    pub fn from_ctx<'a>(ctx: &async_graphql::Context<'a>) -> async_graphql::Result<&'a Self> {
        ctx.data::<RequestContext>()
    }
}
