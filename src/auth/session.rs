use tower_sessions::Session;
use tracing::debug;

/// Session key holding the authenticated user's id.
pub const SESSION_USER_ID_KEY: &str = "userId";

#[derive(Debug, thiserror::Error)]
#[error("session store error: {0}")]
pub struct SessionError(#[from] tower_sessions::session::Error);

/// Typed read/write view over the request's cookie session.
///
/// Changes are persisted by `SessionManagerLayer` once the handler returns.
#[derive(Clone, Debug)]
pub struct AuthSession {
    session: Session,
}

impl AuthSession {
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    pub async fn user_id(&self) -> Result<Option<i32>, SessionError> {
        Ok(self.session.get::<i32>(SESSION_USER_ID_KEY).await?)
    }

    /// Binds the session to `user_id`. The session id is rotated first so a
    /// pre-login cookie cannot be reused after authentication.
    pub async fn log_in(&self, user_id: i32) -> Result<(), SessionError> {
        self.session.cycle_id().await?;
        self.session.insert(SESSION_USER_ID_KEY, user_id).await?;
        debug!(user_id, "session bound to user");
        Ok(())
    }

    /// Deletes the session from the store and expires the cookie.
    pub async fn log_out(&self) -> Result<(), SessionError> {
        self.session.flush().await?;
        Ok(())
    }
}
