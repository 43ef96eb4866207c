use async_graphql::{Context, Object, Result};
use tracing::{error, info, instrument, warn};

use super::{
    internal,
    types::{FieldError, UserResponse, UsernamePasswordInput},
};
use crate::{
    auth::password::{hash_password_async, verify_password_async},
    context::RequestContext,
    db::User,
};

const INVALID_CREDENTIALS: &str = "invalid username or password";
const USERNAME_TAKEN: &str = "username already exists";
const INTERNAL_ERROR: &str = "internal server error";

/// First failing rule wins: username before password.
fn validate_registration(options: &UsernamePasswordInput) -> Option<FieldError> {
    if options.username.chars().count() <= 2 {
        return Some(FieldError::new("username", "length must be greater than 2"));
    }
    if options.password.chars().count() <= 3 {
        return Some(FieldError::new("password", "length must be greater than 3"));
    }
    None
}

#[derive(Default)]
pub struct UserQuery;

#[Object]
impl UserQuery {
    /// The user bound to the current session, if any.
    #[instrument(skip(self, ctx))]
    async fn me(&self, ctx: &Context<'_>) -> Result<Option<User>> {
        let rc = RequestContext::from_ctx(ctx)?;
        let Some(user_id) = rc.session().user_id().await.map_err(internal)? else {
            return Ok(None);
        };
        let user = rc.store().find_user_by_id(user_id).await.map_err(internal)?;
        if user.is_none() {
            warn!(user_id, "session refers to a missing user");
        }
        Ok(user)
    }
}

#[derive(Default)]
pub struct UserMutation;

#[Object]
impl UserMutation {
    #[instrument(skip(self, ctx, options), fields(username = %options.username))]
    async fn register(
        &self,
        ctx: &Context<'_>,
        options: UsernamePasswordInput,
    ) -> Result<UserResponse> {
        let rc = RequestContext::from_ctx(ctx)?;

        if let Some(err) = validate_registration(&options) {
            warn!(field = %err.field, "registration rejected");
            return Ok(UserResponse::failed(err));
        }

        let hash = match hash_password_async(options.password).await {
            Ok(h) => h,
            Err(e) => {
                error!(error = %e, "hash_password failed");
                return Ok(UserResponse::failed(FieldError::general(INTERNAL_ERROR)));
            }
        };

        // The unique constraint decides; a pre-check here would race.
        let user = match rc.store().create_user(&options.username, &hash).await {
            Ok(u) => u,
            Err(e) if e.is_unique_violation() => {
                warn!(username = %options.username, "username already registered");
                return Ok(UserResponse::failed(FieldError::new(
                    "username",
                    USERNAME_TAKEN,
                )));
            }
            Err(e) => {
                error!(error = %e, "create user failed");
                return Ok(UserResponse::failed(FieldError::general(INTERNAL_ERROR)));
            }
        };

        // The row stays: the account is usable through `login` even though
        // this request could not bind the session.
        if let Err(e) = rc.session().log_in(user.id).await {
            error!(error = %e, user_id = user.id, "session write failed after register");
            warn!(user_id = user.id, "account created but not logged in; user can log in");
            return Ok(UserResponse::failed(FieldError::general(INTERNAL_ERROR)));
        }

        info!(user_id = user.id, username = %user.username, "user registered");
        Ok(UserResponse::success(user))
    }

    #[instrument(skip(self, ctx, options), fields(username = %options.username))]
    async fn login(&self, ctx: &Context<'_>, options: UsernamePasswordInput) -> Result<UserResponse> {
        let rc = RequestContext::from_ctx(ctx)?;

        let user = match rc.store().find_user_by_username(&options.username).await {
            Ok(Some(u)) => u,
            Ok(None) => {
                warn!(username = %options.username, "login unknown username");
                return Ok(UserResponse::failed(FieldError::general(INVALID_CREDENTIALS)));
            }
            Err(e) => {
                error!(error = %e, "find_user_by_username failed");
                return Ok(UserResponse::failed(FieldError::general(INTERNAL_ERROR)));
            }
        };

        let ok = match verify_password_async(options.password, user.password_hash.clone()).await {
            Ok(v) => v,
            Err(e) => {
                error!(error = %e, user_id = user.id, "verify_password failed");
                return Ok(UserResponse::failed(FieldError::general(INTERNAL_ERROR)));
            }
        };

        if !ok {
            warn!(user_id = user.id, "login invalid password");
            return Ok(UserResponse::failed(FieldError::general(INVALID_CREDENTIALS)));
        }

        if let Err(e) = rc.session().log_in(user.id).await {
            error!(error = %e, user_id = user.id, "session write failed after login");
            return Ok(UserResponse::failed(FieldError::general(INTERNAL_ERROR)));
        }

        info!(user_id = user.id, username = %user.username, "user logged in");
        Ok(UserResponse::success(user))
    }

    /// Ends the current session. `false` only if the session store failed.
    #[instrument(skip(self, ctx))]
    async fn logout(&self, ctx: &Context<'_>) -> Result<bool> {
        let rc = RequestContext::from_ctx(ctx)?;
        match rc.session().log_out().await {
            Ok(()) => Ok(true),
            Err(e) => {
                error!(error = %e, "logout failed");
                Ok(false)
            }
        }
    }
}
