use async_graphql::{InputObject, Object, SimpleObject};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

use crate::db::{Post, User};

fn rfc3339(at: OffsetDateTime) -> String {
    at.format(&Rfc3339).unwrap_or_default()
}

#[Object]
impl User {
    async fn id(&self) -> i32 {
        self.id
    }
    async fn username(&self) -> &str {
        &self.username
    }
    async fn created_at(&self) -> String {
        rfc3339(self.created_at)
    }
    async fn updated_at(&self) -> String {
        rfc3339(self.updated_at)
    }
}

#[Object]
impl Post {
    async fn id(&self) -> i32 {
        self.id
    }
    async fn title(&self) -> &str {
        &self.title
    }
    async fn created_at(&self) -> String {
        rfc3339(self.created_at)
    }
    async fn updated_at(&self) -> String {
        rfc3339(self.updated_at)
    }
}

#[derive(InputObject, Debug)]
pub struct UsernamePasswordInput {
    pub username: String,
    pub password: String,
}

/// Error attributed to an input field; `field` is empty for errors that
/// concern the request as a whole.
#[derive(SimpleObject, Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn general(message: impl Into<String>) -> Self {
        Self::new("", message)
    }
}

/// Outcome of `register`/`login`: either `errors` or `user` is set.
#[derive(SimpleObject, Debug)]
pub struct UserResponse {
    pub errors: Option<Vec<FieldError>>,
    pub user: Option<User>,
}

impl UserResponse {
    pub fn failed(error: FieldError) -> Self {
        Self {
            errors: Some(vec![error]),
            user: None,
        }
    }

    pub fn success(user: User) -> Self {
        Self {
            errors: None,
            user: Some(user),
        }
    }
}
