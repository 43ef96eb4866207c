use axum::{routing::get, Router};

use crate::state::AppState;

pub mod graphql;

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/graphql",
            get(graphql::graphiql).post(graphql::graphql_handler),
        )
        .route("/health", get(|| async { "ok" }))
}
