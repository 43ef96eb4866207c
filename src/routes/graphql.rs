use async_graphql::http::GraphiQLSource;
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{extract::State, response::Html};
use tower_sessions::Session;
use tracing::instrument;

use crate::{auth::AuthSession, context::RequestContext, state::AppState};

/// POST /graphql
///
/// Builds the per-request context (forked store, session view) before the
/// schema runs. Session changes are saved by the session layer afterwards.
#[instrument(skip_all)]
pub async fn graphql_handler(
    State(state): State<AppState>,
    session: Session,
    req: GraphQLRequest,
) -> GraphQLResponse {
    let ctx = RequestContext::new(state.store.fork(), AuthSession::new(session));
    state.schema.execute(req.into_inner().data(ctx)).await.into()
}

/// GET /graphql
pub async fn graphiql() -> Html<String> {
    Html(GraphiQLSource::build().endpoint("/graphql").finish())
}
