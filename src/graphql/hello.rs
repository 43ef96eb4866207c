use async_graphql::Object;

#[derive(Default)]
pub struct HelloQuery;

#[Object]
impl HelloQuery {
    /// Liveness probe through the GraphQL stack.
    async fn hello(&self) -> &'static str {
        "hello world"
    }
}
