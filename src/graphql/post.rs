use async_graphql::{Context, Object, Result};
use tracing::{debug, info, instrument};

use super::internal;
use crate::{context::RequestContext, db::Post};

#[derive(Default)]
pub struct PostQuery;

#[Object]
impl PostQuery {
    #[instrument(skip(self, ctx))]
    async fn posts(&self, ctx: &Context<'_>) -> Result<Vec<Post>> {
        let rc = RequestContext::from_ctx(ctx)?;
        rc.store().list_posts().await.map_err(internal)
    }

    #[instrument(skip(self, ctx))]
    async fn post(&self, ctx: &Context<'_>, id: i32) -> Result<Option<Post>> {
        let rc = RequestContext::from_ctx(ctx)?;
        rc.store().find_post(id).await.map_err(internal)
    }
}

#[derive(Default)]
pub struct PostMutation;

#[Object]
impl PostMutation {
    #[instrument(skip(self, ctx))]
    async fn create_post(&self, ctx: &Context<'_>, title: String) -> Result<Post> {
        let rc = RequestContext::from_ctx(ctx)?;
        let post = rc.store().create_post(&title).await.map_err(internal)?;
        info!(post_id = post.id, "post created");
        Ok(post)
    }

    /// `null` when no post has this id.
    #[instrument(skip(self, ctx))]
    async fn update_post(&self, ctx: &Context<'_>, id: i32, title: String) -> Result<Option<Post>> {
        let rc = RequestContext::from_ctx(ctx)?;
        let post = rc
            .store()
            .update_post_title(id, &title)
            .await
            .map_err(internal)?;
        if post.is_none() {
            debug!(post_id = id, "update_post: no such post");
        }
        Ok(post)
    }

    /// Always `true`: deleting a missing post is not an error.
    #[instrument(skip(self, ctx))]
    async fn delete_post(&self, ctx: &Context<'_>, id: i32) -> Result<bool> {
        let rc = RequestContext::from_ctx(ctx)?;
        let removed = rc.store().delete_post(id).await.map_err(internal)?;
        debug!(post_id = id, removed, "post deleted");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::graphql::test_support::TestClient;

    #[tokio::test]
    async fn create_update_delete_lifecycle() {
        let client = TestClient::new();

        let created = client
            .run(r#"mutation { createPost(title: "A") { id title } }"#)
            .await;
        assert_eq!(created["createPost"]["title"], "A");
        let id = created["createPost"]["id"].as_i64().expect("id");

        let fetched = client.run(&format!("{{ post(id: {id}) {{ title }} }}")).await;
        assert_eq!(fetched["post"]["title"], "A");

        let updated = client
            .run(&format!(
                r#"mutation {{ updatePost(id: {id}, title: "B") {{ id title }} }}"#
            ))
            .await;
        assert_eq!(updated["updatePost"]["title"], "B");

        let fetched = client.run(&format!("{{ post(id: {id}) {{ title }} }}")).await;
        assert_eq!(fetched["post"]["title"], "B");

        let deleted = client
            .run(&format!("mutation {{ deletePost(id: {id}) }}"))
            .await;
        assert_eq!(deleted["deletePost"], true);

        let fetched = client.run(&format!("{{ post(id: {id}) {{ title }} }}")).await;
        assert_eq!(fetched["post"], json!(null));
    }

    #[tokio::test]
    async fn update_missing_post_returns_null_and_changes_nothing() {
        let client = TestClient::new();
        client
            .run(r#"mutation { createPost(title: "keep") { id } }"#)
            .await;

        let updated = client
            .run(r#"mutation { updatePost(id: 999, title: "x") { id } }"#)
            .await;
        assert_eq!(updated["updatePost"], json!(null));

        let all = client.run("{ posts { title } }").await;
        assert_eq!(all["posts"], json!([{ "title": "keep" }]));
    }

    #[tokio::test]
    async fn delete_missing_post_still_reports_true() {
        let client = TestClient::new();
        let deleted = client.run("mutation { deletePost(id: 42) }").await;
        assert_eq!(deleted["deletePost"], true);
    }

    #[tokio::test]
    async fn posts_lists_everything() {
        let client = TestClient::new();
        client.run(r#"mutation { createPost(title: "one") { id } }"#).await;
        client.run(r#"mutation { createPost(title: "two") { id } }"#).await;

        let all = client.run("{ posts { title } }").await;
        assert_eq!(all["posts"], json!([{ "title": "one" }, { "title": "two" }]));
    }
}
