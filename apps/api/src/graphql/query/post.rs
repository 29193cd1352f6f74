//! Post queries

use std::sync::Arc;

use async_graphql::{Context, Object, Result};
use uuid::Uuid;

use crate::graphql::load_error;
use crate::graphql::loaders::Loaders;
use crate::graphql::store_error;
use crate::graphql::types::Post;
use crate::store::Store;

#[derive(Default)]
pub struct PostQuery;

#[Object]
impl PostQuery {
    /// All posts
    async fn posts(&self, ctx: &Context<'_>) -> Result<Vec<Post>> {
        let store = ctx.data::<Arc<dyn Store>>()?;
        let loaders = ctx.data::<Loaders>()?;

        let posts = store.all_posts().await.map_err(store_error)?;
        for post in &posts {
            loaders.post.prime(post.id, post.clone());
        }

        Ok(posts.into_iter().map(Post::from).collect())
    }

    /// A post by ID
    async fn post(&self, ctx: &Context<'_>, id: Uuid) -> Result<Option<Post>> {
        let loaders = ctx.data::<Loaders>()?;
        let post = loaders.post.load(id).await.map_err(load_error)?;
        Ok(post.map(Post::from))
    }
}
