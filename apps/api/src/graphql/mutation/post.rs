//! Post mutations

use std::sync::Arc;

use async_graphql::{Context, InputObject, Object, Result};
use uuid::Uuid;

use crate::graphql::store_error;
use crate::graphql::types::Post;
use crate::models::{ChangePost, CreatePost};
use crate::store::Store;

#[derive(Debug, Clone, InputObject)]
pub struct CreatePostInput {
    pub title: String,
    pub content: String,
    pub author_id: Uuid,
}

impl From<CreatePostInput> for CreatePost {
    fn from(input: CreatePostInput) -> Self {
        Self {
            title: input.title,
            content: input.content,
            author_id: input.author_id,
        }
    }
}

#[derive(Debug, Clone, InputObject)]
pub struct ChangePostInput {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl From<ChangePostInput> for ChangePost {
    fn from(input: ChangePostInput) -> Self {
        Self {
            title: input.title,
            content: input.content,
        }
    }
}

#[derive(Default)]
pub struct PostMutation;

#[Object]
impl PostMutation {
    async fn create_post(&self, ctx: &Context<'_>, dto: CreatePostInput) -> Result<Option<Post>> {
        let store = ctx.data::<Arc<dyn Store>>()?;
        let post = store.create_post(dto.into()).await.map_err(store_error)?;
        tracing::info!(post_id = %post.id, author_id = %post.author_id, "Post created");
        Ok(Some(Post::from(post)))
    }

    async fn change_post(
        &self,
        ctx: &Context<'_>,
        id: Uuid,
        dto: ChangePostInput,
    ) -> Result<Option<Post>> {
        let store = ctx.data::<Arc<dyn Store>>()?;
        let post = store
            .update_post(id, dto.into())
            .await
            .map_err(store_error)?;
        Ok(Some(Post::from(post)))
    }

    async fn delete_post(&self, ctx: &Context<'_>, id: Uuid) -> Result<Option<bool>> {
        let store = ctx.data::<Arc<dyn Store>>()?;
        store.delete_post(id).await.map_err(store_error)?;
        Ok(Some(true))
    }
}
