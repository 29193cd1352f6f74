//! Subscription edge mutations
//!
//! Not to be confused with GraphQL subscriptions: these create and remove
//! "user follows author" edges.

use std::sync::Arc;

use async_graphql::{Context, Object, Result};
use uuid::Uuid;

use crate::graphql::store_error;
use crate::store::Store;

#[derive(Default)]
pub struct SubscriptionMutation;

#[Object]
impl SubscriptionMutation {
    /// Subscribe `userId` to `authorId`
    async fn subscribe_to(
        &self,
        ctx: &Context<'_>,
        user_id: Uuid,
        author_id: Uuid,
    ) -> Result<String> {
        let store = ctx.data::<Arc<dyn Store>>()?;
        store
            .subscribe(user_id, author_id)
            .await
            .map_err(store_error)?;
        tracing::debug!(subscriber_id = %user_id, %author_id, "Subscription added");
        Ok("done".to_string())
    }

    /// Remove the edge from `userId` to `authorId`
    async fn unsubscribe_from(
        &self,
        ctx: &Context<'_>,
        user_id: Uuid,
        author_id: Uuid,
    ) -> Result<Option<bool>> {
        let store = ctx.data::<Arc<dyn Store>>()?;
        store
            .unsubscribe(user_id, author_id)
            .await
            .map_err(store_error)?;
        Ok(Some(true))
    }
}
