//! User queries

use std::sync::Arc;

use async_graphql::{Context, Object, Result};
use uuid::Uuid;

use crate::graphql::load_error;
use crate::graphql::loaders::Loaders;
use crate::graphql::store_error;
use crate::graphql::types::User;
use crate::store::Store;

#[derive(Default)]
pub struct UserQuery;

#[Object]
impl UserQuery {
    /// All users
    async fn users(&self, ctx: &Context<'_>) -> Result<Vec<User>> {
        let store = ctx.data::<Arc<dyn Store>>()?;
        let loaders = ctx.data::<Loaders>()?;

        let users = store.all_users().await.map_err(store_error)?;
        for user in &users {
            loaders.user.prime(user.id, user.clone());
        }

        Ok(users.into_iter().map(User::from).collect())
    }

    /// A user by ID; null when no such user exists
    async fn user(&self, ctx: &Context<'_>, id: Uuid) -> Result<Option<User>> {
        let loaders = ctx.data::<Loaders>()?;
        let user = loaders.user.load(id).await.map_err(load_error)?;
        Ok(user.map(User::from))
    }
}
