//! Profile queries

use std::sync::Arc;

use async_graphql::{Context, Object, Result};
use uuid::Uuid;

use crate::graphql::load_error;
use crate::graphql::loaders::Loaders;
use crate::graphql::store_error;
use crate::graphql::types::Profile;
use crate::store::Store;

#[derive(Default)]
pub struct ProfileQuery;

#[Object]
impl ProfileQuery {
    /// All profiles
    async fn profiles(&self, ctx: &Context<'_>) -> Result<Vec<Profile>> {
        let store = ctx.data::<Arc<dyn Store>>()?;
        let loaders = ctx.data::<Loaders>()?;

        let profiles = store.all_profiles().await.map_err(store_error)?;
        for profile in &profiles {
            loaders.profile.prime(profile.id, profile.clone());
            loaders.profile_by_user.prime(profile.user_id, profile.clone());
        }

        Ok(profiles.into_iter().map(Profile::from).collect())
    }

    /// A profile by ID
    async fn profile(&self, ctx: &Context<'_>, id: Uuid) -> Result<Option<Profile>> {
        let loaders = ctx.data::<Loaders>()?;
        let profile = loaders.profile.load(id).await.map_err(load_error)?;
        Ok(profile.map(Profile::from))
    }
}
