//! Member tier queries

use std::sync::Arc;

use async_graphql::{Context, Object, Result};

use crate::graphql::load_error;
use crate::graphql::loaders::Loaders;
use crate::graphql::store_error;
use crate::graphql::types::MemberType;
use crate::models::MemberTypeId;
use crate::store::Store;

#[derive(Default)]
pub struct MemberTypeQuery;

#[Object]
impl MemberTypeQuery {
    /// Every member tier
    async fn member_types(&self, ctx: &Context<'_>) -> Result<Vec<MemberType>> {
        let store = ctx.data::<Arc<dyn Store>>()?;
        let loaders = ctx.data::<Loaders>()?;

        let member_types = store.all_member_types().await.map_err(store_error)?;
        for member_type in &member_types {
            loaders.member_type.prime(member_type.id, member_type.clone());
        }

        Ok(member_types.into_iter().map(MemberType::from).collect())
    }

    async fn member_type(&self, ctx: &Context<'_>, id: MemberTypeId) -> Result<Option<MemberType>> {
        let loaders = ctx.data::<Loaders>()?;
        let member_type = loaders.member_type.load(id).await.map_err(load_error)?;
        Ok(member_type.map(MemberType::from))
    }
}
