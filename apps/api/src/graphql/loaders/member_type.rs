//! Member type DataLoader

use async_graphql::dataloader::Loader;
use std::collections::HashMap;
use std::sync::Arc;

use super::engine::index_by;
use crate::models::{MemberType, MemberTypeId};
use crate::store::{Store, StoreError};

#[derive(Clone)]
pub struct MemberTypeLoader {
    store: Arc<dyn Store>,
}

impl MemberTypeLoader {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }
}

impl Loader<MemberTypeId> for MemberTypeLoader {
    type Value = MemberType;
    type Error = Arc<StoreError>;

    async fn load(
        &self,
        keys: &[MemberTypeId],
    ) -> Result<HashMap<MemberTypeId, Self::Value>, Self::Error> {
        if keys.is_empty() {
            return Ok(HashMap::new());
        }

        let member_types = self
            .store
            .member_types_by_ids(keys)
            .await
            .map_err(Arc::new)?;
        Ok(index_by(member_types, |member_type| member_type.id))
    }
}
