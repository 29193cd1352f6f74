//! User DataLoader for batched fetching
//!
//! Collects every user id requested while a window is open and resolves them
//! with a single `users_by_ids` call.

use async_graphql::dataloader::Loader;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use super::engine::index_by;
use crate::models::User;
use crate::store::{Store, StoreError};

/// DataLoader for batching user lookups
#[derive(Clone)]
pub struct UserLoader {
    store: Arc<dyn Store>,
}

impl UserLoader {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }
}

impl Loader<Uuid> for UserLoader {
    type Value = User;
    type Error = Arc<StoreError>;

    async fn load(&self, keys: &[Uuid]) -> Result<HashMap<Uuid, Self::Value>, Self::Error> {
        if keys.is_empty() {
            return Ok(HashMap::new());
        }

        let users = self.store.users_by_ids(keys).await.map_err(Arc::new)?;
        Ok(index_by(users, |user| user.id))
    }
}
