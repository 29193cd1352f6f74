//! Post DataLoader for batched fetching

use async_graphql::dataloader::Loader;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use super::engine::index_by;
use crate::models::Post;
use crate::store::{Store, StoreError};

/// DataLoader for batching post lookups by post id
#[derive(Clone)]
pub struct PostLoader {
    store: Arc<dyn Store>,
}

impl PostLoader {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }
}

impl Loader<Uuid> for PostLoader {
    type Value = Post;
    type Error = Arc<StoreError>;

    async fn load(&self, keys: &[Uuid]) -> Result<HashMap<Uuid, Self::Value>, Self::Error> {
        if keys.is_empty() {
            return Ok(HashMap::new());
        }

        let posts = self.store.posts_by_ids(keys).await.map_err(Arc::new)?;
        Ok(index_by(posts, |post| post.id))
    }
}
