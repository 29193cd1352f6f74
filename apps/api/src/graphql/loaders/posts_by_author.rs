//! Posts-by-Author DataLoader for batched fetching
//!
//! Resolving `posts` for N users issues one `posts_by_authors` call carrying
//! all N author ids instead of N separate lookups.

use async_graphql::dataloader::Loader;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use super::engine::group_by;
use crate::models::Post;
use crate::store::{Store, StoreError};

/// DataLoader for batching posts-by-author queries
#[derive(Clone)]
pub struct PostsByAuthorLoader {
    store: Arc<dyn Store>,
}

impl PostsByAuthorLoader {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }
}

impl Loader<Uuid> for PostsByAuthorLoader {
    type Value = Vec<Post>;
    type Error = Arc<StoreError>;

    async fn load(&self, keys: &[Uuid]) -> Result<HashMap<Uuid, Self::Value>, Self::Error> {
        if keys.is_empty() {
            return Ok(HashMap::new());
        }

        let posts = self.store.posts_by_authors(keys).await.map_err(Arc::new)?;

        // Authors without posts still get an (empty) entry
        Ok(group_by(keys, posts, |post| post.author_id))
    }
}
