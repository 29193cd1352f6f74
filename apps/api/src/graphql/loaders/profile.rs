//! Profile DataLoaders
//!
//! Profiles are looked up two ways: by their own id (`profile(id:)`) and by
//! the owning user (`User.profile`). A user has at most one profile, so both
//! loaders return single rows.

use async_graphql::dataloader::Loader;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use super::engine::index_by;
use crate::models::Profile;
use crate::store::{Store, StoreError};

/// DataLoader for batching profile lookups by profile id
#[derive(Clone)]
pub struct ProfileLoader {
    store: Arc<dyn Store>,
}

impl ProfileLoader {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }
}

impl Loader<Uuid> for ProfileLoader {
    type Value = Profile;
    type Error = Arc<StoreError>;

    async fn load(&self, keys: &[Uuid]) -> Result<HashMap<Uuid, Self::Value>, Self::Error> {
        if keys.is_empty() {
            return Ok(HashMap::new());
        }

        let profiles = self.store.profiles_by_ids(keys).await.map_err(Arc::new)?;
        Ok(index_by(profiles, |profile| profile.id))
    }
}

/// DataLoader for batching profile lookups by owning user id
#[derive(Clone)]
pub struct ProfileByUserLoader {
    store: Arc<dyn Store>,
}

impl ProfileByUserLoader {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }
}

impl Loader<Uuid> for ProfileByUserLoader {
    type Value = Profile;
    type Error = Arc<StoreError>;

    async fn load(&self, keys: &[Uuid]) -> Result<HashMap<Uuid, Self::Value>, Self::Error> {
        if keys.is_empty() {
            return Ok(HashMap::new());
        }

        let profiles = self
            .store
            .profiles_by_users(keys)
            .await
            .map_err(Arc::new)?;
        Ok(index_by(profiles, |profile| profile.user_id))
    }
}
