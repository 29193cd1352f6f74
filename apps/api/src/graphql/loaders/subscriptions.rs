//! Subscription edge DataLoaders
//!
//! `User.userSubscribedTo` needs the edges a user created (keyed by
//! subscriber) and `User.subscribedToUser` needs the edges pointing at a user
//! (keyed by author). Each direction batches on its own.

use async_graphql::dataloader::Loader;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use super::engine::group_by;
use crate::models::Subscription;
use crate::store::{Store, StoreError};

/// Edges keyed by `subscriber_id`
#[derive(Clone)]
pub struct SubscriptionsBySubscriberLoader {
    store: Arc<dyn Store>,
}

impl SubscriptionsBySubscriberLoader {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }
}

impl Loader<Uuid> for SubscriptionsBySubscriberLoader {
    type Value = Vec<Subscription>;
    type Error = Arc<StoreError>;

    async fn load(&self, keys: &[Uuid]) -> Result<HashMap<Uuid, Self::Value>, Self::Error> {
        if keys.is_empty() {
            return Ok(HashMap::new());
        }

        let edges = self
            .store
            .subscriptions_by_subscribers(keys)
            .await
            .map_err(Arc::new)?;
        Ok(group_by(keys, edges, |edge| edge.subscriber_id))
    }
}

/// Edges keyed by `author_id`
#[derive(Clone)]
pub struct SubscriptionsByAuthorLoader {
    store: Arc<dyn Store>,
}

impl SubscriptionsByAuthorLoader {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }
}

impl Loader<Uuid> for SubscriptionsByAuthorLoader {
    type Value = Vec<Subscription>;
    type Error = Arc<StoreError>;

    async fn load(&self, keys: &[Uuid]) -> Result<HashMap<Uuid, Self::Value>, Self::Error> {
        if keys.is_empty() {
            return Ok(HashMap::new());
        }

        let edges = self
            .store
            .subscriptions_by_authors(keys)
            .await
            .map_err(Arc::new)?;
        Ok(group_by(keys, edges, |edge| edge.author_id))
    }
}
