//! DataLoader implementations for GraphQL
//!
//! Relationship resolvers never hit the store one parent at a time. Each
//! relation has a [`Loader`](async_graphql::dataloader::Loader) that knows how
//! to fetch many keys in one store call, and the [`engine`] wraps it with
//! request-scoped batching, deduplication and caching.
//!
//! There are two kinds of loaders:
//! - Single-entity loaders ([`OneLoader`]): `Option<T>` for one key
//! - Collection loaders ([`ManyLoader`]): `Vec<T>` of related rows per parent

pub mod engine;
mod member_type;
mod post;
mod posts_by_author;
mod profile;
mod subscriptions;
mod user;

pub use engine::{BatchLoader, BatchSettings, LoadError, ManyLoader, OneLoader};
pub use member_type::MemberTypeLoader;
pub use post::PostLoader;
pub use posts_by_author::PostsByAuthorLoader;
pub use profile::{ProfileByUserLoader, ProfileLoader};
pub use subscriptions::{SubscriptionsByAuthorLoader, SubscriptionsBySubscriberLoader};
pub use user::UserLoader;

use std::sync::Arc;
use uuid::Uuid;

use crate::models::MemberTypeId;
use crate::store::Store;

/// Every loader one request needs
///
/// Built fresh for each request so nothing cached survives past it. Resolvers
/// reach it through `ctx.data::<Loaders>()`.
pub struct Loaders {
    pub user: OneLoader<Uuid, UserLoader>,
    pub post: OneLoader<Uuid, PostLoader>,
    pub posts_by_author: ManyLoader<Uuid, PostsByAuthorLoader>,
    pub profile: OneLoader<Uuid, ProfileLoader>,
    pub profile_by_user: OneLoader<Uuid, ProfileByUserLoader>,
    pub member_type: OneLoader<MemberTypeId, MemberTypeLoader>,
    pub subscriptions_by_subscriber: ManyLoader<Uuid, SubscriptionsBySubscriberLoader>,
    pub subscriptions_by_author: ManyLoader<Uuid, SubscriptionsByAuthorLoader>,
}

impl Loaders {
    pub fn new(store: Arc<dyn Store>, settings: BatchSettings) -> Self {
        Self {
            user: OneLoader::new("user", UserLoader::new(store.clone()), settings),
            post: OneLoader::new("post", PostLoader::new(store.clone()), settings),
            posts_by_author: ManyLoader::new(
                "posts_by_author",
                PostsByAuthorLoader::new(store.clone()),
                settings,
            ),
            profile: OneLoader::new("profile", ProfileLoader::new(store.clone()), settings),
            profile_by_user: OneLoader::new(
                "profile_by_user",
                ProfileByUserLoader::new(store.clone()),
                settings,
            ),
            member_type: OneLoader::new(
                "member_type",
                MemberTypeLoader::new(store.clone()),
                settings,
            ),
            subscriptions_by_subscriber: ManyLoader::new(
                "subscriptions_by_subscriber",
                SubscriptionsBySubscriberLoader::new(store.clone()),
                settings,
            ),
            subscriptions_by_author: ManyLoader::new(
                "subscriptions_by_author",
                SubscriptionsByAuthorLoader::new(store),
                settings,
            ),
        }
    }
}
