//! Persistent store collaborator
//!
//! Resolvers never talk to a database directly. Everything goes through the
//! object-safe [`Store`] trait so the batching layer can be exercised against
//! [`MemoryStore`] in tests and run against PostgreSQL ([`PgStore`]) in
//! production.
//!
//! Bulk reads return rows in whatever order the backend produces; callers
//! re-associate rows with keys themselves.

mod error;
mod memory;
mod postgres;

pub use error::{StoreError, StoreResult};
pub use memory::{FetchCall, MemoryStore};
pub use postgres::PgStore;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{
    ChangePost, ChangeProfile, ChangeUser, CreatePost, CreateProfile, CreateUser, MemberType,
    MemberTypeId, Post, Profile, Subscription, User,
};

#[async_trait]
pub trait Store: Send + Sync + 'static {
    // ========== Bulk reads ==========

    async fn users_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<User>>;

    async fn all_users(&self) -> StoreResult<Vec<User>>;

    async fn posts_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<Post>>;

    async fn posts_by_authors(&self, author_ids: &[Uuid]) -> StoreResult<Vec<Post>>;

    async fn all_posts(&self) -> StoreResult<Vec<Post>>;

    async fn profiles_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<Profile>>;

    async fn profiles_by_users(&self, user_ids: &[Uuid]) -> StoreResult<Vec<Profile>>;

    async fn all_profiles(&self) -> StoreResult<Vec<Profile>>;

    async fn member_types_by_ids(&self, ids: &[MemberTypeId]) -> StoreResult<Vec<MemberType>>;

    async fn all_member_types(&self) -> StoreResult<Vec<MemberType>>;

    /// Edges whose `subscriber_id` is in `subscriber_ids`
    async fn subscriptions_by_subscribers(
        &self,
        subscriber_ids: &[Uuid],
    ) -> StoreResult<Vec<Subscription>>;

    /// Edges whose `author_id` is in `author_ids`
    async fn subscriptions_by_authors(&self, author_ids: &[Uuid])
        -> StoreResult<Vec<Subscription>>;

    // ========== Writes ==========

    async fn create_user(&self, input: CreateUser) -> StoreResult<User>;

    async fn update_user(&self, id: Uuid, change: ChangeUser) -> StoreResult<User>;

    /// Removes the user together with their posts, profile and edges
    async fn delete_user(&self, id: Uuid) -> StoreResult<()>;

    async fn create_post(&self, input: CreatePost) -> StoreResult<Post>;

    async fn update_post(&self, id: Uuid, change: ChangePost) -> StoreResult<Post>;

    async fn delete_post(&self, id: Uuid) -> StoreResult<()>;

    async fn create_profile(&self, input: CreateProfile) -> StoreResult<Profile>;

    async fn update_profile(&self, id: Uuid, change: ChangeProfile) -> StoreResult<Profile>;

    async fn delete_profile(&self, id: Uuid) -> StoreResult<()>;

    async fn subscribe(&self, subscriber_id: Uuid, author_id: Uuid) -> StoreResult<()>;

    async fn unsubscribe(&self, subscriber_id: Uuid, author_id: Uuid) -> StoreResult<()>;

    /// Cheap round trip used by the readiness probe
    async fn ping(&self) -> StoreResult<()>;
}
