//! In-process store
//!
//! Mirrors the PostgreSQL schema rules (cascading user deletes, one profile
//! per user, unique subscription pairs) over plain vectors. Every bulk read is
//! recorded as a [`FetchCall`] so tests can assert how many round trips a
//! query document cost, and any operation can be made to fail on demand.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Store, StoreError, StoreResult};
use crate::models::{
    ChangePost, ChangeProfile, ChangeUser, CreatePost, CreateProfile, CreateUser, MemberType,
    MemberTypeId, Post, Profile, Subscription, User,
};

/// One bulk read as seen by the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchCall {
    /// Name of the [`Store`] method that was called
    pub operation: &'static str,
    /// Keys in the order they were passed
    pub keys: Vec<String>,
}

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    posts: Vec<Post>,
    profiles: Vec<Profile>,
    member_types: Vec<MemberType>,
    subscriptions: Vec<Subscription>,
}

pub struct MemoryStore {
    tables: RwLock<Tables>,
    calls: Mutex<Vec<FetchCall>>,
    failing: Mutex<HashSet<&'static str>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn uuid_keys(ids: &[Uuid]) -> Vec<String> {
    ids.iter().map(Uuid::to_string).collect()
}

impl MemoryStore {
    /// Empty store holding only the member tiers
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables {
                member_types: MemberType::seed(),
                ..Tables::default()
            }),
            calls: Mutex::new(Vec::new()),
            failing: Mutex::new(HashSet::new()),
        }
    }

    /// Every bulk read since creation or the last [`reset_calls`](Self::reset_calls)
    pub fn calls(&self) -> Vec<FetchCall> {
        locked(&self.calls).clone()
    }

    /// Bulk reads made through one operation
    pub fn calls_to(&self, operation: &str) -> Vec<FetchCall> {
        locked(&self.calls)
            .iter()
            .filter(|call| call.operation == operation)
            .cloned()
            .collect()
    }

    pub fn reset_calls(&self) {
        locked(&self.calls).clear();
    }

    /// Make every later call to `operation` fail with [`StoreError::Unavailable`]
    pub fn fail(&self, operation: &'static str) {
        locked(&self.failing).insert(operation);
    }

    pub fn recover(&self, operation: &'static str) {
        locked(&self.failing).remove(operation);
    }

    fn check(&self, operation: &'static str) -> StoreResult<()> {
        if locked(&self.failing).contains(operation) {
            return Err(StoreError::Unavailable(format!(
                "{} is failing on purpose",
                operation
            )));
        }
        Ok(())
    }

    fn record(&self, operation: &'static str, keys: Vec<String>) -> StoreResult<()> {
        tracing::trace!(operation, keys = keys.len(), "memory store read");
        locked(&self.calls).push(FetchCall { operation, keys });
        self.check(operation)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn users_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<User>> {
        self.record("users_by_ids", uuid_keys(ids))?;
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .iter()
            .filter(|u| ids.contains(&u.id))
            .cloned()
            .collect())
    }

    async fn all_users(&self) -> StoreResult<Vec<User>> {
        self.record("all_users", Vec::new())?;
        Ok(self.tables.read().await.users.clone())
    }

    async fn posts_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<Post>> {
        self.record("posts_by_ids", uuid_keys(ids))?;
        let tables = self.tables.read().await;
        Ok(tables
            .posts
            .iter()
            .filter(|p| ids.contains(&p.id))
            .cloned()
            .collect())
    }

    async fn posts_by_authors(&self, author_ids: &[Uuid]) -> StoreResult<Vec<Post>> {
        self.record("posts_by_authors", uuid_keys(author_ids))?;
        let tables = self.tables.read().await;
        Ok(tables
            .posts
            .iter()
            .filter(|p| author_ids.contains(&p.author_id))
            .cloned()
            .collect())
    }

    async fn all_posts(&self) -> StoreResult<Vec<Post>> {
        self.record("all_posts", Vec::new())?;
        Ok(self.tables.read().await.posts.clone())
    }

    async fn profiles_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<Profile>> {
        self.record("profiles_by_ids", uuid_keys(ids))?;
        let tables = self.tables.read().await;
        Ok(tables
            .profiles
            .iter()
            .filter(|p| ids.contains(&p.id))
            .cloned()
            .collect())
    }

    async fn profiles_by_users(&self, user_ids: &[Uuid]) -> StoreResult<Vec<Profile>> {
        self.record("profiles_by_users", uuid_keys(user_ids))?;
        let tables = self.tables.read().await;
        Ok(tables
            .profiles
            .iter()
            .filter(|p| user_ids.contains(&p.user_id))
            .cloned()
            .collect())
    }

    async fn all_profiles(&self) -> StoreResult<Vec<Profile>> {
        self.record("all_profiles", Vec::new())?;
        Ok(self.tables.read().await.profiles.clone())
    }

    async fn member_types_by_ids(&self, ids: &[MemberTypeId]) -> StoreResult<Vec<MemberType>> {
        self.record(
            "member_types_by_ids",
            ids.iter().map(|id| id.as_str().to_string()).collect(),
        )?;
        let tables = self.tables.read().await;
        Ok(tables
            .member_types
            .iter()
            .filter(|m| ids.contains(&m.id))
            .cloned()
            .collect())
    }

    async fn all_member_types(&self) -> StoreResult<Vec<MemberType>> {
        self.record("all_member_types", Vec::new())?;
        Ok(self.tables.read().await.member_types.clone())
    }

    async fn subscriptions_by_subscribers(
        &self,
        subscriber_ids: &[Uuid],
    ) -> StoreResult<Vec<Subscription>> {
        self.record("subscriptions_by_subscribers", uuid_keys(subscriber_ids))?;
        let tables = self.tables.read().await;
        Ok(tables
            .subscriptions
            .iter()
            .filter(|s| subscriber_ids.contains(&s.subscriber_id))
            .copied()
            .collect())
    }

    async fn subscriptions_by_authors(
        &self,
        author_ids: &[Uuid],
    ) -> StoreResult<Vec<Subscription>> {
        self.record("subscriptions_by_authors", uuid_keys(author_ids))?;
        let tables = self.tables.read().await;
        Ok(tables
            .subscriptions
            .iter()
            .filter(|s| author_ids.contains(&s.author_id))
            .copied()
            .collect())
    }

    async fn create_user(&self, input: CreateUser) -> StoreResult<User> {
        self.check("create_user")?;
        let user = User {
            id: Uuid::new_v4(),
            name: input.name,
            balance: input.balance,
        };
        self.tables.write().await.users.push(user.clone());
        Ok(user)
    }

    async fn update_user(&self, id: Uuid, change: ChangeUser) -> StoreResult<User> {
        self.check("update_user")?;
        let mut tables = self.tables.write().await;
        let user = tables
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| StoreError::not_found("user", id))?;
        change.apply(user);
        Ok(user.clone())
    }

    async fn delete_user(&self, id: Uuid) -> StoreResult<()> {
        self.check("delete_user")?;
        let mut tables = self.tables.write().await;
        let before = tables.users.len();
        tables.users.retain(|u| u.id != id);
        if tables.users.len() == before {
            return Err(StoreError::not_found("user", id));
        }
        tables.posts.retain(|p| p.author_id != id);
        tables.profiles.retain(|p| p.user_id != id);
        tables
            .subscriptions
            .retain(|s| s.subscriber_id != id && s.author_id != id);
        Ok(())
    }

    async fn create_post(&self, input: CreatePost) -> StoreResult<Post> {
        self.check("create_post")?;
        let mut tables = self.tables.write().await;
        if !tables.users.iter().any(|u| u.id == input.author_id) {
            return Err(StoreError::invalid_reference("user", input.author_id));
        }
        let post = Post {
            id: Uuid::new_v4(),
            title: input.title,
            content: input.content,
            author_id: input.author_id,
        };
        tables.posts.push(post.clone());
        Ok(post)
    }

    async fn update_post(&self, id: Uuid, change: ChangePost) -> StoreResult<Post> {
        self.check("update_post")?;
        let mut tables = self.tables.write().await;
        let post = tables
            .posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| StoreError::not_found("post", id))?;
        change.apply(post);
        Ok(post.clone())
    }

    async fn delete_post(&self, id: Uuid) -> StoreResult<()> {
        self.check("delete_post")?;
        let mut tables = self.tables.write().await;
        let before = tables.posts.len();
        tables.posts.retain(|p| p.id != id);
        if tables.posts.len() == before {
            return Err(StoreError::not_found("post", id));
        }
        Ok(())
    }

    async fn create_profile(&self, input: CreateProfile) -> StoreResult<Profile> {
        self.check("create_profile")?;
        let mut tables = self.tables.write().await;
        if !tables.users.iter().any(|u| u.id == input.user_id) {
            return Err(StoreError::invalid_reference("user", input.user_id));
        }
        if !tables.member_types.iter().any(|m| m.id == input.member_type_id) {
            return Err(StoreError::invalid_reference(
                "member type",
                input.member_type_id,
            ));
        }
        if tables.profiles.iter().any(|p| p.user_id == input.user_id) {
            return Err(StoreError::conflict("profile", input.user_id));
        }
        let profile = Profile {
            id: Uuid::new_v4(),
            is_male: input.is_male,
            year_of_birth: input.year_of_birth,
            user_id: input.user_id,
            member_type_id: input.member_type_id,
        };
        tables.profiles.push(profile.clone());
        Ok(profile)
    }

    async fn update_profile(&self, id: Uuid, change: ChangeProfile) -> StoreResult<Profile> {
        self.check("update_profile")?;
        let mut tables = self.tables.write().await;
        if let Some(member_type_id) = change.member_type_id {
            if !tables.member_types.iter().any(|m| m.id == member_type_id) {
                return Err(StoreError::invalid_reference("member type", member_type_id));
            }
        }
        let profile = tables
            .profiles
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| StoreError::not_found("profile", id))?;
        change.apply(profile);
        Ok(profile.clone())
    }

    async fn delete_profile(&self, id: Uuid) -> StoreResult<()> {
        self.check("delete_profile")?;
        let mut tables = self.tables.write().await;
        let before = tables.profiles.len();
        tables.profiles.retain(|p| p.id != id);
        if tables.profiles.len() == before {
            return Err(StoreError::not_found("profile", id));
        }
        Ok(())
    }

    async fn subscribe(&self, subscriber_id: Uuid, author_id: Uuid) -> StoreResult<()> {
        self.check("subscribe")?;
        let mut tables = self.tables.write().await;
        for id in [subscriber_id, author_id] {
            if !tables.users.iter().any(|u| u.id == id) {
                return Err(StoreError::invalid_reference("user", id));
            }
        }
        let edge = Subscription::new(subscriber_id, author_id);
        if tables.subscriptions.contains(&edge) {
            return Err(StoreError::conflict(
                "subscription",
                format!("{}->{}", subscriber_id, author_id),
            ));
        }
        tables.subscriptions.push(edge);
        Ok(())
    }

    async fn unsubscribe(&self, subscriber_id: Uuid, author_id: Uuid) -> StoreResult<()> {
        self.check("unsubscribe")?;
        let mut tables = self.tables.write().await;
        let edge = Subscription::new(subscriber_id, author_id);
        let before = tables.subscriptions.len();
        tables.subscriptions.retain(|s| *s != edge);
        if tables.subscriptions.len() == before {
            return Err(StoreError::not_found(
                "subscription",
                format!("{}->{}", subscriber_id, author_id),
            ));
        }
        Ok(())
    }

    async fn ping(&self) -> StoreResult<()> {
        self.check("ping")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    async fn user(store: &MemoryStore, name: &str) -> User {
        store
            .create_user(CreateUser {
                name: name.to_string(),
                balance: 0.0,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_bulk_reads_are_recorded_with_keys() {
        let store = MemoryStore::new();
        let ada = user(&store, "Ada").await;
        let missing = Uuid::new_v4();

        let found = store.users_by_ids(&[missing, ada.id]).await.unwrap();

        assert_eq!(found, vec![ada.clone()]);
        assert_eq!(
            store.calls_to("users_by_ids"),
            vec![FetchCall {
                operation: "users_by_ids",
                keys: vec![missing.to_string(), ada.id.to_string()],
            }]
        );
    }

    #[tokio::test]
    async fn test_injected_failure_is_still_recorded() {
        let store = MemoryStore::new();
        store.fail("posts_by_authors");

        let result = store.posts_by_authors(&[Uuid::new_v4()]).await;

        assert_matches!(result, Err(StoreError::Unavailable(_)));
        assert_eq!(store.calls_to("posts_by_authors").len(), 1);

        store.recover("posts_by_authors");
        assert!(store.posts_by_authors(&[Uuid::new_v4()]).await.is_ok());
    }

    #[tokio::test]
    async fn test_one_profile_per_user() {
        let store = MemoryStore::new();
        let ada = user(&store, "Ada").await;
        let input = CreateProfile {
            user_id: ada.id,
            is_male: false,
            year_of_birth: 1815,
            member_type_id: MemberTypeId::Basic,
        };

        store.create_profile(input.clone()).await.unwrap();
        let second = store.create_profile(input).await;

        assert_matches!(second, Err(StoreError::Conflict { entity: "profile", .. }));
    }

    #[tokio::test]
    async fn test_subscription_pair_is_unique() {
        let store = MemoryStore::new();
        let ada = user(&store, "Ada").await;
        let bob = user(&store, "Bob").await;

        store.subscribe(ada.id, bob.id).await.unwrap();
        assert_matches!(
            store.subscribe(ada.id, bob.id).await,
            Err(StoreError::Conflict { .. })
        );
        // The reverse direction is a different edge
        store.subscribe(bob.id, ada.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_user_cascades() {
        let store = MemoryStore::new();
        let ada = user(&store, "Ada").await;
        let bob = user(&store, "Bob").await;
        store
            .create_post(CreatePost {
                title: "Notes".to_string(),
                content: "On the engine".to_string(),
                author_id: ada.id,
            })
            .await
            .unwrap();
        store.subscribe(bob.id, ada.id).await.unwrap();

        store.delete_user(ada.id).await.unwrap();

        assert!(store.posts_by_authors(&[ada.id]).await.unwrap().is_empty());
        assert!(store
            .subscriptions_by_subscribers(&[bob.id])
            .await
            .unwrap()
            .is_empty());
        assert_matches!(
            store.delete_user(ada.id).await,
            Err(StoreError::NotFound { entity: "user", .. })
        );
    }

    #[tokio::test]
    async fn test_post_requires_existing_author() {
        let store = MemoryStore::new();
        let result = store
            .create_post(CreatePost {
                title: "Orphan".to_string(),
                content: String::new(),
                author_id: Uuid::new_v4(),
            })
            .await;

        assert_matches!(result, Err(StoreError::InvalidReference { entity: "user", .. }));
    }
}
