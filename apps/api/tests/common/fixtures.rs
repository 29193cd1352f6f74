//! Test fixtures for API integration tests
//!
//! Every fixture runs against [`MemoryStore`], so no database is needed.

#![allow(dead_code)]

use std::sync::Arc;

use fake::faker::lorem::en::{Paragraph, Sentence};
use fake::faker::name::en::Name;
use fake::Fake;

use async_trait::async_trait;
use uuid::Uuid;

use quill_api::models::{
    ChangePost, ChangeProfile, ChangeUser, CreatePost, CreateProfile, CreateUser, MemberType,
    MemberTypeId, Post, Profile, Subscription, User,
};
use quill_api::store::StoreResult;
use quill_api::{MemoryStore, Store};

/// Create a user with a generated name
pub async fn create_user(store: &MemoryStore) -> User {
    store
        .create_user(CreateUser {
            name: Name().fake(),
            balance: (0.0..500.0).fake(),
        })
        .await
        .expect("create user")
}

/// Create a post with generated text
pub async fn create_post(store: &MemoryStore, author: &User) -> Post {
    store
        .create_post(CreatePost {
            title: Sentence(2..5).fake(),
            content: Paragraph(1..3).fake(),
            author_id: author.id,
        })
        .await
        .expect("create post")
}

pub async fn create_profile(store: &MemoryStore, user: &User, member_type_id: MemberTypeId) {
    store
        .create_profile(CreateProfile {
            user_id: user.id,
            is_male: (0..2).fake::<u8>() == 1,
            year_of_birth: (1950..2005).fake(),
            member_type_id,
        })
        .await
        .expect("create profile");
}

/// Three users, two posts each for the first two and one for the third, a
/// mutual subscription between the first two users, and a profile for the
/// first user. Call history is cleared before it is returned.
pub struct Scenario {
    pub store: Arc<MemoryStore>,
    pub users: Vec<User>,
    pub posts: Vec<Post>,
}

impl Scenario {
    pub async fn build() -> Self {
        let store = Arc::new(MemoryStore::new());

        let mut users = Vec::new();
        for _ in 0..3 {
            users.push(create_user(&store).await);
        }

        let mut posts = Vec::new();
        for author in [&users[0], &users[0], &users[1], &users[1], &users[2]] {
            posts.push(create_post(&store, author).await);
        }

        store.subscribe(users[0].id, users[1].id).await.expect("subscribe");
        store.subscribe(users[1].id, users[0].id).await.expect("subscribe");

        create_profile(&store, &users[0], MemberTypeId::Business).await;

        store.reset_calls();
        Self {
            store,
            users,
            posts,
        }
    }

    pub fn user_ids(&self) -> Vec<String> {
        self.users.iter().map(|u| u.id.to_string()).collect()
    }
}

/// Store whose bulk user reads leave out one user, as if the row vanished
/// after its subscription edges were read. Every other call goes to `inner`.
pub struct HidingStore {
    pub inner: Arc<MemoryStore>,
    pub hidden: Uuid,
}

#[async_trait]
impl Store for HidingStore {
    async fn users_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<User>> {
        let users = self.inner.users_by_ids(ids).await?;
        Ok(users.into_iter().filter(|u| u.id != self.hidden).collect())
    }

    async fn all_users(&self) -> StoreResult<Vec<User>> {
        self.inner.all_users().await
    }

    async fn posts_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<Post>> {
        self.inner.posts_by_ids(ids).await
    }

    async fn posts_by_authors(&self, author_ids: &[Uuid]) -> StoreResult<Vec<Post>> {
        self.inner.posts_by_authors(author_ids).await
    }

    async fn all_posts(&self) -> StoreResult<Vec<Post>> {
        self.inner.all_posts().await
    }

    async fn profiles_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<Profile>> {
        self.inner.profiles_by_ids(ids).await
    }

    async fn profiles_by_users(&self, user_ids: &[Uuid]) -> StoreResult<Vec<Profile>> {
        self.inner.profiles_by_users(user_ids).await
    }

    async fn all_profiles(&self) -> StoreResult<Vec<Profile>> {
        self.inner.all_profiles().await
    }

    async fn member_types_by_ids(&self, ids: &[MemberTypeId]) -> StoreResult<Vec<MemberType>> {
        self.inner.member_types_by_ids(ids).await
    }

    async fn all_member_types(&self) -> StoreResult<Vec<MemberType>> {
        self.inner.all_member_types().await
    }

    async fn subscriptions_by_subscribers(
        &self,
        subscriber_ids: &[Uuid],
    ) -> StoreResult<Vec<Subscription>> {
        self.inner.subscriptions_by_subscribers(subscriber_ids).await
    }

    async fn subscriptions_by_authors(
        &self,
        author_ids: &[Uuid],
    ) -> StoreResult<Vec<Subscription>> {
        self.inner.subscriptions_by_authors(author_ids).await
    }

    async fn create_user(&self, input: CreateUser) -> StoreResult<User> {
        self.inner.create_user(input).await
    }

    async fn update_user(&self, id: Uuid, change: ChangeUser) -> StoreResult<User> {
        self.inner.update_user(id, change).await
    }

    async fn delete_user(&self, id: Uuid) -> StoreResult<()> {
        self.inner.delete_user(id).await
    }

    async fn create_post(&self, input: CreatePost) -> StoreResult<Post> {
        self.inner.create_post(input).await
    }

    async fn update_post(&self, id: Uuid, change: ChangePost) -> StoreResult<Post> {
        self.inner.update_post(id, change).await
    }

    async fn delete_post(&self, id: Uuid) -> StoreResult<()> {
        self.inner.delete_post(id).await
    }

    async fn create_profile(&self, input: CreateProfile) -> StoreResult<Profile> {
        self.inner.create_profile(input).await
    }

    async fn update_profile(&self, id: Uuid, change: ChangeProfile) -> StoreResult<Profile> {
        self.inner.update_profile(id, change).await
    }

    async fn delete_profile(&self, id: Uuid) -> StoreResult<()> {
        self.inner.delete_profile(id).await
    }

    async fn subscribe(&self, subscriber_id: Uuid, author_id: Uuid) -> StoreResult<()> {
        self.inner.subscribe(subscriber_id, author_id).await
    }

    async fn unsubscribe(&self, subscriber_id: Uuid, author_id: Uuid) -> StoreResult<()> {
        self.inner.unsubscribe(subscriber_id, author_id).await
    }

    async fn ping(&self) -> StoreResult<()> {
        self.inner.ping().await
    }
}
