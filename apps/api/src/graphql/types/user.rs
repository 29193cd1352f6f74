//! User GraphQL type
//!
//! Users are the one self-referential node in the graph: `userSubscribedTo`
//! and `subscribedToUser` both return users. Both directions end in the same
//! per-id user loader, so a user reached along several paths is fetched once
//! per request.

use async_graphql::{Context, Object, Result};
use uuid::Uuid;

use crate::graphql::load_error;
use crate::graphql::loaders::Loaders;
use crate::models::User as DbUser;

use super::post::Post;
use super::profile::Profile;

/// A user of the platform
pub struct User {
    inner: DbUser,
}

impl User {
    pub fn new(user: DbUser) -> Self {
        Self { inner: user }
    }
}

impl From<DbUser> for User {
    fn from(user: DbUser) -> Self {
        Self::new(user)
    }
}

impl User {
    async fn load_users(loaders: &Loaders, ids: Vec<Uuid>) -> Result<Vec<User>> {
        let users = loaders.user.load_many(ids).await.map_err(load_error)?;
        // Edges can outlive the users they point at
        Ok(users.into_iter().flatten().map(User::from).collect())
    }
}

#[Object]
impl User {
    async fn id(&self) -> Uuid {
        self.inner.id
    }

    async fn name(&self) -> &str {
        &self.inner.name
    }

    async fn balance(&self) -> f64 {
        self.inner.balance
    }

    // Relationship resolvers

    /// The user's profile, if one was created
    async fn profile(&self, ctx: &Context<'_>) -> Result<Option<Profile>> {
        let loaders = ctx.data::<Loaders>()?;
        let profile = loaders.profile_by_user.load(self.inner.id).await.map_err(load_error)?;
        if let Some(profile) = &profile {
            loaders.profile.prime(profile.id, profile.clone());
        }
        Ok(profile.map(Profile::from))
    }

    /// Posts written by this user (batched across every user in the response)
    async fn posts(&self, ctx: &Context<'_>) -> Result<Option<Vec<Post>>> {
        let loaders = ctx.data::<Loaders>()?;
        let posts = loaders.posts_by_author.load(self.inner.id).await.map_err(load_error)?;
        for post in &posts {
            loaders.post.prime(post.id, post.clone());
        }
        Ok(Some(posts.into_iter().map(Post::from).collect()))
    }

    /// Authors this user subscribes to
    async fn user_subscribed_to(&self, ctx: &Context<'_>) -> Result<Option<Vec<User>>> {
        let loaders = ctx.data::<Loaders>()?;
        let edges = loaders
            .subscriptions_by_subscriber
            .load(self.inner.id)
            .await
            .map_err(load_error)?;
        let author_ids = edges.iter().map(|edge| edge.author_id).collect();
        Self::load_users(loaders, author_ids).await.map(Some)
    }

    /// Users subscribed to this user
    async fn subscribed_to_user(&self, ctx: &Context<'_>) -> Result<Option<Vec<User>>> {
        let loaders = ctx.data::<Loaders>()?;
        let edges = loaders
            .subscriptions_by_author
            .load(self.inner.id)
            .await
            .map_err(load_error)?;
        let subscriber_ids = edges.iter().map(|edge| edge.subscriber_id).collect();
        Self::load_users(loaders, subscriber_ids).await.map(Some)
    }
}
