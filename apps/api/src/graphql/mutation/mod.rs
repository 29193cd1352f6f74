//! GraphQL mutations for quill
//!
//! This module contains all mutation resolvers, organized by domain.
//!
//! Every mutation reports store failures the same way: a field error whose
//! `extensions.code` is `NOT_FOUND`, `CONFLICT`, `INVALID_REFERENCE`,
//! `VALIDATION_ERROR` or `INTERNAL_ERROR`. Deletes return `true` only when a
//! row was removed; a failure is never folded into `false`.

mod post;
mod profile;
mod subscription;
mod user;

pub use post::{ChangePostInput, CreatePostInput, PostMutation};
pub use profile::{ChangeProfileInput, CreateProfileInput, ProfileMutation};
pub use subscription::SubscriptionMutation;
pub use user::{ChangeUserInput, CreateUserInput, UserMutation};

use async_graphql::MergedObject;

/// Root mutation type combining all mutation domains
#[derive(MergedObject, Default)]
pub struct Mutation(UserMutation, PostMutation, ProfileMutation, SubscriptionMutation);
