//! Domain models for quill
//!
//! Rows as the store hands them back, plus the change sets accepted by the
//! write side of the store. GraphQL wrappers live in `graphql::types`.

pub mod member_type;
pub mod post;
pub mod profile;
pub mod subscription;
pub mod user;

pub use member_type::{MemberType, MemberTypeId};
pub use post::{ChangePost, CreatePost, Post};
pub use profile::{ChangeProfile, CreateProfile, Profile};
pub use subscription::Subscription;
pub use user::{ChangeUser, CreateUser, User};
