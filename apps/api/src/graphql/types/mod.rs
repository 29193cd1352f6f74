//! GraphQL type definitions for quill
//!
//! Each object wraps its database row and resolves relations through the
//! request's [`Loaders`](crate::graphql::loaders::Loaders), never through the
//! store directly.

mod member_type;
mod post;
mod profile;
mod user;

pub use member_type::MemberType;
pub use post::Post;
pub use profile::Profile;
pub use user::User;
