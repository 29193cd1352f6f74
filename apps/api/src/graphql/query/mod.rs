//! GraphQL queries for quill
//!
//! This module contains all query resolvers, organized by domain. List
//! queries fetch their rows in one store call and prime the matching per-id
//! loader, so the same rows reached again deeper in the document cost
//! nothing.

mod member_type;
mod post;
mod profile;
mod user;

pub use member_type::MemberTypeQuery;
pub use post::PostQuery;
pub use profile::ProfileQuery;
pub use user::UserQuery;

use async_graphql::MergedObject;

/// Root query type combining all query domains
#[derive(MergedObject, Default)]
pub struct Query(UserQuery, PostQuery, ProfileQuery, MemberTypeQuery);
