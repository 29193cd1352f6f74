//! GraphQL schema and resolvers for quill
//!
//! This module contains the async-graphql schema including:
//! - Query resolvers for users, posts, profiles and member tiers
//! - Mutation resolvers for the same entities and subscription edges
//! - Request-scoped batch loaders backing every relation field
//! - The depth guard that runs before execution

pub mod guards;
pub mod loaders;
pub mod mutation;
pub mod query;
pub mod schema;
pub mod types;

pub use guards::DepthGuard;
pub use loaders::{BatchSettings, Loaders};
pub use schema::{build_executor, GraphQLExecutor, QuillSchema, SchemaBuilder};

use crate::error::ApiError;
use crate::store::StoreError;
use loaders::LoadError;

/// Field error for a failed store call
pub(crate) fn store_error(err: StoreError) -> async_graphql::Error {
    ApiError::from(err).into_graphql()
}

/// Field error for a failed batch load
pub(crate) fn load_error(err: LoadError) -> async_graphql::Error {
    ApiError::from(err).into_graphql()
}
