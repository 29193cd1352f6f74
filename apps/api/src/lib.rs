//! quill API library
//!
//! This module exposes the core API components for use in integration tests
//! and by the `quill-api` binary.

pub mod config;
pub mod error;
pub mod graphql;
pub mod models;
pub mod routes;
pub mod store;

// Re-export commonly used types
pub use error::{ApiError, ErrorResponse};
pub use graphql::{GraphQLExecutor, SchemaBuilder};
pub use store::{MemoryStore, PgStore, Store, StoreError};
