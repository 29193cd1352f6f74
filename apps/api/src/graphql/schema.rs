//! GraphQL schema construction and request execution for quill
//!
//! [`GraphQLExecutor::resolve`] is the single entry point a transport uses:
//! it measures the document, builds a fresh loader registry for the request,
//! and only then executes it.

use std::sync::Arc;

use async_graphql::{EmptySubscription, Request, Response, Schema};

use crate::store::Store;

use super::guards::DepthGuard;
use super::loaders::{BatchSettings, Loaders};
use super::mutation::Mutation;
use super::query::Query;

/// The quill GraphQL schema type
pub type QuillSchema = Schema<Query, Mutation, EmptySubscription>;

/// Depth bound applied when none is configured
pub const DEFAULT_DEPTH_LIMIT: usize = 5;

/// Builder for the schema and the executor wrapped around it
pub struct SchemaBuilder {
    depth_limit: usize,
    batch: BatchSettings,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self {
            depth_limit: DEFAULT_DEPTH_LIMIT,
            batch: BatchSettings::default(),
        }
    }

    /// Maximum nesting depth accepted by the depth guard
    pub fn depth_limit(mut self, depth_limit: usize) -> Self {
        self.depth_limit = depth_limit;
        self
    }

    /// Batching window settings for every request's loaders
    pub fn batch_settings(mut self, batch: BatchSettings) -> Self {
        self.batch = batch;
        self
    }

    /// Build the bare schema
    ///
    /// Store and loaders are request data, so the schema itself carries none.
    pub fn build_schema() -> QuillSchema {
        Schema::build(Query::default(), Mutation::default(), EmptySubscription).finish()
    }

    pub fn build(self) -> GraphQLExecutor {
        GraphQLExecutor {
            schema: Self::build_schema(),
            guard: DepthGuard::new(self.depth_limit),
            batch: self.batch,
        }
    }
}

impl Default for SchemaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Depth-guarded, loader-equipped schema execution
#[derive(Clone)]
pub struct GraphQLExecutor {
    schema: QuillSchema,
    guard: DepthGuard,
    batch: BatchSettings,
}

impl GraphQLExecutor {
    /// Execute one request against `store`
    ///
    /// A document that fails the depth guard is answered with errors only;
    /// no resolver runs and the store is never touched.
    pub async fn resolve(&self, request: Request, store: Arc<dyn Store>) -> Response {
        if let Err(errors) = self.guard.check_source(&request.query) {
            tracing::info!(
                operation = request.operation_name.as_deref().unwrap_or("anonymous"),
                max_depth = self.guard.max_depth(),
                "Rejected GraphQL document before execution"
            );
            return Response::from_errors(errors);
        }

        let loaders = Loaders::new(store.clone(), self.batch);
        self.schema
            .execute(request.data(loaders).data(store))
            .await
    }
}

/// Executor with default depth limit and batch settings
pub fn build_executor() -> GraphQLExecutor {
    SchemaBuilder::new().build()
}
