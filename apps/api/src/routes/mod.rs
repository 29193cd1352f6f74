//! HTTP route handlers for the quill API
//!
//! - `POST /graphql` and, when enabled, `GET /graphql/playground`
//! - `GET /health`, `/health/live`, `/health/ready`

pub mod cors;
pub mod graphql;
pub mod health;

pub use cors::cors_layer;
pub use graphql::{graphql_router, GraphQLState};
pub use health::{health_router, HealthState};

use std::sync::Arc;

use axum::{routing::get, Router};

use crate::graphql::GraphQLExecutor;
use crate::store::Store;

/// Assemble every route around one executor and one store handle
///
/// Transport layers (tracing, CORS) are added by the caller.
pub fn app_router(executor: GraphQLExecutor, store: Arc<dyn Store>, playground: bool) -> Router {
    Router::new()
        .route("/", get(root))
        .nest(
            "/graphql",
            graphql_router(GraphQLState::new(executor, store.clone()), playground),
        )
        .nest("/health", health_router(HealthState::new(store)))
}

async fn root() -> &'static str {
    "quill GraphQL API"
}
