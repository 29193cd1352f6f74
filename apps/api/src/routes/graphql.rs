//! GraphQL HTTP endpoint

use std::sync::Arc;

use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
    extract::State,
    response::{Html, IntoResponse},
    routing::{get, post},
    Router,
};

use crate::graphql::GraphQLExecutor;
use crate::store::Store;

/// Shared state for the GraphQL handlers
#[derive(Clone)]
pub struct GraphQLState {
    pub executor: GraphQLExecutor,
    pub store: Arc<dyn Store>,
}

impl GraphQLState {
    pub fn new(executor: GraphQLExecutor, store: Arc<dyn Store>) -> Self {
        Self { executor, store }
    }
}

/// Create the GraphQL router; the playground route exists only when enabled
pub fn graphql_router(state: GraphQLState, playground: bool) -> Router {
    let mut router = Router::new().route("/", post(graphql_handler));
    if playground {
        router = router.route("/playground", get(graphql_playground));
    }
    router.with_state(state)
}

/// Execute a `{ query, variables, operationName }` body
async fn graphql_handler(
    State(state): State<GraphQLState>,
    req: GraphQLRequest,
) -> GraphQLResponse {
    state
        .executor
        .resolve(req.into_inner(), state.store.clone())
        .await
        .into()
}

/// GraphQL Playground handler for development
async fn graphql_playground() -> impl IntoResponse {
    Html(async_graphql::http::playground_source(
        async_graphql::http::GraphQLPlaygroundConfig::new("/graphql"),
    ))
}
