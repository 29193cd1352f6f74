//! Test helper functions for API integration tests

#![allow(dead_code)]

use std::sync::Arc;

use async_graphql::{Request, Response, ServerError, Value, Variables};

use quill_api::graphql::build_executor;
use quill_api::{GraphQLExecutor, MemoryStore};

/// Executor with the production defaults (depth 5, 1ms batching window)
pub fn executor() -> GraphQLExecutor {
    build_executor()
}

/// Execute `query` against `store` through the full request path
pub async fn execute(store: &Arc<MemoryStore>, query: &str) -> Response {
    executor().resolve(Request::new(query), store.clone()).await
}

pub async fn execute_with_variables(
    store: &Arc<MemoryStore>,
    query: &str,
    variables: serde_json::Value,
) -> Response {
    let request = Request::new(query).variables(Variables::from_json(variables));
    executor().resolve(request, store.clone()).await
}

/// The response's `data` as JSON
pub fn data(response: &Response) -> serde_json::Value {
    response
        .data
        .clone()
        .into_json()
        .expect("data serializes to JSON")
}

/// `extensions.code` of an error, if present
pub fn error_code(error: &ServerError) -> Option<String> {
    match error.extensions.as_ref()?.get("code")? {
        Value::String(code) => Some(code.clone()),
        _ => None,
    }
}

/// Fail with the response errors when there are any
pub fn assert_no_errors(response: &Response) {
    assert!(
        response.errors.is_empty(),
        "unexpected errors: {:?}",
        response.errors
    );
}

/// Sort keys so batch calls can be compared regardless of order
pub fn sorted(mut keys: Vec<String>) -> Vec<String> {
    keys.sort();
    keys
}
