//! Cross-origin policy for browser GraphQL clients

use axum::http::{header, HeaderValue, Method};
use tower_http::cors::CorsLayer;

use crate::config::Config;

/// Origins listed in `CORS_ORIGINS` may `POST /graphql` and `GET` the
/// playground and health routes. With no list, development accepts any origin;
/// every other environment accepts none. A list with no parseable origin
/// accepts none as well.
pub fn cors_layer(config: &Config) -> CorsLayer {
    let configured = config
        .cors_allowed_origins
        .as_ref()
        .is_some_and(|origins| !origins.is_empty());

    let origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .iter()
        .flatten()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        if !configured && config.environment().is_development() {
            tracing::warn!("CORS_ORIGINS unset; accepting any origin in development");
            return CorsLayer::permissive();
        }
        tracing::warn!("No usable CORS_ORIGINS; cross-origin requests will be rejected");
        return CorsLayer::new();
    }

    tracing::info!(count = origins.len(), "CORS allow-list configured");
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, routing::get, Router};
    use quill_shared_config::{CommonConfig, DatabaseConfig, Environment};
    use tower::ServiceExt;

    use crate::config::{GraphQLConfig, StoreBackend};

    fn config(environment: Environment, origins: Option<Vec<&str>>) -> Config {
        Config {
            common: CommonConfig {
                database: DatabaseConfig::default(),
                environment,
                log_level: None,
            },
            port: 8080,
            store_backend: StoreBackend::Memory,
            graphql: GraphQLConfig::default(),
            cors_allowed_origins: origins
                .map(|list| list.into_iter().map(str::to_string).collect()),
        }
    }

    /// `Access-Control-Allow-Origin` returned for a request from `origin`
    async fn allowed_origin(config: &Config, origin: &str) -> Option<String> {
        let app = Router::new()
            .route("/health", get(|| async { "OK" }))
            .layer(cors_layer(config));
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header(header::ORIGIN, origin)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .map(|value| value.to_str().unwrap().to_string())
    }

    #[tokio::test]
    async fn test_allow_list_admits_only_listed_origins() {
        let config = config(Environment::Production, Some(vec!["https://app.quill.dev"]));

        assert_eq!(
            allowed_origin(&config, "https://app.quill.dev").await.as_deref(),
            Some("https://app.quill.dev")
        );
        assert_eq!(allowed_origin(&config, "https://evil.example").await, None);
    }

    #[tokio::test]
    async fn test_development_without_list_is_permissive() {
        let config = config(Environment::Development, None);

        assert_eq!(
            allowed_origin(&config, "http://localhost:3000").await.as_deref(),
            Some("*")
        );
    }

    #[tokio::test]
    async fn test_production_without_list_rejects_cross_origin() {
        let config = config(Environment::Production, None);

        assert_eq!(allowed_origin(&config, "http://localhost:3000").await, None);
    }
}
