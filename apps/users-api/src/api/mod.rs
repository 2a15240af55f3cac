//! API routes module
//!
//! This module defines all HTTP API routes for the users service.

pub mod health;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Create all API routes
/// Note: These are nested under /api by axum_helpers::create_router
pub fn routes(state: &AppState) -> Router {
    Router::new()
        .nest("/users", users::router(state))
        .merge(health::router(state.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, Environment, UsersConfig};
    use crate::openapi::ApiDoc;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum_helpers::{create_router, health_router};
    use core_config::{app_info, server::ServerConfig};
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    fn unavailable_app() -> Router {
        let state = AppState {
            config: Config {
                app: app_info!(),
                mongodb: Err("MONGO_URI is not set".into()),
                server: ServerConfig::default(),
                users: UsersConfig::default(),
                environment: Environment::Development,
            },
            mongo: Err("MONGO_URI is not set".into()),
        };

        create_router::<ApiDoc>(routes(&state))
            .unwrap()
            .merge(health_router(state.config.app))
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn test_users_route_reports_store_error() {
        let (status, body) = get(unavailable_app(), "/api/users").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "MONGO_URI is not set");
    }

    #[tokio::test]
    async fn test_ready_is_503_without_store() {
        let (status, body) = get(unavailable_app(), "/api/ready").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "not ready");
        assert_eq!(body["mongodb"], "disconnected");
    }

    #[tokio::test]
    async fn test_health_and_docs_are_served() {
        let (status, body) = get(unavailable_app(), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "users_api");

        let (status, doc) = get(unavailable_app(), "/api-docs/openapi.json").await;
        assert_eq!(status, StatusCode::OK);
        assert!(doc["paths"]["/api/users"].is_object());
        assert!(doc["paths"]["/api/users/{id}"].is_object());
    }

    #[tokio::test]
    async fn test_unknown_route_is_404_json() {
        let (status, body) = get(unavailable_app(), "/api/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].is_string());
    }
}
