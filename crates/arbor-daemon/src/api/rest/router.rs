//! API router configuration

use super::handlers;
use super::state::AppState;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Health
        .route("/health", get(handlers::health_check))
        // App deployments
        .route(
            "/app-deployments",
            post(handlers::create_app_deployment),
        )
        .route(
            "/app-deployments/documents",
            post(handlers::add_documents_to_app_deployment),
        )
        .route(
            "/app-deployments/activate",
            post(handlers::activate_app_deployment),
        )
        .route(
            "/app-deployments/retire",
            post(handlers::retire_app_deployment),
        )
        .route(
            "/app-deployments/:name/:version/status",
            get(handlers::get_app_deployment_status),
        )
        // Target lookup
        .route(
            "/targets/:target/app-deployment",
            get(handlers::get_app_deployment_for_target),
        );

    Router::new()
        .nest("/api/v1", api_routes)
        // Persisted-document resolution, GraphQL-over-HTTP and REST-style
        .route("/graphql", post(handlers::resolve_document_id))
        .route(
            "/graphql/:client_name/:client_version/:hash",
            post(handlers::resolve_document_path),
        )
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbor_registry::{AppDeploymentManager, InMemoryAppDeploymentStore};
    use arbor_resolver::{PersistedDocuments, PersistedDocumentsConfig, CDN_ACCESS_KEY_HEADER};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::util::ServiceExt;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn router_with_resolver(config: PersistedDocumentsConfig) -> Router {
        let manager = Arc::new(AppDeploymentManager::new(Arc::new(
            InMemoryAppDeploymentStore::new(),
        )));
        let resolver = Arc::new(PersistedDocuments::new(config).unwrap());
        create_router(AppState::new(manager, resolver))
    }

    fn router() -> Router {
        router_with_resolver(PersistedDocumentsConfig::default())
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_reports_resolver_disabled() {
        let response = router().oneshot(get_req("/api/v1/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["persisted_documents_enabled"], json!(false));
    }

    #[tokio::test]
    async fn test_full_lifecycle_over_http() {
        let app = router();

        let create = json!({"target": "staging", "app_name": "app", "app_version": "1.0.0"});
        let response = app
            .clone()
            .oneshot(post_json("/api/v1/app-deployments", create))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let add = json!({
            "app_name": "app",
            "app_version": "1.0.0",
            "documents": ["query { hi }"]
        });
        let response = app
            .clone()
            .oneshot(post_json("/api/v1/app-deployments/documents", add))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let activate = json!({"app_name": "app", "app_version": "1.0.0"});
        let response = app
            .clone()
            .oneshot(post_json("/api/v1/app-deployments/activate", activate))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["state"], json!("active"));

        let retire = json!({
            "target_id": "staging",
            "app_name": "app",
            "app_version": "1.0.0"
        });
        let response = app
            .clone()
            .oneshot(post_json("/api/v1/app-deployments/retire", retire))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .clone()
            .oneshot(get_req("/api/v1/app-deployments/app/1.0.0/status"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["state"], json!("retired"));
        assert_eq!(body["document_count"], json!(1));
    }

    #[tokio::test]
    async fn test_duplicate_create_maps_to_conflict() {
        let app = router();
        let create = json!({"target": "staging", "app_name": "app", "app_version": "1.0.0"});

        app.clone()
            .oneshot(post_json("/api/v1/app-deployments", create.clone()))
            .await
            .unwrap();
        let response = app
            .oneshot(post_json("/api/v1/app-deployments", create))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let body = body_json(response).await;
        assert!(body["message"].as_str().unwrap().contains("app@1.0.0"));
    }

    #[tokio::test]
    async fn test_status_of_unknown_deployment_is_404() {
        let response = router()
            .oneshot(get_req("/api/v1/app-deployments/ghost/1.0.0/status"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_target_lookup_by_query() {
        let app = router();
        let create = json!({"target": "staging", "app_name": "app", "app_version": "1.0.0"});
        app.clone()
            .oneshot(post_json("/api/v1/app-deployments", create))
            .await
            .unwrap();

        let response = app
            .clone()
            .oneshot(get_req(
                "/api/v1/targets/staging/app-deployment?name=app&version=1.0.0",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(get_req("/api/v1/targets/other/app-deployment?name=app"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_resolution_by_document_id() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/client-name/client-version/hash"))
            .and(header(CDN_ACCESS_KEY_HEADER, "foo"))
            .respond_with(ResponseTemplate::new(200).set_body_string("query { hi }"))
            .expect(1)
            .mount(&server)
            .await;

        let app = router_with_resolver(PersistedDocumentsConfig {
            endpoint: server.uri(),
            access_key: "foo".into(),
            enabled: true,
            ..PersistedDocumentsConfig::default()
        });

        let response = app
            .oneshot(post_json(
                "/graphql",
                json!({"documentId": "client-name/client-version/hash"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["document"], json!("query { hi }"));
    }

    #[tokio::test]
    async fn test_resolution_by_rest_path() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/client-name/client-version/hash"))
            .respond_with(ResponseTemplate::new(200).set_body_string("query { hi }"))
            .mount(&server)
            .await;

        let app = router_with_resolver(PersistedDocumentsConfig {
            endpoint: server.uri(),
            access_key: "foo".into(),
            enabled: true,
            ..PersistedDocumentsConfig::default()
        });

        let response = app
            .oneshot(post_json(
                "/graphql/client-name/client-version/hash",
                json!({}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_document_maps_to_404() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let app = router_with_resolver(PersistedDocumentsConfig {
            endpoint: server.uri(),
            access_key: "foo".into(),
            enabled: true,
            ..PersistedDocumentsConfig::default()
        });

        let response = app
            .oneshot(post_json("/graphql", json!({"documentId": "unknown"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_upstream_failure_maps_to_503() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let app = router_with_resolver(PersistedDocumentsConfig {
            endpoint: server.uri(),
            access_key: "foo".into(),
            enabled: true,
            ..PersistedDocumentsConfig::default()
        });

        let response = app
            .oneshot(post_json("/graphql", json!({"documentId": "hash"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_disabled_resolution_is_404_without_fetch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("query { hi }"))
            .expect(0)
            .mount(&server)
            .await;

        let app = router_with_resolver(PersistedDocumentsConfig {
            endpoint: server.uri(),
            access_key: "foo".into(),
            enabled: false,
            ..PersistedDocumentsConfig::default()
        });

        let response = app
            .oneshot(post_json(
                "/graphql",
                json!({"documentId": "client-name/client-version/hash"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        server.verify().await;
    }

    #[tokio::test]
    async fn test_missing_document_id_is_400() {
        let response = router()
            .oneshot(post_json("/graphql", json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
