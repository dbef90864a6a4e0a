use std::time::Duration;

use axum::{
    http::{header, HeaderName, Method, StatusCode},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::{
    handlers::{
        health::{healthz, livez},
        identity::{
            confirm_email, confirm_phone_number, forgot_password, register, reset_password,
        },
        products::{
            create_product, delete_product, get_product, list_products, search_products,
            update_product,
        },
    },
    state::AppState,
};

/// Create the application router with all routes and middleware.
pub fn create_app(state: AppState) -> Router {
    // CORS configuration for API endpoints
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static("x-tenant-id"),
        ]);

    // API routes with CORS
    let api_routes = Router::new()
        // Product routes
        .route("/products", get(list_products).post(create_product))
        .route("/products/search", get(search_products))
        .route(
            "/products/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        // Identity routes
        .route("/identity/register", post(register))
        .route("/identity/confirm-email", get(confirm_email))
        .route("/identity/confirm-phone-number", get(confirm_phone_number))
        .route("/identity/forgot-password", post(forgot_password))
        .route("/identity/reset-password", post(reset_password))
        .layer(cors);

    // Main application router
    Router::new()
        .route("/livez", get(livez))
        .route("/healthz", get(healthz))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(10),
        ))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn get_request(uri: &str, tenant: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header("x-tenant-id", tenant)
            .body(Body::empty())
            .unwrap()
    }

    fn json_request(method: &str, uri: &str, tenant: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("x-tenant-id", tenant)
            .header("Content-Type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    async fn create_widget(app: &Router, tenant: &str, name: &str, rate: f64) -> String {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/products",
                tenant,
                serde_json::json!({ "name": name, "description": "desc", "rate": rate }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let product = body_json(response).await;
        product["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_livez() {
        let app = create_app(AppState::for_tests().await);

        let response = app
            .oneshot(Request::builder().uri("/livez").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_healthz_reports_ok() {
        let app = create_app(AppState::for_tests().await);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/healthz")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_missing_tenant_header_is_rejected() {
        let app = create_app(AppState::for_tests().await);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/products")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_and_get_product() {
        let app = create_app(AppState::for_tests().await);

        let id = create_widget(&app, "acme", "Widget", 9.99).await;

        let response = app
            .oneshot(get_request(&format!("/api/products/{id}"), "acme"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let product = body_json(response).await;
        assert_eq!(product["name"], "Widget");
        assert_eq!(product["rate"], 9.99);
    }

    #[tokio::test]
    async fn test_get_nonexistent_product() {
        let app = create_app(AppState::for_tests().await);

        let response = app
            .oneshot(get_request(
                "/api/products/00000000-0000-0000-0000-000000000000",
                "acme",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_get_product_from_other_tenant_is_not_found() {
        let app = create_app(AppState::for_tests().await);

        let id = create_widget(&app, "acme", "Widget", 9.99).await;

        let response = app
            .oneshot(get_request(&format!("/api/products/{id}"), "globex"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_list_is_tenant_scoped() {
        let app = create_app(AppState::for_tests().await);

        create_widget(&app, "acme", "Widget", 9.99).await;
        create_widget(&app, "acme", "Gadget", 19.99).await;
        create_widget(&app, "globex", "Gizmo", 5.0).await;

        let response = app
            .oneshot(get_request("/api/products", "acme"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let products = body_json(response).await;
        assert_eq!(products.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_list_supports_paging() {
        let app = create_app(AppState::for_tests().await);

        for i in 0..5 {
            create_widget(&app, "acme", &format!("p{i}"), 1.0).await;
        }

        let response = app
            .oneshot(get_request(
                "/api/products?page_number=2&page_size=2",
                "acme",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let products = body_json(response).await;
        let names: Vec<&str> = products
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, ["p2", "p3"]);
    }

    #[tokio::test]
    async fn test_paging_windows_are_tenant_scoped() {
        let app = create_app(AppState::for_tests().await);

        // Another tenant's rows come first in insertion order; they must
        // not eat into acme's page window.
        for i in 0..3 {
            create_widget(&app, "globex", &format!("g{i}"), 1.0).await;
        }
        for i in 0..3 {
            create_widget(&app, "acme", &format!("a{i}"), 1.0).await;
        }

        let response = app
            .oneshot(get_request(
                "/api/products?page_number=1&page_size=3",
                "acme",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let products = body_json(response).await;
        let names: Vec<&str> = products
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, ["a0", "a1", "a2"]);
    }

    #[tokio::test]
    async fn test_search_filters_by_rate() {
        let app = create_app(AppState::for_tests().await);

        create_widget(&app, "acme", "Cheap", 1.0).await;
        create_widget(&app, "acme", "Pricey", 50.0).await;
        create_widget(&app, "globex", "Luxe", 100.0).await;

        let response = app
            .oneshot(get_request("/api/products/search?min_rate=10", "acme"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let products = body_json(response).await;
        let names: Vec<&str> = products
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, ["Pricey"]);
    }

    #[tokio::test]
    async fn test_update_product() {
        let app = create_app(AppState::for_tests().await);

        let id = create_widget(&app, "acme", "Widget", 9.99).await;

        let response = app
            .clone()
            .oneshot(json_request(
                "PUT",
                &format!("/api/products/{id}"),
                "acme",
                serde_json::json!({ "name": "Widget v2" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(get_request(&format!("/api/products/{id}"), "acme"))
            .await
            .unwrap();
        let product = body_json(response).await;
        assert_eq!(product["name"], "Widget v2");
        assert_eq!(product["rate"], 9.99);
    }

    #[tokio::test]
    async fn test_delete_product() {
        let app = create_app(AppState::for_tests().await);

        let id = create_widget(&app, "acme", "Widget", 9.99).await;

        // Warm the DTO cache first so the delete has an entry to evict.
        let response = app
            .clone()
            .oneshot(get_request(&format!("/api/products/{id}"), "acme"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/api/products/{id}"))
                    .header("x-tenant-id", "acme")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(get_request(&format!("/api/products/{id}"), "acme"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_register_user() {
        let app = create_app(AppState::for_tests().await);

        let response = app
            .oneshot(json_request(
                "POST",
                "/api/identity/register",
                "acme",
                serde_json::json!({
                    "username": "jdoe",
                    "first_name": "Jane",
                    "last_name": "Doe",
                    "email": "jane@acme.example",
                    "password": "hunter22"
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let outcome = body_json(response).await;
        assert!(outcome["user_id"].as_str().is_some());
        assert!(!outcome["messages"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_register_duplicate_username_conflicts() {
        let app = create_app(AppState::for_tests().await);

        let body = serde_json::json!({
            "username": "jdoe",
            "first_name": "Jane",
            "last_name": "Doe",
            "email": "jane@acme.example",
            "password": "hunter22"
        });

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/identity/register",
                "acme",
                body.clone(),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let mut dup = body;
        dup["email"] = serde_json::json!("other@acme.example");
        let response = app
            .oneshot(json_request("POST", "/api/identity/register", "acme", dup))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_forgot_password_unknown_email_is_opaque() {
        let app = create_app(AppState::for_tests().await);

        let response = app
            .oneshot(json_request(
                "POST",
                "/api/identity/forgot-password",
                "acme",
                serde_json::json!({ "email": "nobody@acme.example" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let message = String::from_utf8(body.to_vec()).unwrap();
        assert!(!message.contains("nobody@acme.example"));
    }
}
