//! HTTP 层集成测试
//!
//! 用 tower oneshot 直接驱动路由: 匿名店面流程 + 管理员后台 + 认证边界.

use axum::Router;
use axum::body::Body;
use http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use store_server::api::create_router;
use store_server::core::{Config, ServerState};

async fn app() -> Router {
    let config = Config::with_overrides("/tmp/conch-test", 0);
    let state = ServerState::initialize_in_memory(&config)
        .await
        .expect("state");
    create_router(state)
}

fn req(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(v) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(v.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap_or(Value::Null)
}

/// 以播种的默认管理员登录, 返回 JWT
async fn login(app: &Router) -> String {
    let password = std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "admin".into());
    let response = app
        .clone()
        .oneshot(req(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"username": "admin", "password": password})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    body["token"].as_str().expect("token").to_string()
}

async fn seed_catalog(app: &Router, token: &str) -> i64 {
    let response = app
        .clone()
        .oneshot(req(
            Method::POST,
            "/api/categories",
            Some(token),
            Some(json!({"name": "Drinks"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let category = body_json(response).await;

    let response = app
        .clone()
        .oneshot(req(
            Method::POST,
            "/api/products",
            Some(token),
            Some(json!({
                "name": "Matcha Latte",
                "price": 450,
                "category_id": category["id"],
                "stock_qty": 20
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["id"].as_i64().unwrap()
}

#[tokio::test]
async fn health_is_public() {
    let app = app().await;
    let response = app
        .oneshot(req(Method::GET, "/health", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], true);
}

#[tokio::test]
async fn storefront_reads_need_no_token() {
    let app = app().await;
    let response = app
        .clone()
        .oneshot(req(Method::GET, "/api/products", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(req(Method::GET, "/api/categories", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn catalog_writes_require_admin_token() {
    let app = app().await;

    // No token at all -> 401 from the auth middleware
    let response = app
        .clone()
        .oneshot(req(
            Method::POST,
            "/api/products",
            None,
            Some(json!({"name": "x", "price": 1, "category_id": 1})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Garbage token -> 401 as well
    let response = app
        .oneshot(req(
            Method::POST,
            "/api/products",
            Some("not.a.jwt"),
            Some(json!({"name": "x", "price": 1, "category_id": 1})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn back_office_routes_reject_anonymous() {
    let app = app().await;
    for (method, uri) in [
        (Method::GET, "/api/orders"),
        (Method::PATCH, "/api/inventory"),
        (Method::GET, "/api/settings"),
    ] {
        let response = app
            .clone()
            .oneshot(req(method, uri, None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
    }
}

#[tokio::test]
async fn login_rejects_bad_credentials() {
    let app = app().await;
    let response = app
        .oneshot(req(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"username": "admin", "password": "wrong"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn anonymous_cart_to_checkout_flow() {
    let app = app().await;
    let token = login(&app).await;
    let product_id = seed_catalog(&app, &token).await;

    // Create a cart
    let response = app
        .clone()
        .oneshot(req(Method::POST, "/api/cart", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cart_id = body_json(response).await["cart_id"]
        .as_str()
        .unwrap()
        .to_string();

    // Add the same selection twice: quantities merge
    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(req(
                Method::POST,
                &format!("/api/cart/{cart_id}/items"),
                None,
                Some(json!({"product_id": product_id, "quantity": 1, "attributes": {"size": "L"}})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .clone()
        .oneshot(req(
            Method::GET,
            &format!("/api/cart/{cart_id}"),
            None,
            None,
        ))
        .await
        .unwrap();
    let view = body_json(response).await;
    assert_eq!(view["lines"].as_array().unwrap().len(), 1);
    assert_eq!(view["lines"][0]["quantity"], 2);
    assert_eq!(view["total"], 900);

    // Checkout, also anonymous
    let response = app
        .clone()
        .oneshot(req(
            Method::POST,
            &format!("/api/cart/{cart_id}/checkout"),
            None,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let order = body_json(response).await;
    assert_eq!(order["status"], "PENDING");
    assert_eq!(order["total_amount"], 900);
    assert_eq!(order["currency"], "EUR");
    let order_id = order["id"].as_i64().unwrap();

    // An admin sees the order in the back office
    let response = app
        .clone()
        .oneshot(req(
            Method::GET,
            &format!("/api/orders/{order_id}"),
            Some(&token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // A second checkout on the now-empty cart fails
    let response = app
        .oneshot(req(
            Method::POST,
            &format!("/api/cart/{cart_id}/checkout"),
            None,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn absurd_quantities_are_rejected_and_totals_stay_sane() {
    let app = app().await;
    let token = login(&app).await;
    let product_id = seed_catalog(&app, &token).await;

    let response = app
        .clone()
        .oneshot(req(Method::POST, "/api/cart", None, None))
        .await
        .unwrap();
    let cart_id = body_json(response).await["cart_id"]
        .as_str()
        .unwrap()
        .to_string();

    // Over the per-entry cap -> 400, nothing lands in the cart
    let response = app
        .clone()
        .oneshot(req(
            Method::POST,
            &format!("/api/cart/{cart_id}/items"),
            None,
            Some(json!({"product_id": product_id, "quantity": i64::MAX / 2})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["code"], 5003);

    // Setting an existing entry past the cap is rejected the same way
    app.clone()
        .oneshot(req(
            Method::POST,
            &format!("/api/cart/{cart_id}/items"),
            None,
            Some(json!({"product_id": product_id, "quantity": 1})),
        ))
        .await
        .unwrap();
    let response = app
        .clone()
        .oneshot(req(
            Method::PUT,
            &format!("/api/cart/{cart_id}/items"),
            None,
            Some(json!({"product_id": product_id, "quantity": i64::MAX / 2})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // The cart still materializes with the original quantity
    let response = app
        .oneshot(req(
            Method::GET,
            &format!("/api/cart/{cart_id}"),
            None,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let view = body_json(response).await;
    assert_eq!(view["lines"][0]["quantity"], 1);
    assert_eq!(view["total"], 450);
}

#[tokio::test]
async fn unknown_cart_is_404() {
    let app = app().await;
    let response = app
        .oneshot(req(Method::GET, "/api/cart/does-not-exist", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_order_transition_maps_to_400() {
    let app = app().await;
    let token = login(&app).await;
    let product_id = seed_catalog(&app, &token).await;

    let response = app
        .clone()
        .oneshot(req(Method::POST, "/api/cart", None, None))
        .await
        .unwrap();
    let cart_id = body_json(response).await["cart_id"]
        .as_str()
        .unwrap()
        .to_string();
    app.clone()
        .oneshot(req(
            Method::POST,
            &format!("/api/cart/{cart_id}/items"),
            None,
            Some(json!({"product_id": product_id, "quantity": 1})),
        ))
        .await
        .unwrap();
    let response = app
        .clone()
        .oneshot(req(
            Method::POST,
            &format!("/api/cart/{cart_id}/checkout"),
            None,
            None,
        ))
        .await
        .unwrap();
    let order_id = body_json(response).await["id"].as_i64().unwrap();

    // PENDING -> DELIVERED is not in the transition table
    let response = app
        .oneshot(req(
            Method::PATCH,
            &format!("/api/orders/{order_id}"),
            Some(&token),
            Some(json!({"status": "DELIVERED"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["code"], 4002);
}
