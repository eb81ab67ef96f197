//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`auth`] - 认证相关接口
//! - [`categories`] - 分类接口 (公共读 + 管理员写)
//! - [`products`] - 商品接口 (公共读 + 管理员写)
//! - [`cart`] - 购物车接口 (匿名)
//! - [`orders`] - 订单管理接口 (管理员)
//! - [`inventory`] - 库存管理接口 (管理员)
//! - [`settings`] - 店铺设置接口 (管理员)

pub mod auth;
pub mod cart;
pub mod categories;
pub mod health;
pub mod inventory;
pub mod orders;
pub mod products;
pub mod settings;

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::core::ServerState;

/// HTTP 请求日志中间件
async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    let status = response.status();
    tracing::info!(target: "http_access", "{} {} {}", method, uri, status);

    response
}

/// Build the Axum router (without state)
pub fn build_app() -> Router<ServerState> {
    Router::<ServerState>::new()
        .merge(health::router())
        .merge(auth::router())
        // Storefront APIs
        .merge(categories::router())
        .merge(products::router())
        .merge(cart::router())
        // Back-office APIs
        .merge(orders::router())
        .merge(inventory::router())
        .merge(settings::router())
}

/// Build the full application with middleware and state
pub fn create_router(state: ServerState) -> Router {
    build_app()
        // JWT 认证中间件 - require_auth 内部会跳过公共路由
        .layer(middleware::from_fn_with_state(
            state.clone(),
            crate::auth::require_auth,
        ))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(middleware::from_fn(log_request))
}
