//! Inventory API 模块 (后台, 管理员专用)

mod handler;

use axum::{
    Router,
    middleware,
    routing::{get, patch},
};

use crate::auth::require_admin;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/inventory", patch(handler::bulk_update))
        .route("/api/inventory/low-stock", get(handler::low_stock))
        .route_layer(middleware::from_fn(require_admin))
}
