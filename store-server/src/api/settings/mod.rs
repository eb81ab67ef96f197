//! Settings API 模块 (后台, 管理员专用)

mod handler;

use axum::{
    Router,
    middleware,
    routing::get,
};

use crate::auth::require_admin;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/settings", get(handler::get).put(handler::update))
        .route_layer(middleware::from_fn(require_admin))
}
