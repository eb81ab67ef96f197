//! Order API 模块 (后台, 管理员专用)

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
        .nest("/api/orders", order_routes())
        .route_layer(middleware::from_fn(require_admin))
}

fn order_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list))
        .route(
            "/{id}",
            get(handler::get_by_id)
                .patch(handler::transition)
                .delete(handler::cancel),
        )
}
