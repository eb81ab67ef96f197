//! Cart API 模块
//!
//! 全部匿名访问. cart_id 是服务器生成的不透明句柄, 客户端自行保存.

mod handler;

use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/cart", cart_routes())
}

fn cart_routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::create))
        .route("/{cart_id}", get(handler::view).delete(handler::delete_cart))
        .route(
            "/{cart_id}/items",
            post(handler::add_item)
                .put(handler::set_quantity)
                .delete(handler::remove_item),
        )
        .route("/{cart_id}/clear", delete(handler::clear))
        .route("/{cart_id}/checkout", post(handler::checkout))
}
