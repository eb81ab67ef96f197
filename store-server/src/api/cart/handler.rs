//! Cart API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::cart;
use crate::core::ServerState;
use crate::db::repository;
use crate::orders;
use shared::models::{entry_key, CartItemInput, CartView, OrderDetail};
use shared::{AppError, AppResult, ErrorCode};

/// POST /api/cart - 创建空购物车
pub async fn create(State(state): State<ServerState>) -> Json<serde_json::Value> {
    let cart_id = state.cart.create();
    Json(serde_json::json!({ "cart_id": cart_id }))
}

/// GET /api/cart/{cart_id} - 购物车视图
///
/// 价格和商品名取当前目录值, 不是加入时的值.
pub async fn view(
    State(state): State<ServerState>,
    Path(cart_id): Path<String>,
) -> AppResult<Json<CartView>> {
    ensure_cart(&state, &cart_id)?;
    let view = cart::view(&state.db.pool, &state.cart, &cart_id).await?;
    Ok(Json(view))
}

/// POST /api/cart/{cart_id}/items - 加入商品
///
/// 同一 `(product_id, attributes)` 组合合并数量; 不同属性选择是独立条目.
pub async fn add_item(
    State(state): State<ServerState>,
    Path(cart_id): Path<String>,
    Json(input): Json<CartItemInput>,
) -> AppResult<Json<CartView>> {
    ensure_cart(&state, &cart_id)?;
    if input.quantity <= 0 {
        return Err(AppError::with_message(
            ErrorCode::CartQuantityInvalid,
            "Quantity must be positive",
        ));
    }
    check_quantity_cap(input.quantity)?;
    let product = repository::product::find_by_id(&state.db.pool, input.product_id)
        .await?
        .ok_or_else(|| {
            AppError::with_message(
                ErrorCode::ProductNotFound,
                format!("Product {} not found", input.product_id),
            )
        })?;
    if !product.is_active {
        return Err(AppError::with_message(
            ErrorCode::ProductInactive,
            format!("Product {} is not available", product.id),
        ));
    }

    state.cart.add_item(&cart_id, &input);
    let view = cart::view(&state.db.pool, &state.cart, &cart_id).await?;
    Ok(Json(view))
}

/// PUT /api/cart/{cart_id}/items - 设置条目数量
///
/// 数量为 0 或负数等同删除该条目.
pub async fn set_quantity(
    State(state): State<ServerState>,
    Path(cart_id): Path<String>,
    Json(input): Json<CartItemInput>,
) -> AppResult<Json<CartView>> {
    ensure_cart(&state, &cart_id)?;
    check_quantity_cap(input.quantity)?;
    if !state.cart.set_quantity(&cart_id, &input) {
        return Err(cart_item_not_found(input.product_id));
    }
    let view = cart::view(&state.db.pool, &state.cart, &cart_id).await?;
    Ok(Json(view))
}

/// DELETE /api/cart/{cart_id}/items - 移除一个条目
pub async fn remove_item(
    State(state): State<ServerState>,
    Path(cart_id): Path<String>,
    Json(input): Json<CartItemInput>,
) -> AppResult<Json<CartView>> {
    ensure_cart(&state, &cart_id)?;
    let key = entry_key(input.product_id, &input.attributes);
    if !state.cart.remove(&cart_id, &key) {
        return Err(cart_item_not_found(input.product_id));
    }
    let view = cart::view(&state.db.pool, &state.cart, &cart_id).await?;
    Ok(Json(view))
}

/// DELETE /api/cart/{cart_id}/clear - 清空购物车 (保留 cart_id)
pub async fn clear(
    State(state): State<ServerState>,
    Path(cart_id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    ensure_cart(&state, &cart_id)?;
    state.cart.clear(&cart_id);
    Ok(Json(serde_json::json!({ "cleared": true })))
}

/// DELETE /api/cart/{cart_id} - 删除购物车
pub async fn delete_cart(
    State(state): State<ServerState>,
    Path(cart_id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    if !state.cart.delete(&cart_id) {
        return Err(cart_not_found(&cart_id));
    }
    Ok(Json(serde_json::json!({ "deleted": true })))
}

/// POST /api/cart/{cart_id}/checkout - 结算下单
///
/// 空购物车 (包括所有条目的商品都已下架的情况) 返回 OrderEmpty.
pub async fn checkout(
    State(state): State<ServerState>,
    Path(cart_id): Path<String>,
) -> AppResult<Json<OrderDetail>> {
    ensure_cart(&state, &cart_id)?;
    let settings = repository::settings::get(&state.db.pool).await?;
    let detail =
        orders::checkout(&state.db.pool, &state.cart, &cart_id, &settings.currency).await?;
    Ok(Json(detail))
}

fn check_quantity_cap(quantity: i64) -> Result<(), AppError> {
    if quantity > cart::MAX_QUANTITY {
        return Err(AppError::with_message(
            ErrorCode::CartQuantityInvalid,
            format!("Quantity cannot exceed {}", cart::MAX_QUANTITY),
        ));
    }
    Ok(())
}

fn ensure_cart(state: &ServerState, cart_id: &str) -> Result<(), AppError> {
    if state.cart.exists(cart_id) {
        Ok(())
    } else {
        Err(cart_not_found(cart_id))
    }
}

fn cart_not_found(cart_id: &str) -> AppError {
    AppError::with_message(ErrorCode::CartNotFound, format!("Cart {cart_id} not found"))
}

fn cart_item_not_found(product_id: i64) -> AppError {
    AppError::with_message(
        ErrorCode::CartItemNotFound,
        format!("Product {product_id} is not in the cart"),
    )
}
