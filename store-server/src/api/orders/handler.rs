//! Order API Handlers
//!
//! 状态变更全部委托给 `crate::orders` 的生命周期管理器.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::core::ServerState;
use crate::db::repository;
use crate::orders;
use shared::models::{Order, OrderDetail, OrderStatus};
use shared::{AppError, AppResult, ErrorCode};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /api/orders - 订单列表 (最新优先)
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Order>>> {
    let limit = query.limit.unwrap_or(50).clamp(1, 200);
    let offset = query.offset.unwrap_or(0).max(0);
    let orders = repository::order::find_all(&state.db.pool, limit, offset).await?;
    Ok(Json(orders))
}

/// GET /api/orders/{id} - 订单详情 (含行项目)
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<OrderDetail>> {
    let detail = repository::order::find_detail(&state.db.pool, id)
        .await?
        .ok_or_else(|| {
            AppError::with_message(ErrorCode::OrderNotFound, format!("Order {id} not found"))
        })?;
    Ok(Json(detail))
}

#[derive(Debug, Deserialize)]
pub struct TransitionRequest {
    pub status: OrderStatus,
    pub notes: Option<String>,
}

/// PATCH /api/orders/{id} - 状态转移
///
/// 转移到 CANCELLED 会在同一事务内把行项目数量加回库存.
pub async fn transition(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(req): Json<TransitionRequest>,
) -> AppResult<Json<OrderDetail>> {
    let detail =
        orders::transition(&state.db.pool, id, req.status, req.notes.as_deref()).await?;
    Ok(Json(detail))
}

#[derive(Debug, Deserialize, Default)]
pub struct CancelRequest {
    pub notes: Option<String>,
}

/// DELETE /api/orders/{id} - 取消订单
///
/// 只有 PENDING / CONFIRMED 的订单能走这条路; 更晚阶段的取消用
/// PATCH status 显式转移.
pub async fn cancel(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    body: Option<Json<CancelRequest>>,
) -> AppResult<Json<OrderDetail>> {
    let note = body.as_ref().and_then(|b| b.notes.clone());
    let detail = orders::cancel(&state.db.pool, id, note.as_deref()).await?;
    Ok(Json(detail))
}
