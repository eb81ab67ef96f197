//! Inventory API Handlers

use axum::{Json, extract::State};

use crate::core::ServerState;
use crate::db::repository::{self, RepoError};
use shared::models::{BulkStockUpdate, Product};
use shared::{AppError, AppResult, ErrorCode};

/// PATCH /api/inventory - 批量库存调整
///
/// 全部成功或全部失败: 任何一条指向不存在的商品或负库存, 整批回滚.
pub async fn bulk_update(
    State(state): State<ServerState>,
    Json(payload): Json<BulkStockUpdate>,
) -> AppResult<Json<serde_json::Value>> {
    if payload.updates.is_empty() {
        return Err(AppError::validation("No stock updates provided"));
    }
    let updated = repository::product::bulk_update(&state.db.pool, &payload.updates)
        .await
        .map_err(|e| match e {
            RepoError::Validation(msg) => {
                AppError::with_message(ErrorCode::StockInvalid, msg)
            }
            RepoError::NotFound(msg) => {
                AppError::with_message(ErrorCode::ProductNotFound, msg)
            }
            other => other.into(),
        })?;
    Ok(Json(serde_json::json!({ "updated": updated })))
}

/// GET /api/inventory/low-stock - 库存低于阈值的激活商品
pub async fn low_stock(State(state): State<ServerState>) -> AppResult<Json<Vec<Product>>> {
    let products = repository::product::find_low_stock(&state.db.pool).await?;
    Ok(Json(products))
}
