//! Settings API Handlers

use axum::{Json, extract::State};

use crate::core::ServerState;
use crate::db::repository;
use shared::models::{SettingsUpdate, StoreSettings};
use shared::{AppError, AppResult};
use validator::Validate;

/// GET /api/settings - 店铺设置
pub async fn get(State(state): State<ServerState>) -> AppResult<Json<StoreSettings>> {
    let settings = repository::settings::get(&state.db.pool).await?;
    Ok(Json(settings))
}

/// PUT /api/settings - 更新店铺设置
///
/// 货币只影响之后创建的订单, 已有订单保留下单时的货币.
pub async fn update(
    State(state): State<ServerState>,
    Json(payload): Json<SettingsUpdate>,
) -> AppResult<Json<StoreSettings>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;
    let settings = repository::settings::update(&state.db.pool, &payload).await?;
    Ok(Json(settings))
}
