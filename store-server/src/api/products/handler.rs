//! Product API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use validator::Validate;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository;
use shared::models::{Product, ProductCreate, ProductUpdate};
use shared::{AppError, AppResult, ErrorCode};

/// GET /api/products - 商品列表
///
/// 匿名访问只返回激活商品; 管理员看到全部.
pub async fn list(
    State(state): State<ServerState>,
    user: Option<CurrentUser>,
) -> AppResult<Json<Vec<Product>>> {
    let is_admin = user.map(|u| u.is_admin()).unwrap_or(false);
    let products = if is_admin {
        repository::product::find_all_admin(&state.db.pool).await?
    } else {
        repository::product::find_all(&state.db.pool).await?
    };
    Ok(Json(products))
}

/// GET /api/products/by-category/{category_id} - 按分类获取商品
pub async fn list_by_category(
    State(state): State<ServerState>,
    Path(category_id): Path<i64>,
) -> AppResult<Json<Vec<Product>>> {
    let products = repository::product::find_by_category(&state.db.pool, category_id).await?;
    Ok(Json(products))
}

/// GET /api/products/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Product>> {
    let product = repository::product::find_by_id(&state.db.pool, id)
        .await?
        .ok_or_else(|| product_not_found(id))?;
    Ok(Json(product))
}

/// POST /api/products - 创建商品 (管理员)
pub async fn create(
    user: CurrentUser,
    State(state): State<ServerState>,
    Json(payload): Json<ProductCreate>,
) -> AppResult<Json<Product>> {
    require_admin(&user)?;
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;
    if payload.name.trim().is_empty() {
        return Err(AppError::validation("Product name cannot be empty"));
    }
    if payload.price < 0 {
        return Err(AppError::with_message(
            ErrorCode::ProductInvalidPrice,
            "Price cannot be negative",
        ));
    }
    repository::category::find_by_id(&state.db.pool, payload.category_id)
        .await?
        .ok_or_else(|| {
            AppError::with_message(
                ErrorCode::CategoryNotFound,
                format!("Category {} not found", payload.category_id),
            )
        })?;

    let product = repository::product::create(&state.db.pool, payload).await?;
    Ok(Json(product))
}

/// PUT /api/products/{id} - 更新商品 (管理员)
pub async fn update(
    user: CurrentUser,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<ProductUpdate>,
) -> AppResult<Json<Product>> {
    require_admin(&user)?;
    if matches!(payload.price, Some(p) if p < 0) {
        return Err(AppError::with_message(
            ErrorCode::ProductInvalidPrice,
            "Price cannot be negative",
        ));
    }
    if let Some(category_id) = payload.category_id {
        repository::category::find_by_id(&state.db.pool, category_id)
            .await?
            .ok_or_else(|| {
                AppError::with_message(
                    ErrorCode::CategoryNotFound,
                    format!("Category {category_id} not found"),
                )
            })?;
    }
    let product = repository::product::update(&state.db.pool, id, payload)
        .await
        .map_err(|e| match e {
            repository::RepoError::NotFound(_) => product_not_found(id),
            other => other.into(),
        })?;
    Ok(Json(product))
}

/// DELETE /api/products/{id} - 下架商品 (管理员)
///
/// 软删除: 商品从店面消失, 历史订单的快照不受影响.
pub async fn delete(
    user: CurrentUser,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<serde_json::Value>> {
    require_admin(&user)?;
    let deleted = repository::product::delete(&state.db.pool, id).await?;
    if !deleted {
        return Err(product_not_found(id));
    }
    Ok(Json(serde_json::json!({ "deleted": true })))
}

fn product_not_found(id: i64) -> AppError {
    AppError::with_message(ErrorCode::ProductNotFound, format!("Product {id} not found"))
}

fn require_admin(user: &CurrentUser) -> Result<(), AppError> {
    if user.is_admin() {
        Ok(())
    } else {
        Err(AppError::new(ErrorCode::AdminRequired))
    }
}
