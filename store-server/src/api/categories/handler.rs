//! Category API Handlers
//!
//! 公共读 (店面) + 管理员写 (后台). 写操作在处理函数内检查管理员角色,
//! 读操作对匿名用户只返回激活的分类.

use axum::{
    Json,
    extract::{Path, State},
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository;
use shared::models::{Category, CategoryCreate, CategoryUpdate};
use shared::{AppError, AppResult, ErrorCode};
use validator::Validate;

/// GET /api/categories - 分类列表
///
/// 匿名访问返回激活分类; 管理员看到全部 (含停用).
pub async fn list(
    State(state): State<ServerState>,
    user: Option<CurrentUser>,
) -> AppResult<Json<Vec<Category>>> {
    let is_admin = user.map(|u| u.is_admin()).unwrap_or(false);
    let categories = if is_admin {
        repository::category::find_all_admin(&state.db.pool).await?
    } else {
        repository::category::find_all(&state.db.pool).await?
    };
    Ok(Json(categories))
}

/// GET /api/categories/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Category>> {
    let category = repository::category::find_by_id(&state.db.pool, id)
        .await?
        .ok_or_else(|| {
            AppError::with_message(ErrorCode::CategoryNotFound, format!("Category {id} not found"))
        })?;
    Ok(Json(category))
}

/// POST /api/categories - 创建分类 (管理员)
pub async fn create(
    user: CurrentUser,
    State(state): State<ServerState>,
    Json(payload): Json<CategoryCreate>,
) -> AppResult<Json<Category>> {
    require_admin(&user)?;
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;
    if payload.name.trim().is_empty() {
        return Err(AppError::validation("Category name cannot be empty"));
    }
    let category = repository::category::create(&state.db.pool, payload)
        .await
        .map_err(|e| match e {
            repository::RepoError::Duplicate(_) => AppError::with_message(
                ErrorCode::CategoryNameExists,
                "A category with this name already exists",
            ),
            other => other.into(),
        })?;
    Ok(Json(category))
}

/// PUT /api/categories/{id} - 更新分类 (管理员)
pub async fn update(
    user: CurrentUser,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<CategoryUpdate>,
) -> AppResult<Json<Category>> {
    require_admin(&user)?;
    let category = repository::category::update(&state.db.pool, id, payload)
        .await
        .map_err(|e| match e {
            repository::RepoError::NotFound(_) => AppError::with_message(
                ErrorCode::CategoryNotFound,
                format!("Category {id} not found"),
            ),
            repository::RepoError::Duplicate(_) => AppError::with_message(
                ErrorCode::CategoryNameExists,
                "A category with this name already exists",
            ),
            other => other.into(),
        })?;
    Ok(Json(category))
}

/// DELETE /api/categories/{id} - 停用分类 (管理员)
///
/// 仍挂有激活商品的分类不能停用.
pub async fn delete(
    user: CurrentUser,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<serde_json::Value>> {
    require_admin(&user)?;
    let count = repository::category::product_count(&state.db.pool, id).await?;
    if count > 0 {
        return Err(AppError::with_message(
            ErrorCode::CategoryHasProducts,
            format!("Category still has {count} active product(s)"),
        )
        .with_detail("product_count", count));
    }
    let deleted = repository::category::delete(&state.db.pool, id).await?;
    if !deleted {
        return Err(AppError::with_message(
            ErrorCode::CategoryNotFound,
            format!("Category {id} not found"),
        ));
    }
    Ok(Json(serde_json::json!({ "deleted": true })))
}

fn require_admin(user: &CurrentUser) -> Result<(), AppError> {
    if user.is_admin() {
        Ok(())
    } else {
        Err(AppError::new(ErrorCode::AdminRequired))
    }
}
