//! Store Settings Repository
//!
//! 单行配置表, 固定 id = 1

use super::{RepoError, RepoResult};
use shared::models::{SettingsUpdate, StoreSettings};
use sqlx::SqlitePool;

pub async fn get(pool: &SqlitePool) -> RepoResult<StoreSettings> {
    let row = sqlx::query_as::<_, StoreSettings>("SELECT * FROM store_settings WHERE id = 1")
        .fetch_optional(pool)
        .await?;
    row.ok_or_else(|| RepoError::NotFound("store settings row missing".into()))
}

pub async fn update(pool: &SqlitePool, payload: &SettingsUpdate) -> RepoResult<StoreSettings> {
    if let Some(currency) = &payload.currency {
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(RepoError::Validation(
                "currency must be a 3-letter uppercase code".into(),
            ));
        }
    }
    if let Some(name) = &payload.store_name {
        if name.trim().is_empty() {
            return Err(RepoError::Validation("store_name cannot be empty".into()));
        }
    }

    let now = shared::util::now_millis();
    sqlx::query(
        "UPDATE store_settings SET \
         store_name = COALESCE(?1, store_name), \
         currency = COALESCE(?2, currency), \
         updated_at = ?3 \
         WHERE id = 1",
    )
    .bind(payload.store_name.as_deref())
    .bind(payload.currency.as_deref())
    .bind(now)
    .execute(pool)
    .await?;

    get(pool).await
}
