//! Admin User Repository

use super::{RepoError, RepoResult};
use shared::models::AdminUser;
use sqlx::SqlitePool;

pub async fn find_by_username(pool: &SqlitePool, username: &str) -> RepoResult<Option<AdminUser>> {
    let row = sqlx::query_as::<_, AdminUser>("SELECT * FROM admin_user WHERE username = ?")
        .bind(username)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn count(pool: &SqlitePool) -> RepoResult<i64> {
    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM admin_user")
        .fetch_one(pool)
        .await?;
    Ok(count.0)
}

pub async fn create(
    pool: &SqlitePool,
    username: &str,
    password_hash: &str,
    display_name: &str,
    role: &str,
) -> RepoResult<AdminUser> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO admin_user (id, username, password_hash, display_name, role, is_active, \
         created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6, ?6)",
    )
    .bind(id)
    .bind(username)
    .bind(password_hash)
    .bind(display_name)
    .bind(role)
    .bind(now)
    .execute(pool)
    .await?;
    find_by_username(pool, username)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create admin user".into()))
}
