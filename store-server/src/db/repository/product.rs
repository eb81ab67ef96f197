//! Product Repository
//!
//! Also the inventory ledger: stock is only mutated here, either by the
//! admin bulk update or by order-cancellation compensation.

use super::{RepoError, RepoResult};
use shared::models::{Product, ProductCreate, ProductUpdate, StockUpdate};
use sqlx::{SqliteConnection, SqlitePool};

/// Active products for the storefront
pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Product>> {
    let rows = sqlx::query_as::<_, Product>(
        "SELECT * FROM product WHERE is_active = 1 ORDER BY name",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// All products, including inactive (admin view)
pub async fn find_all_admin(pool: &SqlitePool) -> RepoResult<Vec<Product>> {
    let rows = sqlx::query_as::<_, Product>("SELECT * FROM product ORDER BY name")
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Active products in one category
pub async fn find_by_category(pool: &SqlitePool, category_id: i64) -> RepoResult<Vec<Product>> {
    let rows = sqlx::query_as::<_, Product>(
        "SELECT * FROM product WHERE category_id = ? AND is_active = 1 ORDER BY name",
    )
    .bind(category_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Product>> {
    let row = sqlx::query_as::<_, Product>("SELECT * FROM product WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Active product lookup used by cart materialization, which silently
/// drops entries whose product is gone or inactive
pub async fn find_active_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Product>> {
    let row =
        sqlx::query_as::<_, Product>("SELECT * FROM product WHERE id = ? AND is_active = 1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
    Ok(row)
}

pub async fn create(pool: &SqlitePool, data: ProductCreate) -> RepoResult<Product> {
    if data.price < 0 {
        return Err(RepoError::Validation("price must not be negative".into()));
    }
    if data.stock_qty.is_some_and(|q| q < 0) {
        return Err(RepoError::Validation(
            "stock_qty must not be negative".into(),
        ));
    }
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO product (id, name, description, price, image, category_id, stock_qty, \
         low_stock_threshold, is_active, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 1, ?9, ?9)",
    )
    .bind(id)
    .bind(&data.name)
    .bind(&data.description)
    .bind(data.price)
    .bind(&data.image)
    .bind(data.category_id)
    .bind(data.stock_qty.unwrap_or(0))
    .bind(data.low_stock_threshold.unwrap_or(5))
    .bind(now)
    .execute(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create product".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: ProductUpdate) -> RepoResult<Product> {
    if data.price.is_some_and(|p| p < 0) {
        return Err(RepoError::Validation("price must not be negative".into()));
    }
    if data.stock_qty.is_some_and(|q| q < 0) {
        return Err(RepoError::Validation(
            "stock_qty must not be negative".into(),
        ));
    }
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE product SET name = COALESCE(?1, name), description = COALESCE(?2, description), \
         price = COALESCE(?3, price), image = COALESCE(?4, image), \
         category_id = COALESCE(?5, category_id), stock_qty = COALESCE(?6, stock_qty), \
         low_stock_threshold = COALESCE(?7, low_stock_threshold), \
         is_active = COALESCE(?8, is_active), updated_at = ?9 WHERE id = ?10",
    )
    .bind(data.name)
    .bind(data.description)
    .bind(data.price)
    .bind(data.image)
    .bind(data.category_id)
    .bind(data.stock_qty)
    .bind(data.low_stock_threshold)
    .bind(data.is_active)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Product {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Product {id} not found")))
}

/// Soft-delete a product
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE product SET is_active = 0, updated_at = ? WHERE id = ? AND is_active = 1",
    )
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() > 0)
}

/// Add `amount` units back to stock, inside the caller's transaction.
///
/// Only used for order-cancellation compensation; a missing product fails
/// the call so the caller can roll the whole transition back.
pub async fn increment_stock(
    conn: &mut SqliteConnection,
    product_id: i64,
    amount: i64,
) -> RepoResult<()> {
    if amount <= 0 {
        return Err(RepoError::Validation(
            "stock increment must be positive".into(),
        ));
    }
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE product SET stock_qty = stock_qty + ?1, updated_at = ?2 WHERE id = ?3",
    )
    .bind(amount)
    .bind(now)
    .bind(product_id)
    .execute(conn)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!(
            "Product {product_id} not found"
        )));
    }
    Ok(())
}

/// Apply a batch of partial inventory updates as a single unit of work.
///
/// All-or-nothing: a missing product or a negative stock value aborts the
/// entire batch and no row is changed. Returns the number of updated rows.
pub async fn bulk_update(pool: &SqlitePool, updates: &[StockUpdate]) -> RepoResult<u64> {
    // Reject bad values before opening the transaction
    for update in updates {
        if update.stock_qty.is_some_and(|q| q < 0) {
            return Err(RepoError::Validation(format!(
                "stock_qty for product {} must not be negative",
                update.product_id
            )));
        }
    }

    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;
    let mut updated = 0u64;
    for update in updates {
        let rows = sqlx::query(
            "UPDATE product SET stock_qty = COALESCE(?1, stock_qty), \
             is_active = COALESCE(?2, is_active), updated_at = ?3 WHERE id = ?4",
        )
        .bind(update.stock_qty)
        .bind(update.is_active)
        .bind(now)
        .bind(update.product_id)
        .execute(&mut *tx)
        .await?;
        if rows.rows_affected() == 0 {
            // Dropping the transaction rolls back every prior update
            return Err(RepoError::NotFound(format!(
                "Product {} not found",
                update.product_id
            )));
        }
        updated += rows.rows_affected();
    }
    tx.commit().await?;
    Ok(updated)
}

/// Products at or below their low-stock threshold (admin dashboard)
pub async fn find_low_stock(pool: &SqlitePool) -> RepoResult<Vec<Product>> {
    let rows = sqlx::query_as::<_, Product>(
        "SELECT * FROM product WHERE is_active = 1 AND stock_qty <= low_stock_threshold \
         ORDER BY stock_qty",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
