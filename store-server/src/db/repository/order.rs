//! Order Repository
//!
//! Read access plus checkout-time creation. Status mutations go through the
//! lifecycle manager (`crate::orders`), which owns the transactional
//! transition + stock-compensation logic.

use super::{RepoError, RepoResult};
use shared::models::{Order, OrderDetail, OrderItem, OrderItemCreate, OrderStatus};
use sqlx::{SqliteConnection, SqlitePool};

/// Recent orders, newest first (paginated admin list)
pub async fn find_all(pool: &SqlitePool, limit: i64, offset: i64) -> RepoResult<Vec<Order>> {
    let rows = sqlx::query_as::<_, Order>(
        "SELECT * FROM orders ORDER BY created_at DESC LIMIT ? OFFSET ?",
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Order>> {
    let row = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_items(pool: &SqlitePool, order_id: i64) -> RepoResult<Vec<OrderItem>> {
    let rows = sqlx::query_as::<_, OrderItem>(
        "SELECT * FROM order_item WHERE order_id = ? ORDER BY id",
    )
    .bind(order_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Order with its line items
pub async fn find_detail(pool: &SqlitePool, id: i64) -> RepoResult<Option<OrderDetail>> {
    let Some(order) = find_by_id(pool, id).await? else {
        return Ok(None);
    };
    let items = find_items(pool, id).await?;
    Ok(Some(OrderDetail { order, items }))
}

/// Insert an order and its items in one transaction.
///
/// The total is fixed here as the sum of `quantity * unit_price` over the
/// lines; it is never recomputed afterwards.
pub async fn create(
    pool: &SqlitePool,
    currency: &str,
    items: &[OrderItemCreate],
) -> RepoResult<OrderDetail> {
    if items.is_empty() {
        return Err(RepoError::Validation("order has no items".into()));
    }

    let now = shared::util::now_millis();
    let order_id = shared::util::snowflake_id();
    let total: i64 = items
        .iter()
        .map(|i| i.quantity.saturating_mul(i.unit_price))
        .fold(0i64, i64::saturating_add);

    let mut tx = pool.begin().await?;
    sqlx::query(
        "INSERT INTO orders (id, total_amount, currency, status, notes, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, '', ?5, ?5)",
    )
    .bind(order_id)
    .bind(total)
    .bind(currency)
    .bind(OrderStatus::Pending)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    for item in items {
        let attrs = serde_json::to_string(&item.selected_attributes)
            .map_err(|e| RepoError::Validation(format!("invalid attributes: {e}")))?;
        sqlx::query(
            "INSERT INTO order_item (id, order_id, product_id, name, quantity, unit_price, \
             selected_attributes) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(shared::util::snowflake_id())
        .bind(order_id)
        .bind(item.product_id)
        .bind(&item.name)
        .bind(item.quantity)
        .bind(item.unit_price)
        .bind(attrs)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;

    find_detail(pool, order_id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create order".into()))
}

// ===== Transaction-scoped helpers for the lifecycle manager =====

pub async fn find_by_id_tx(
    conn: &mut SqliteConnection,
    id: i64,
) -> RepoResult<Option<Order>> {
    let row = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = ?")
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(row)
}

pub async fn find_items_tx(
    conn: &mut SqliteConnection,
    order_id: i64,
) -> RepoResult<Vec<OrderItem>> {
    let rows = sqlx::query_as::<_, OrderItem>(
        "SELECT * FROM order_item WHERE order_id = ? ORDER BY id",
    )
    .bind(order_id)
    .fetch_all(conn)
    .await?;
    Ok(rows)
}

/// Update status and the (already appended) notes text inside the caller's
/// transaction
pub async fn update_status_tx(
    conn: &mut SqliteConnection,
    id: i64,
    status: OrderStatus,
    notes: &str,
) -> RepoResult<()> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE orders SET status = ?1, notes = ?2, updated_at = ?3 WHERE id = ?4",
    )
    .bind(status)
    .bind(notes)
    .bind(now)
    .bind(id)
    .execute(conn)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Order {id} not found")));
    }
    Ok(())
}
