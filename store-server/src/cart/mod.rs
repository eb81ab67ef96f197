//! Cart Module
//!
//! 内存购物车: 进程内持有, 不落库. 服务重启即清空.

mod store;

pub use store::{CartStore, MAX_QUANTITY};

use crate::db::repository::{self, RepoResult};
use shared::models::{entry_key, CartLine, CartView};
use sqlx::SqlitePool;
use tracing::debug;

/// Resolve a cart's entries against the live catalog.
///
/// Entries whose product has been deleted or deactivated since they were
/// added are dropped, not errored: the cart self-heals on read. Prices and
/// names come from the catalog at this moment, never from add time.
pub async fn materialize(
    pool: &SqlitePool,
    store: &CartStore,
    cart_id: &str,
) -> RepoResult<Vec<CartLine>> {
    let entries = store.entries(cart_id);
    let mut lines = Vec::with_capacity(entries.len());

    for entry in entries {
        let Some(product) = repository::product::find_active_by_id(pool, entry.product_id).await?
        else {
            debug!(
                cart_id,
                product_id = entry.product_id,
                "Dropping cart entry for unavailable product"
            );
            store.remove(cart_id, &entry_key(entry.product_id, &entry.attributes));
            continue;
        };
        lines.push(CartLine {
            product_id: product.id,
            name: product.name,
            unit_price: product.price,
            image: product.image,
            quantity: entry.quantity,
            attributes: entry.attributes,
            line_total: entry.quantity.saturating_mul(product.price),
        });
    }
    Ok(lines)
}

/// Materialized view with the running total
pub async fn view(pool: &SqlitePool, store: &CartStore, cart_id: &str) -> RepoResult<CartView> {
    let lines = materialize(pool, store, cart_id).await?;
    let total = lines
        .iter()
        .map(|l| l.line_total)
        .fold(0i64, i64::saturating_add);
    Ok(CartView {
        cart_id: cart_id.to_string(),
        lines,
        total,
    })
}
