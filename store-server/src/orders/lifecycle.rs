//! Order lifecycle manager.
//!
//! All status mutations funnel through [`transition`], which enforces the
//! state machine and runs the cancellation compensation (stock restoration)
//! inside a single transaction. Checkout turns a cart into a PENDING order.

use crate::cart::{self, CartStore};
use crate::db::repository::{self, RepoError};
use shared::models::{OrderDetail, OrderItemCreate, OrderStatus};
use shared::{AppError, ErrorCode};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Order {0} not found")]
    OrderNotFound(i64),

    #[error("Invalid transition from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("Order in status {0} cannot be cancelled")]
    NotCancellable(OrderStatus),

    #[error("Cart is empty")]
    EmptyCart,

    #[error(transparent)]
    Repo(#[from] RepoError),
}

impl From<LifecycleError> for AppError {
    fn from(err: LifecycleError) -> Self {
        match err {
            LifecycleError::OrderNotFound(id) => AppError::with_message(
                ErrorCode::OrderNotFound,
                format!("Order {id} not found"),
            ),
            LifecycleError::InvalidTransition { from, to } => AppError::with_message(
                ErrorCode::OrderTransitionInvalid,
                format!("Cannot transition order from {from} to {to}"),
            ),
            LifecycleError::NotCancellable(status) => AppError::with_message(
                ErrorCode::OrderStatusInvalid,
                format!("Order in status {status} cannot be cancelled"),
            ),
            LifecycleError::EmptyCart => {
                AppError::with_message(ErrorCode::OrderEmpty, "Cart is empty")
            }
            LifecycleError::Repo(e) => e.into(),
        }
    }
}

pub type LifecycleResult<T> = Result<T, LifecycleError>;

/// Append a timestamped line to the order's audit notes.
fn append_note(notes: &str, line: &str) -> String {
    let stamped = format!("[{}] {}", shared::util::now_rfc3339(), line);
    if notes.is_empty() {
        stamped
    } else {
        format!("{notes}\n{stamped}")
    }
}

/// Move an order to `target`, enforcing the transition table.
///
/// Cancellation restores the reserved stock of every line item; the status
/// update and all stock increments commit together or not at all. A missing
/// product (hard-deleted since checkout) aborts the whole cancellation.
pub async fn transition(
    pool: &SqlitePool,
    order_id: i64,
    target: OrderStatus,
    note: Option<&str>,
) -> LifecycleResult<OrderDetail> {
    transition_guarded(pool, order_id, target, note, None).await
}

/// Shared implementation. `allowed_from` narrows the transition table
/// further; it is checked against the status read inside the transaction,
/// so a concurrent transition cannot slip an order past the precondition.
async fn transition_guarded(
    pool: &SqlitePool,
    order_id: i64,
    target: OrderStatus,
    note: Option<&str>,
    allowed_from: Option<&[OrderStatus]>,
) -> LifecycleResult<OrderDetail> {
    let mut tx = pool.begin().await.map_err(RepoError::from)?;

    let order = repository::order::find_by_id_tx(&mut *tx, order_id)
        .await?
        .ok_or(LifecycleError::OrderNotFound(order_id))?;

    if let Some(allowed) = allowed_from {
        if !allowed.contains(&order.status) {
            warn!(order_id, status = %order.status, "Cancel rejected");
            return Err(LifecycleError::NotCancellable(order.status));
        }
    }

    if !order.status.can_transition_to(target) {
        return Err(LifecycleError::InvalidTransition {
            from: order.status,
            to: target,
        });
    }

    let mut notes = order.notes.clone();
    if target == OrderStatus::Cancelled {
        let items = repository::order::find_items_tx(&mut *tx, order_id).await?;
        for item in &items {
            repository::product::increment_stock(&mut *tx, item.product_id, item.quantity).await?;
        }
        notes = append_note(
            &notes,
            &format!("Order cancelled, {} line(s) restored to stock", items.len()),
        );
    } else {
        notes = append_note(&notes, &format!("Status changed to {target}"));
    }
    if let Some(extra) = note {
        if !extra.trim().is_empty() {
            notes = append_note(&notes, extra.trim());
        }
    }

    repository::order::update_status_tx(&mut *tx, order_id, target, &notes).await?;
    tx.commit().await.map_err(RepoError::from)?;

    info!(order_id, from = %order.status, to = %target, "Order transitioned");

    repository::order::find_detail(pool, order_id)
        .await?
        .ok_or(LifecycleError::OrderNotFound(order_id))
}

/// Customer-facing cancellation.
///
/// Narrower than the transition table on purpose: once an order is
/// PROCESSING it can only be cancelled by an operator via [`transition`].
pub async fn cancel(
    pool: &SqlitePool,
    order_id: i64,
    note: Option<&str>,
) -> LifecycleResult<OrderDetail> {
    transition_guarded(
        pool,
        order_id,
        OrderStatus::Cancelled,
        note,
        Some(&[OrderStatus::Pending, OrderStatus::Confirmed]),
    )
    .await
}

/// Turn a cart into a PENDING order and clear the cart.
///
/// Line items snapshot the product name and price at this moment; later
/// catalog edits never touch existing orders. Entries whose product has
/// disappeared or been deactivated are silently dropped during
/// materialization.
///
/// TODO: stock is not decremented here; confirm with the shop owner whether
/// checkout should reserve stock or whether fulfilment handles it manually.
pub async fn checkout(
    pool: &SqlitePool,
    store: &CartStore,
    cart_id: &str,
    currency: &str,
) -> LifecycleResult<OrderDetail> {
    let lines = cart::materialize(pool, store, cart_id).await?;
    if lines.is_empty() {
        return Err(LifecycleError::EmptyCart);
    }

    let items: Vec<OrderItemCreate> = lines
        .iter()
        .map(|line| OrderItemCreate {
            product_id: line.product_id,
            name: line.name.clone(),
            quantity: line.quantity,
            unit_price: line.unit_price,
            selected_attributes: line.attributes.clone(),
        })
        .collect();

    let detail = repository::order::create(pool, currency, &items).await?;
    store.clear(cart_id);

    info!(
        order_id = detail.order.id,
        total = detail.order.total_amount,
        lines = detail.items.len(),
        "Checkout complete"
    );
    Ok(detail)
}
