//! 订单生命周期集成测试
//!
//! 使用内存 SQLite 走真实迁移, 覆盖状态机、取消返还库存和 checkout 流程.

use std::collections::BTreeMap;

use shared::models::{
    CartItemInput, CategoryCreate, OrderStatus, ProductCreate, StockUpdate,
};
use store_server::cart::CartStore;
use store_server::db::repository::{self, RepoError};
use store_server::db::DbService;
use store_server::orders::{self, LifecycleError};

async fn setup() -> DbService {
    DbService::new_in_memory().await.expect("in-memory db")
}

async fn seed_product(db: &DbService, name: &str, price: i64, stock: i64) -> i64 {
    let category = repository::category::create(
        &db.pool,
        CategoryCreate {
            name: format!("cat-{name}"),
            sort_order: None,
        },
    )
    .await
    .expect("create category");

    let product = repository::product::create(
        &db.pool,
        ProductCreate {
            name: name.to_string(),
            description: None,
            price,
            image: None,
            category_id: category.id,
            stock_qty: Some(stock),
            low_stock_threshold: None,
        },
    )
    .await
    .expect("create product");
    product.id
}

async fn checkout_one(db: &DbService, product_id: i64, quantity: i64) -> i64 {
    let store = CartStore::new();
    let cart_id = store.create();
    store.add_item(
        &cart_id,
        &CartItemInput {
            product_id,
            quantity,
            attributes: BTreeMap::new(),
        },
    );
    let detail = orders::checkout(&db.pool, &store, &cart_id, "EUR")
        .await
        .expect("checkout");
    detail.order.id
}

async fn stock_of(db: &DbService, product_id: i64) -> i64 {
    repository::product::find_by_id(&db.pool, product_id)
        .await
        .unwrap()
        .unwrap()
        .stock_qty
}

#[tokio::test]
async fn checkout_creates_pending_order_without_touching_stock() {
    let db = setup().await;
    let product_id = seed_product(&db, "mug", 1250, 100).await;

    let store = CartStore::new();
    let cart_id = store.create();
    store.add_item(
        &cart_id,
        &CartItemInput {
            product_id,
            quantity: 3,
            attributes: BTreeMap::new(),
        },
    );

    let detail = orders::checkout(&db.pool, &store, &cart_id, "EUR")
        .await
        .expect("checkout");

    assert_eq!(detail.order.status, OrderStatus::Pending);
    assert_eq!(detail.order.total_amount, 3 * 1250);
    assert_eq!(detail.order.currency, "EUR");
    assert_eq!(detail.items.len(), 1);
    assert_eq!(detail.items[0].quantity, 3);
    assert_eq!(detail.items[0].unit_price, 1250);

    // Checkout does not reserve stock
    assert_eq!(stock_of(&db, product_id).await, 100);
    // Cart is emptied but stays alive
    assert!(store.exists(&cart_id));
    assert!(store.entries(&cart_id).is_empty());
}

#[tokio::test]
async fn checkout_empty_cart_is_rejected() {
    let db = setup().await;
    let store = CartStore::new();
    let cart_id = store.create();

    let err = orders::checkout(&db.pool, &store, &cart_id, "EUR")
        .await
        .unwrap_err();
    assert!(matches!(err, LifecycleError::EmptyCart));
}

#[tokio::test]
async fn checkout_drops_deactivated_products() {
    let db = setup().await;
    let keep = seed_product(&db, "keep", 500, 10).await;
    let gone = seed_product(&db, "gone", 700, 10).await;
    repository::product::delete(&db.pool, gone).await.unwrap();

    let store = CartStore::new();
    let cart_id = store.create();
    for pid in [keep, gone] {
        store.add_item(
            &cart_id,
            &CartItemInput {
                product_id: pid,
                quantity: 1,
                attributes: BTreeMap::new(),
            },
        );
    }

    let detail = orders::checkout(&db.pool, &store, &cart_id, "EUR")
        .await
        .expect("checkout");
    assert_eq!(detail.items.len(), 1);
    assert_eq!(detail.items[0].product_id, keep);
}

#[tokio::test]
async fn order_snapshot_survives_price_change() {
    let db = setup().await;
    let product_id = seed_product(&db, "tea", 900, 50).await;
    let order_id = checkout_one(&db, product_id, 2).await;

    repository::product::update(
        &db.pool,
        product_id,
        shared::models::ProductUpdate {
            price: Some(1500),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let detail = repository::order::find_detail(&db.pool, order_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(detail.items[0].unit_price, 900);
    assert_eq!(detail.order.total_amount, 1800);
}

#[tokio::test]
async fn forward_path_follows_transition_table() {
    let db = setup().await;
    let product_id = seed_product(&db, "cap", 2000, 5).await;
    let order_id = checkout_one(&db, product_id, 1).await;

    // PENDING cannot skip to PROCESSING
    let err = orders::transition(&db.pool, order_id, OrderStatus::Processing, None)
        .await
        .unwrap_err();
    assert!(matches!(err, LifecycleError::InvalidTransition { .. }));

    for status in [
        OrderStatus::Confirmed,
        OrderStatus::Processing,
        OrderStatus::Delivered,
    ] {
        let detail = orders::transition(&db.pool, order_id, status, None)
            .await
            .expect("legal transition");
        assert_eq!(detail.order.status, status);
    }
}

#[tokio::test]
async fn terminal_states_accept_no_transitions() {
    let db = setup().await;
    let product_id = seed_product(&db, "pin", 300, 5).await;
    let order_id = checkout_one(&db, product_id, 1).await;

    orders::cancel(&db.pool, order_id, None).await.unwrap();

    for status in [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Processing,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ] {
        let err = orders::transition(&db.pool, order_id, status, None)
            .await
            .unwrap_err();
        assert!(matches!(err, LifecycleError::InvalidTransition { .. }));
    }
}

#[tokio::test]
async fn cancel_restores_stock() {
    let db = setup().await;
    let product_id = seed_product(&db, "bowl", 1000, 100).await;
    let order_id = checkout_one(&db, product_id, 10).await;

    let detail = orders::cancel(&db.pool, order_id, None)
        .await
        .expect("cancel");
    assert_eq!(detail.order.status, OrderStatus::Cancelled);
    assert_eq!(stock_of(&db, product_id).await, 110);
}

#[tokio::test]
async fn cancel_notes_are_timestamped_and_appended() {
    let db = setup().await;
    let product_id = seed_product(&db, "vase", 4000, 10).await;
    let order_id = checkout_one(&db, product_id, 1).await;

    orders::transition(&db.pool, order_id, OrderStatus::Confirmed, Some("paid by card"))
        .await
        .unwrap();
    let detail = orders::cancel(&db.pool, order_id, Some("customer changed mind"))
        .await
        .unwrap();

    let notes = &detail.order.notes;
    assert!(notes.starts_with('['), "notes lines carry timestamps: {notes}");
    assert!(notes.contains("paid by card"));
    assert!(notes.contains("cancelled"));
    assert!(notes.contains("customer changed mind"));
    // Earlier lines are preserved, not replaced
    assert!(notes.lines().count() >= 3);
}

#[tokio::test]
async fn customer_cancel_is_narrower_than_transition_table() {
    let db = setup().await;
    let product_id = seed_product(&db, "hat", 1500, 20).await;
    let order_id = checkout_one(&db, product_id, 2).await;

    orders::transition(&db.pool, order_id, OrderStatus::Confirmed, None)
        .await
        .unwrap();
    orders::transition(&db.pool, order_id, OrderStatus::Processing, None)
        .await
        .unwrap();

    // The narrow cancel path refuses PROCESSING orders
    let err = orders::cancel(&db.pool, order_id, None).await.unwrap_err();
    assert!(matches!(
        err,
        LifecycleError::NotCancellable(OrderStatus::Processing)
    ));

    // But an explicit operator transition still works, with compensation
    let detail = orders::transition(&db.pool, order_id, OrderStatus::Cancelled, None)
        .await
        .unwrap();
    assert_eq!(detail.order.status, OrderStatus::Cancelled);
    assert_eq!(stock_of(&db, product_id).await, 22);
}

#[tokio::test]
async fn rejected_cancel_reads_current_status_and_changes_nothing() {
    let db = setup().await;
    let product_id = seed_product(&db, "scarf", 800, 10).await;
    let order_id = checkout_one(&db, product_id, 3).await;

    orders::transition(&db.pool, order_id, OrderStatus::Confirmed, None)
        .await
        .unwrap();
    // Status moves on after cancel's caller last saw the order
    orders::transition(&db.pool, order_id, OrderStatus::Processing, None)
        .await
        .unwrap();

    let err = orders::cancel(&db.pool, order_id, None).await.unwrap_err();
    assert!(matches!(
        err,
        LifecycleError::NotCancellable(OrderStatus::Processing)
    ));

    // The rejection rolled back: no status change, no stock restoration
    let order = repository::order::find_by_id(&db.pool, order_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(order.status, OrderStatus::Processing);
    assert_eq!(stock_of(&db, product_id).await, 10);
}

#[tokio::test]
async fn cancel_with_missing_product_rolls_back_everything() {
    let db = setup().await;
    let alive = seed_product(&db, "plate", 800, 50).await;
    let doomed = seed_product(&db, "fork", 200, 50).await;

    let store = CartStore::new();
    let cart_id = store.create();
    for (pid, qty) in [(alive, 5), (doomed, 3)] {
        store.add_item(
            &cart_id,
            &CartItemInput {
                product_id: pid,
                quantity: qty,
                attributes: BTreeMap::new(),
            },
        );
    }
    let order_id = orders::checkout(&db.pool, &store, &cart_id, "EUR")
        .await
        .unwrap()
        .order
        .id;

    // Hard-delete one product behind the order's back
    sqlx::query("DELETE FROM product WHERE id = ?")
        .bind(doomed)
        .execute(&db.pool)
        .await
        .unwrap();

    let err = orders::cancel(&db.pool, order_id, None).await.unwrap_err();
    assert!(matches!(err, LifecycleError::Repo(RepoError::NotFound(_))));

    // Nothing committed: status unchanged, no partial stock restoration
    let order = repository::order::find_by_id(&db.pool, order_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(stock_of(&db, alive).await, 50);
}

#[tokio::test]
async fn transition_on_unknown_order_fails() {
    let db = setup().await;
    let err = orders::transition(&db.pool, 424242, OrderStatus::Confirmed, None)
        .await
        .unwrap_err();
    assert!(matches!(err, LifecycleError::OrderNotFound(424242)));
}

#[tokio::test]
async fn bulk_stock_update_is_all_or_nothing() {
    let db = setup().await;
    let a = seed_product(&db, "left", 100, 10).await;
    let b = seed_product(&db, "right", 100, 10).await;

    // One update targets a missing product: the whole batch must roll back
    let err = repository::product::bulk_update(
        &db.pool,
        &[
            StockUpdate {
                product_id: a,
                stock_qty: Some(99),
                is_active: None,
            },
            StockUpdate {
                product_id: 999_999,
                stock_qty: Some(1),
                is_active: None,
            },
        ],
    )
    .await
    .unwrap_err();
    assert!(matches!(err, RepoError::NotFound(_)));
    assert_eq!(stock_of(&db, a).await, 10);

    // Negative stock is rejected before any write happens
    let err = repository::product::bulk_update(
        &db.pool,
        &[StockUpdate {
            product_id: b,
            stock_qty: Some(-1),
            is_active: None,
        }],
    )
    .await
    .unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
    assert_eq!(stock_of(&db, b).await, 10);

    // A clean batch commits both rows
    let updated = repository::product::bulk_update(
        &db.pool,
        &[
            StockUpdate {
                product_id: a,
                stock_qty: Some(7),
                is_active: None,
            },
            StockUpdate {
                product_id: b,
                stock_qty: None,
                is_active: Some(false),
            },
        ],
    )
    .await
    .unwrap();
    assert_eq!(updated, 2);
    assert_eq!(stock_of(&db, a).await, 7);
    let b_row = repository::product::find_by_id(&db.pool, b)
        .await
        .unwrap()
        .unwrap();
    assert!(!b_row.is_active);
}
