//! Product Model

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Product entity
///
/// `price` is in minor currency units (cents). `stock_qty` must never go
/// negative; the inventory repository and a schema CHECK both enforce it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    /// Unit price in minor units (cents)
    pub price: i64,
    pub image: Option<String>,
    pub category_id: i64,
    pub stock_qty: i64,
    /// Admin dashboard highlights products at or below this level
    pub low_stock_threshold: i64,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create product payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ProductCreate {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub image: Option<String>,
    pub category_id: i64,
    #[validate(range(min = 0))]
    pub stock_qty: Option<i64>,
    #[validate(range(min = 0))]
    pub low_stock_threshold: Option<i64>,
}

/// Update product payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub image: Option<String>,
    pub category_id: Option<i64>,
    pub stock_qty: Option<i64>,
    pub low_stock_threshold: Option<i64>,
    pub is_active: Option<bool>,
}

/// One entry of an admin bulk inventory update
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StockUpdate {
    pub product_id: i64,
    pub stock_qty: Option<i64>,
    pub is_active: Option<bool>,
}

/// Bulk inventory update payload, applied all-or-nothing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkStockUpdate {
    pub updates: Vec<StockUpdate>,
}
