//! Cart DTOs
//!
//! Cart entries are keyed by `(product_id, selected attribute map)`: the same
//! product with different attribute selections is a distinct entry. The
//! attribute map uses a `BTreeMap` so its JSON encoding is canonical (sorted
//! keys) and usable as a map key.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Add-item / set-quantity request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItemInput {
    pub product_id: i64,
    pub quantity: i64,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

/// One stored cart entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CartEntry {
    pub product_id: i64,
    pub quantity: i64,
    pub attributes: BTreeMap<String, String>,
}

/// One materialized cart line with product fields resolved from the catalog at
/// read time, so a price change after adding is reflected live
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: i64,
    pub name: String,
    /// Current unit price in minor units (cents)
    pub unit_price: i64,
    pub image: Option<String>,
    pub quantity: i64,
    pub attributes: BTreeMap<String, String>,
    pub line_total: i64,
}

/// Materialized cart view
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartView {
    pub cart_id: String,
    pub lines: Vec<CartLine>,
    pub total: i64,
}

/// Canonical string key for a `(product_id, attributes)` pair
pub fn entry_key(product_id: i64, attributes: &BTreeMap<String, String>) -> String {
    // BTreeMap serializes with sorted keys, so equal selections always
    // produce equal strings
    format!(
        "{}|{}",
        product_id,
        serde_json::to_string(attributes).unwrap_or_default()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_key_distinguishes_attribute_selections() {
        let mut m = BTreeMap::new();
        m.insert("size".to_string(), "M".to_string());
        let mut l = BTreeMap::new();
        l.insert("size".to_string(), "L".to_string());
        assert_ne!(entry_key(1, &m), entry_key(1, &l));
        assert_eq!(entry_key(1, &m), entry_key(1, &m.clone()));
    }

    #[test]
    fn entry_key_is_insertion_order_independent() {
        let mut a = BTreeMap::new();
        a.insert("size".to_string(), "M".to_string());
        a.insert("color".to_string(), "red".to_string());
        let mut b = BTreeMap::new();
        b.insert("color".to_string(), "red".to_string());
        b.insert("size".to_string(), "M".to_string());
        assert_eq!(entry_key(7, &a), entry_key(7, &b));
    }
}
