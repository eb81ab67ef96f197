//! Store Settings Model

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Store-wide settings (singleton row, id = 1)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct StoreSettings {
    pub id: i64,
    pub store_name: String,
    /// ISO 4217 code stamped onto new orders
    pub currency: String,
    pub updated_at: i64,
}

/// Update settings payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct SettingsUpdate {
    #[validate(length(min = 1, max = 100))]
    pub store_name: Option<String>,
    /// ISO 4217 code, three uppercase letters
    #[validate(length(equal = 3))]
    pub currency: Option<String>,
}
