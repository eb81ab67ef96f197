//! Entity models shared between the store server and admin tooling
//!
//! Each entity follows the same triple: the entity struct (sqlx `FromRow`
//! behind the `db` feature), a `*Create` payload, and a `*Update` payload
//! with all-optional fields.

pub mod admin_user;
pub mod cart;
pub mod category;
pub mod order;
pub mod product;
pub mod settings;

pub use admin_user::AdminUser;
pub use cart::{entry_key, CartEntry, CartItemInput, CartLine, CartView};
pub use category::{Category, CategoryCreate, CategoryUpdate};
pub use order::{Order, OrderCreate, OrderDetail, OrderItem, OrderItemCreate, OrderStatus};
pub use product::{BulkStockUpdate, Product, ProductCreate, ProductUpdate, StockUpdate};
pub use settings::{SettingsUpdate, StoreSettings};
