//! Order Lifecycle Module
//!
//! 订单状态机: 驱动状态转移, 取消赔偿 (库存返还), 以及购物车 checkout.

mod lifecycle;

pub use lifecycle::{cancel, checkout, transition, LifecycleError, LifecycleResult};
