//! Conch Store Server - 轻量电商店面与后台
//!
//! # 架构概述
//!
//! - **目录** (`db`): SQLite 存储的分类 / 商品 / 订单 / 设置
//! - **购物车** (`cart`): 进程内存购物车, 闲置自动回收
//! - **订单** (`orders`): 状态机驱动的订单生命周期, 取消自动返还库存
//! - **认证** (`auth`): JWT + Argon2 管理员认证
//! - **HTTP API** (`api`): 匿名店面 + 管理员后台
//!
//! # 模块结构
//!
//! ```text
//! store-server/src/
//! ├── core/          # 配置、状态、服务器
//! ├── auth/          # JWT 认证、中间件
//! ├── api/           # HTTP 路由和处理器
//! ├── cart/          # 内存购物车
//! ├── orders/        # 订单生命周期
//! ├── db/            # 数据库层
//! └── utils/         # 工具函数
//! ```

pub mod api;
pub mod auth;
pub mod cart;
pub mod core;
pub mod db;
pub mod orders;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService};
pub use cart::CartStore;
pub use core::{Config, Server, ServerState};

// Re-export unified error types from shared
pub use utils::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro - 支持 tracing 格式说明符
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

pub fn print_banner() {
    println!(
        r#"
   ______                 __
  / ____/___  ____  _____/ /_
 / /   / __ \/ __ \/ ___/ __ \
/ /___/ /_/ / / / / /__/ / / /
\____/\____/_/ /_/\___/_/ /_/
    "#
    );
}

/// 设置运行环境: dotenv, 工作目录, 日志
pub fn setup_environment() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let work_dir = std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/conch/store".into());
    std::fs::create_dir_all(&work_dir)?;

    let log_dir = format!("{work_dir}/logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_level = std::env::var("LOG_LEVEL").ok();
    init_logger_with_file(log_level.as_deref(), Some(&log_dir));

    Ok(())
}
