use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::auth::{self, JwtService};
use crate::cart::CartStore;
use crate::core::Config;
use crate::db::{repository, DbService};
use shared::AppError;

/// 服务器状态 - 持有所有服务的共享引用
///
/// 使用 Arc 实现浅拷贝，克隆成本极低。
///
/// # 组件
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | db | DbService | SQLite 连接池 |
/// | jwt_service | Arc<JwtService> | JWT 认证服务 |
/// | cart | Arc<CartStore> | 内存购物车 |
/// | shutdown | CancellationToken | 后台任务取消令牌 |
#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 数据库服务
    pub db: DbService,
    /// JWT 认证服务 (Arc 共享所有权)
    pub jwt_service: Arc<JwtService>,
    /// 内存购物车
    pub cart: Arc<CartStore>,
    /// 后台任务取消令牌
    shutdown: CancellationToken,
}

impl ServerState {
    /// 初始化服务器状态: 打开数据库、应用迁移、播种管理员账号
    pub async fn initialize(config: &Config) -> Result<Self, AppError> {
        std::fs::create_dir_all(&config.work_dir)
            .map_err(|e| AppError::internal(format!("Failed to create work dir: {e}")))?;

        let db = DbService::new(&config.db_path()).await?;
        seed_admin(&db).await?;

        Ok(Self {
            config: config.clone(),
            db,
            jwt_service: Arc::new(JwtService::with_config(config.jwt.clone())),
            cart: Arc::new(CartStore::new()),
            shutdown: CancellationToken::new(),
        })
    }

    /// 测试用: 内存数据库, 默认管理员
    pub async fn initialize_in_memory(config: &Config) -> Result<Self, AppError> {
        let db = DbService::new_in_memory().await?;
        seed_admin(&db).await?;

        Ok(Self {
            config: config.clone(),
            db,
            jwt_service: Arc::new(JwtService::with_config(config.jwt.clone())),
            cart: Arc::new(CartStore::new()),
            shutdown: CancellationToken::new(),
        })
    }

    /// 启动后台任务 (购物车回收)
    pub fn start_background_tasks(&self) {
        let cart = self.cart.clone();
        let ttl = Duration::from_secs(self.config.cart_ttl_minutes * 60);
        let sweep = Duration::from_secs(self.config.cart_sweep_seconds.max(1));
        let token = self.shutdown.clone();

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(sweep);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = token.cancelled() => {
                        tracing::debug!("Cart eviction task stopped");
                        break;
                    }
                    _ = interval.tick() => {
                        cart.evict_idle(ttl);
                    }
                }
            }
        });
    }

    /// 取消所有后台任务
    pub fn shutdown_background_tasks(&self) {
        self.shutdown.cancel();
    }
}

/// 首次启动时播种管理员账号
///
/// 密码来自 `ADMIN_PASSWORD`; 未设置时开发环境用 "admin", 生产环境报错.
async fn seed_admin(db: &DbService) -> Result<(), AppError> {
    if repository::admin_user::count(&db.pool).await? > 0 {
        return Ok(());
    }

    let password = match std::env::var("ADMIN_PASSWORD") {
        Ok(p) if !p.is_empty() => p,
        _ => {
            #[cfg(debug_assertions)]
            {
                tracing::warn!("ADMIN_PASSWORD not set, seeding default admin/admin");
                "admin".to_string()
            }
            #[cfg(not(debug_assertions))]
            {
                return Err(AppError::internal(
                    "ADMIN_PASSWORD must be set on first startup",
                ));
            }
        }
    };

    let hash = auth::hash_password(&password)?;
    repository::admin_user::create(&db.pool, "admin", &hash, "Administrator", "admin").await?;
    tracing::info!("Seeded initial admin account");
    Ok(())
}
