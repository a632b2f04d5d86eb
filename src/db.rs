//! PostgreSQL 连接池、迁移与就绪检查

use crate::config::DatabaseConfig;
use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::{migrate::MigrateError, postgres::PgPoolOptions, PgPool};
use std::{fmt, time::Duration};

/// 数据库初始化错误
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("failed to connect to database: {0}")]
    Connect(#[source] sqlx::Error),

    #[error("failed to apply migrations: {0}")]
    Migrate(#[source] MigrateError),
}

/// 依赖的健康状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy,
    Unhealthy(String),
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Healthy)
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthStatus::Healthy => f.write_str("healthy"),
            HealthStatus::Unhealthy(_) => f.write_str("unhealthy"),
        }
    }
}

/// 就绪检查依赖的后端
#[async_trait]
pub trait ReadinessCheck: Send + Sync {
    async fn check(&self) -> HealthStatus;
}

#[async_trait]
impl ReadinessCheck for PgPool {
    async fn check(&self) -> HealthStatus {
        metrics::gauge!("db_pool_connections").set(self.size() as f64);
        metrics::gauge!("db_pool_idle_connections").set(self.num_idle() as f64);

        health_check(self).await
    }
}

/// 按配置建立连接池。连接在首次使用前会做存活检测。
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, DbError> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
        .test_before_acquire(true)
        .connect(config.url.expose_secret())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Database connection failed");
            DbError::Connect(e)
        })?;

    tracing::info!(
        max = config.max_connections,
        min = config.min_connections,
        "Database pool ready"
    );

    Ok(pool)
}

/// 执行 `migrations/` 下尚未应用的迁移（包含内置权限与 ADMIN 角色）
pub async fn run_migrations(pool: &PgPool) -> Result<(), DbError> {
    sqlx::migrate!("./migrations").run(pool).await.map_err(|e| {
        tracing::error!(error = %e, "Migration failed");
        DbError::Migrate(e)
    })?;

    tracing::info!("Schema up to date");
    Ok(())
}

pub async fn health_check(pool: &PgPool) -> HealthStatus {
    match sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(pool).await {
        Ok(_) => HealthStatus::Healthy,
        Err(e) => {
            tracing::warn!(error = %e, "Database not reachable");
            HealthStatus::Unhealthy(e.to_string())
        }
    }
}
