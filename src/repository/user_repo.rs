//! User repository (数据库访问层)

use crate::{error::AppError, models::user::*};
use async_trait::async_trait;
use sqlx::PgPool;

const DUPLICATE_USERNAME: &str = "Username already exists";

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<User>, AppError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;
    /// Duplicate usernames fail with `AppError::Conflict`, unknown roles with `AppError::NotFound`.
    async fn create(&self, user: &NewUser) -> Result<User, AppError>;
    /// Returns `None` when no user has this id.
    async fn update(&self, id: i64, changes: &UserChanges) -> Result<Option<User>, AppError>;
    /// Returns `true` when a row was deleted.
    async fn delete(&self, id: i64) -> Result<bool, AppError>;
}

pub struct PgUserRepository {
    db: PgPool,
}

impl PgUserRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    /// 列出所有用户
    async fn list(&self) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY id")
            .fetch_all(&self.db)
            .await?;

        Ok(users)
    }

    /// 根据 ID 查找用户
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        Ok(user)
    }

    /// 根据用户名查找用户
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.db)
            .await?;

        Ok(user)
    }

    /// 创建用户，用户名唯一性由唯一索引保证
    async fn create(&self, user: &NewUser) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, full_name, password_hash, role_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.full_name)
        .bind(&user.password_hash)
        .bind(user.role_id)
        .fetch_one(&self.db)
        .await
        .map_err(|e| AppError::from_constraint(e, DUPLICATE_USERNAME))?;

        Ok(user)
    }

    /// 更新用户，未提供新密码或启用状态时保留原值
    async fn update(&self, id: i64, changes: &UserChanges) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET
                username = $2,
                email = $3,
                full_name = $4,
                password_hash = COALESCE($5, password_hash),
                role_id = $6,
                enabled = COALESCE($7, enabled),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&changes.username)
        .bind(&changes.email)
        .bind(&changes.full_name)
        .bind(&changes.password_hash)
        .bind(changes.role_id)
        .bind(changes.enabled)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| AppError::from_constraint(e, DUPLICATE_USERNAME))?;

        Ok(user)
    }

    /// 删除用户
    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
