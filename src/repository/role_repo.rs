//! Role repository (角色数据访问)

use crate::{error::AppError, models::role::*};
use async_trait::async_trait;
use sqlx::PgPool;

/// 角色与权限关联的存储接口
#[async_trait]
pub trait RoleRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Role>, AppError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Role>, AppError>;
    async fn create(&self, req: &RoleRequest) -> Result<Role, AppError>;
    /// Returns `None` when no role has this id.
    async fn update(&self, id: i64, req: &RoleRequest) -> Result<Option<Role>, AppError>;
    /// Returns `true` when a row was deleted.
    async fn delete(&self, id: i64) -> Result<bool, AppError>;

    /// Grants for the given roles, ordered by role then permission id.
    async fn permissions_for_roles(
        &self,
        role_ids: &[i64],
    ) -> Result<Vec<RolePermissionGrant>, AppError>;
    async fn list_permissions(&self) -> Result<Vec<Permission>, AppError>;
    async fn find_permission(&self, id: i64) -> Result<Option<Permission>, AppError>;
    /// Idempotent; granting an existing pair is a no-op.
    async fn add_permission_to_role(&self, role_id: i64, permission_id: i64)
        -> Result<(), AppError>;
    /// Returns `true` when the association existed.
    async fn remove_permission_from_role(
        &self,
        role_id: i64,
        permission_id: i64,
    ) -> Result<bool, AppError>;
}

pub struct PgRoleRepository {
    db: PgPool,
}

impl PgRoleRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RoleRepository for PgRoleRepository {
    // ==================== Roles ====================

    /// 列出所有角色
    async fn list(&self) -> Result<Vec<Role>, AppError> {
        let roles = sqlx::query_as::<_, Role>("SELECT * FROM roles ORDER BY id")
            .fetch_all(&self.db)
            .await?;

        Ok(roles)
    }

    /// 根据 ID 查找角色
    async fn find_by_id(&self, id: i64) -> Result<Option<Role>, AppError> {
        let role = sqlx::query_as::<_, Role>("SELECT * FROM roles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        Ok(role)
    }

    /// 创建角色
    async fn create(&self, req: &RoleRequest) -> Result<Role, AppError> {
        let role = sqlx::query_as::<_, Role>(
            r#"
            INSERT INTO roles (name, description)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(&req.name)
        .bind(&req.description)
        .fetch_one(&self.db)
        .await?;

        Ok(role)
    }

    /// 更新角色（整体覆盖名称与描述）
    async fn update(&self, id: i64, req: &RoleRequest) -> Result<Option<Role>, AppError> {
        let role = sqlx::query_as::<_, Role>(
            r#"
            UPDATE roles
            SET
                name = $2,
                description = $3,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&req.name)
        .bind(&req.description)
        .fetch_optional(&self.db)
        .await?;

        Ok(role)
    }

    /// 删除角色，关联的 role_permissions 由外键级联删除
    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM roles WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // ==================== Permissions ====================

    /// 批量获取角色的权限
    async fn permissions_for_roles(
        &self,
        role_ids: &[i64],
    ) -> Result<Vec<RolePermissionGrant>, AppError> {
        if role_ids.is_empty() {
            return Ok(Vec::new());
        }

        let grants = sqlx::query_as::<_, RolePermissionGrant>(
            r#"
            SELECT rp.role_id, p.id AS permission_id, p.name, p.description
            FROM role_permissions rp
            JOIN permissions p ON p.id = rp.permission_id
            WHERE rp.role_id = ANY($1)
            ORDER BY rp.role_id, p.id
            "#,
        )
        .bind(role_ids)
        .fetch_all(&self.db)
        .await?;

        Ok(grants)
    }

    /// 列出所有权限
    async fn list_permissions(&self) -> Result<Vec<Permission>, AppError> {
        let permissions = sqlx::query_as::<_, Permission>("SELECT * FROM permissions ORDER BY id")
            .fetch_all(&self.db)
            .await?;

        Ok(permissions)
    }

    async fn find_permission(&self, id: i64) -> Result<Option<Permission>, AppError> {
        let permission = sqlx::query_as::<_, Permission>("SELECT * FROM permissions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        Ok(permission)
    }

    /// 为角色添加权限
    async fn add_permission_to_role(
        &self,
        role_id: i64,
        permission_id: i64,
    ) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO role_permissions (role_id, permission_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(role_id)
        .bind(permission_id)
        .execute(&self.db)
        .await
        .map_err(|e| AppError::from_constraint(e, "Permission already granted"))?;

        Ok(())
    }

    /// 从角色移除权限
    async fn remove_permission_from_role(
        &self,
        role_id: i64,
        permission_id: i64,
    ) -> Result<bool, AppError> {
        let result =
            sqlx::query("DELETE FROM role_permissions WHERE role_id = $1 AND permission_id = $2")
                .bind(role_id)
                .bind(permission_id)
                .execute(&self.db)
                .await?;

        Ok(result.rows_affected() > 0)
    }
}
