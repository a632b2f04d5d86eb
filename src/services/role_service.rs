//! 角色服务
//! 角色的增删改查，以及角色-权限关联的维护

use crate::{
    error::AppError,
    models::role::*,
    repository::RoleRepository,
};
use std::sync::Arc;

pub struct RoleService {
    repo: Arc<dyn RoleRepository>,
}

impl RoleService {
    pub fn new(repo: Arc<dyn RoleRepository>) -> Self {
        Self { repo }
    }

    /// 列出所有角色及其权限
    pub async fn list_roles(&self) -> Result<Vec<RoleResponse>, AppError> {
        let roles = self.repo.list().await?;
        let ids: Vec<i64> = roles.iter().map(|r| r.id).collect();
        let grants = self.repo.permissions_for_roles(&ids).await?;

        Ok(project_roles(roles, grants))
    }

    pub async fn get_role(&self, id: i64) -> Result<RoleResponse, AppError> {
        let role = self.repo.find_by_id(id).await?.ok_or(AppError::NotFound)?;
        self.project(role).await
    }

    pub async fn create_role(&self, req: &RoleRequest) -> Result<RoleResponse, AppError> {
        req.validate_request()?;
        let role = self.repo.create(req).await?;

        tracing::info!(role_id = role.id, name = %role.name, "Role created");

        // 新角色没有任何权限
        Ok(RoleResponse::project(role, Vec::new()))
    }

    /// 覆盖名称与描述；角色不存在时返回 NotFound，不会新建
    pub async fn update_role(&self, id: i64, req: &RoleRequest) -> Result<RoleResponse, AppError> {
        req.validate_request()?;
        let role = self.repo.update(id, req).await?.ok_or(AppError::NotFound)?;

        tracing::info!(role_id = role.id, name = %role.name, "Role updated");

        self.project(role).await
    }

    pub async fn delete_role(&self, id: i64) -> Result<(), AppError> {
        if !self.repo.delete(id).await? {
            return Err(AppError::NotFound);
        }

        tracing::info!(role_id = id, "Role deleted");
        Ok(())
    }

    // ==================== Permissions ====================

    pub async fn list_permissions(&self) -> Result<Vec<PermissionResponse>, AppError> {
        let permissions = self.repo.list_permissions().await?;
        Ok(permissions.into_iter().map(PermissionResponse::from).collect())
    }

    /// 为角色授予权限（幂等）
    pub async fn grant_permission(
        &self,
        role_id: i64,
        permission_id: i64,
    ) -> Result<RoleResponse, AppError> {
        let role = self.repo.find_by_id(role_id).await?.ok_or(AppError::NotFound)?;
        self.repo
            .find_permission(permission_id)
            .await?
            .ok_or(AppError::NotFound)?;

        self.repo.add_permission_to_role(role_id, permission_id).await?;

        tracing::info!(role_id, permission_id, "Permission granted to role");

        self.project(role).await
    }

    /// 撤销角色的权限；角色或关联不存在时返回 NotFound
    pub async fn revoke_permission(
        &self,
        role_id: i64,
        permission_id: i64,
    ) -> Result<RoleResponse, AppError> {
        let role = self.repo.find_by_id(role_id).await?.ok_or(AppError::NotFound)?;

        if !self
            .repo
            .remove_permission_from_role(role_id, permission_id)
            .await?
        {
            return Err(AppError::NotFound);
        }

        tracing::info!(role_id, permission_id, "Permission revoked from role");

        self.project(role).await
    }

    async fn project(&self, role: Role) -> Result<RoleResponse, AppError> {
        let grants = self.repo.permissions_for_roles(&[role.id]).await?;
        Ok(RoleResponse::project(role, grants))
    }
}
