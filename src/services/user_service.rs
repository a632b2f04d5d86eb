//! 用户服务
//! 用户的增删改查；密码使用 Argon2id 哈希后存储

use crate::{
    auth::PasswordHasher,
    error::AppError,
    models::user::*,
    repository::UserRepository,
};
use std::sync::Arc;
use validator::Validate;

pub struct UserService {
    repo: Arc<dyn UserRepository>,
    hasher: PasswordHasher,
    password_min_length: usize,
}

impl UserService {
    pub fn new(
        repo: Arc<dyn UserRepository>,
        hasher: PasswordHasher,
        password_min_length: usize,
    ) -> Self {
        Self {
            repo,
            hasher,
            password_min_length,
        }
    }

    pub async fn list_users(&self) -> Result<Vec<UserResponse>, AppError> {
        let users = self.repo.list().await?;
        Ok(users.into_iter().map(UserResponse::from).collect())
    }

    pub async fn get_user(&self, id: i64) -> Result<UserResponse, AppError> {
        let user = self.repo.find_by_id(id).await?.ok_or(AppError::NotFound)?;
        Ok(user.into())
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<UserResponse, AppError> {
        let user = self
            .repo
            .find_by_username(username)
            .await?
            .ok_or(AppError::NotFound)?;
        Ok(user.into())
    }

    /// 创建用户；用户名重复时返回 Conflict
    pub async fn create_user(&self, req: &CreateUserRequest) -> Result<UserResponse, AppError> {
        req.validate()?;
        PasswordHasher::validate_password_policy(&req.password, self.password_min_length)?;

        let new_user = NewUser {
            username: req.username.clone(),
            email: req.email.clone(),
            full_name: req.full_name.clone(),
            password_hash: self.hasher.hash(&req.password)?,
            role_id: req.role_id,
        };

        let user = self.repo.create(&new_user).await.map_err(|e| {
            if matches!(e, AppError::Conflict(_)) {
                tracing::info!(username = %new_user.username, "Duplicate username rejected");
            }
            e
        })?;

        tracing::info!(user_id = user.id, username = %user.username, "User created");

        Ok(user.into())
    }

    /// 整体覆盖用户信息；用户不存在时返回 NotFound
    pub async fn update_user(
        &self,
        id: i64,
        req: &UpdateUserRequest,
    ) -> Result<UserResponse, AppError> {
        req.validate()?;

        let password_hash = match &req.password {
            Some(password) => {
                PasswordHasher::validate_password_policy(password, self.password_min_length)?;
                Some(self.hasher.hash(password)?)
            }
            None => None,
        };

        let changes = UserChanges {
            username: req.username.clone(),
            email: req.email.clone(),
            full_name: req.full_name.clone(),
            password_hash,
            role_id: req.role_id,
            enabled: req.enabled,
        };

        let user = self
            .repo
            .update(id, &changes)
            .await?
            .ok_or(AppError::NotFound)?;

        tracing::info!(user_id = user.id, username = %user.username, "User updated");

        Ok(user.into())
    }

    pub async fn delete_user(&self, id: i64) -> Result<(), AppError> {
        if !self.repo.delete(id).await? {
            return Err(AppError::NotFound);
        }

        tracing::info!(user_id = id, "User deleted");
        Ok(())
    }
}
