//! 用户管理的 HTTP 处理器
//! 所有接口都要求调用方持有用户管理权限

use crate::{
    auth::middleware::AuthContext,
    error::AppError,
    middleware::AppState,
    models::user::*,
};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

fn require_user_manage(state: &AppState, auth_context: &AuthContext) -> Result<(), AppError> {
    auth_context.require_authority(&state.config.security.user_manage_authority)
}

/// 列出用户
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    require_user_manage(&state, &auth_context)?;

    Ok(Json(state.user_service.list_users().await?))
}

/// 获取用户详情
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    Path(id): Path<i64>,
) -> Result<Json<UserResponse>, AppError> {
    require_user_manage(&state, &auth_context)?;

    Ok(Json(state.user_service.get_user(id).await?))
}

/// 按用户名获取用户
pub async fn get_user_by_username(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    Path(username): Path<String>,
) -> Result<Json<UserResponse>, AppError> {
    require_user_manage(&state, &auth_context)?;

    Ok(Json(
        state.user_service.get_user_by_username(&username).await?,
    ))
}

/// 创建用户
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    require_user_manage(&state, &auth_context)?;
    let Json(req) = payload?;

    let user = state.user_service.create_user(&req).await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// 更新用户
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    Path(id): Path<i64>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<Json<UserResponse>, AppError> {
    require_user_manage(&state, &auth_context)?;
    let Json(req) = payload?;

    Ok(Json(state.user_service.update_user(id, &req).await?))
}

/// 删除用户
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    require_user_manage(&state, &auth_context)?;

    state.user_service.delete_user(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
