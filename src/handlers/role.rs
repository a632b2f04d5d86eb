//! 角色与权限管理的 HTTP 处理器
//! 角色接口不做权限校验

use crate::{error::AppError, middleware::AppState, models::role::*};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

/// 列出角色
pub async fn list_roles(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<RoleResponse>>, AppError> {
    Ok(Json(state.role_service.list_roles().await?))
}

/// 获取角色详情
pub async fn get_role(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<RoleResponse>, AppError> {
    Ok(Json(state.role_service.get_role(id).await?))
}

/// 创建角色
pub async fn create_role(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RoleRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = payload?;
    let role = state.role_service.create_role(&req).await?;

    Ok((StatusCode::CREATED, Json(role)))
}

/// 更新角色
pub async fn update_role(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    payload: Result<Json<RoleRequest>, JsonRejection>,
) -> Result<Json<RoleResponse>, AppError> {
    let Json(req) = payload?;
    Ok(Json(state.role_service.update_role(id, &req).await?))
}

/// 删除角色
pub async fn delete_role(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.role_service.delete_role(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// 列出全部权限
pub async fn list_permissions(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<PermissionResponse>>, AppError> {
    Ok(Json(state.role_service.list_permissions().await?))
}

/// 为角色授予权限
pub async fn grant_permission(
    State(state): State<Arc<AppState>>,
    Path((id, permission_id)): Path<(i64, i64)>,
) -> Result<Json<RoleResponse>, AppError> {
    Ok(Json(
        state.role_service.grant_permission(id, permission_id).await?,
    ))
}

/// 撤销角色的权限
pub async fn revoke_permission(
    State(state): State<Arc<AppState>>,
    Path((id, permission_id)): Path<(i64, i64)>,
) -> Result<Json<RoleResponse>, AppError> {
    Ok(Json(
        state.role_service.revoke_permission(id, permission_id).await?,
    ))
}
