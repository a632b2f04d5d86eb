//! HTTP 中间件与应用状态
//! 请求追踪：trace_id / request_id、日志与指标

use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

use crate::{
    auth::{JwtService, PasswordHasher},
    config::AppConfig,
    db::ReadinessCheck,
    error::AppError,
    repository::{PgRoleRepository, PgUserRepository, RoleRepository, UserRepository},
    services::{RoleService, UserService},
};

/// 应用状态
///
/// 服务使用 Arc 包装，多个请求共享同一实例，Clone 只是指针拷贝
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub role_service: Arc<RoleService>,
    pub user_service: Arc<UserService>,
    pub jwt_service: Arc<JwtService>,
    pub health: Arc<dyn ReadinessCheck>,
}

impl AppState {
    /// 基于 PostgreSQL 连接池构建完整状态
    pub fn new(config: AppConfig, pool: PgPool) -> Result<Self, AppError> {
        Self::with_repositories(
            config,
            Arc::new(PgRoleRepository::new(pool.clone())),
            Arc::new(PgUserRepository::new(pool.clone())),
            PasswordHasher::new(),
            Arc::new(pool),
        )
    }

    /// 使用任意仓库实现构建状态
    pub fn with_repositories(
        config: AppConfig,
        role_repo: Arc<dyn RoleRepository>,
        user_repo: Arc<dyn UserRepository>,
        hasher: PasswordHasher,
        health: Arc<dyn ReadinessCheck>,
    ) -> Result<Self, AppError> {
        let jwt_service = Arc::new(JwtService::from_config(&config.security)?);
        let role_service = Arc::new(RoleService::new(role_repo));
        let user_service = Arc::new(UserService::new(
            user_repo,
            hasher,
            config.security.password_min_length,
        ));

        Ok(Self {
            config,
            role_service,
            user_service,
            jwt_service,
            health,
        })
    }
}

tokio::task_local! {
    static REQUEST_ID: String;
}

/// 当前请求的 request_id；在请求追踪中间件之外调用时为 None
pub fn current_request_id() -> Option<String> {
    REQUEST_ID.try_with(|id| id.clone()).ok()
}

/// 请求追踪中间件
/// 为每个请求生成 trace_id 和 request_id，并记录指标。
/// request_id 在处理期间可通过 [`current_request_id`] 读取，错误响应体使用同一个值。
pub async fn request_tracking_middleware(req: Request, next: Next) -> Response {
    let trace_id = extract_or_generate_trace_id(req.headers());
    let request_id = Uuid::new_v4().to_string();

    let method = req.method().to_string();
    let uri = req.uri().to_string();

    let span = tracing::info_span!(
        "http_request",
        trace_id = %trace_id,
        request_id = %request_id,
        method = %method,
        uri = %uri,
    );

    async move {
        let start = Instant::now();

        let mut response = REQUEST_ID.scope(request_id.clone(), next.run(req)).await;

        let elapsed = start.elapsed();
        let status = response.status().as_u16();

        // 指标标签只使用静态字符串
        let method_label = match method.as_str() {
            "GET" => "GET",
            "POST" => "POST",
            "PUT" => "PUT",
            "DELETE" => "DELETE",
            "PATCH" => "PATCH",
            _ => "UNKNOWN",
        };
        let status_label = match status {
            200 => "200",
            201 => "201",
            204 => "204",
            400 => "400",
            401 => "401",
            403 => "403",
            404 => "404",
            409 => "409",
            500 => "500",
            _ => "other",
        };

        metrics::counter!("http_requests_total", "method" => method_label, "status" => status_label)
            .increment(1);
        metrics::histogram!("http_request_duration_seconds").record(elapsed.as_secs_f64());

        tracing::info!(
            method = %method,
            uri = %uri,
            status = status,
            elapsed_ms = elapsed.as_millis() as u64,
            "Request completed"
        );

        if let Ok(value) = HeaderValue::from_str(&trace_id) {
            response.headers_mut().insert("x-trace-id", value);
        }
        if let Ok(value) = HeaderValue::from_str(&request_id) {
            response.headers_mut().insert("x-request-id", value);
        }

        response
    }
    .instrument(span)
    .await
}

/// 从请求头中提取或生成 trace_id
fn extract_or_generate_trace_id(headers: &HeaderMap) -> String {
    headers
        .get("x-trace-id")
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}
