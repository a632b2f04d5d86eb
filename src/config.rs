//! 配置系统
//! 从环境变量加载所有配置，使用 Secret 包装敏感信息

use config::{Config, ConfigError, Environment};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址，例如 "0.0.0.0:8080"
    pub addr: String,
    /// 优雅关闭超时时间（秒）
    pub graceful_shutdown_timeout_secs: u64,
    /// 请求体大小上限（字节）
    pub max_body_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// 数据库连接 URL（使用 Secret 包装，防止日志泄露）
    pub url: Secret<String>,
    pub max_connections: u32,
    pub min_connections: u32,
    /// 获取连接超时时间（秒）
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别: trace, debug, info, warn, error
    pub level: String,
    /// 日志格式: json, pretty
    pub format: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    /// JWT 密钥（HS256，至少 32 字符），必须显式配置
    pub jwt_secret: Secret<String>,
    /// 访问令牌过期时间（秒）
    pub access_token_exp_secs: u64,
    /// 用户管理接口所需的权限名
    pub user_manage_authority: String,
    /// 密码最小长度
    pub password_min_length: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub security: SecurityConfig,
}

impl AppConfig {
    /// 从环境变量加载配置
    pub fn from_env() -> Result<Self, ConfigError> {
        let config: AppConfig = Config::builder()
            .set_default("server.addr", "0.0.0.0:8080")?
            .set_default("server.graceful_shutdown_timeout_secs", 30)?
            .set_default("server.max_body_bytes", 64 * 1024)?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("database.acquire_timeout_secs", 30)?
            .set_default("database.idle_timeout_secs", 600)?
            .set_default("database.max_lifetime_secs", 1800)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "json")?
            .set_default("security.access_token_exp_secs", 900)?
            .set_default("security.user_manage_authority", "USER_MANAGE")?
            .set_default("security.password_min_length", 8)?
            // LOGIN_DATABASE__URL -> database.url
            .add_source(
                Environment::with_prefix("LOGIN")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;

        Ok(config)
    }

    /// 验证配置合法性
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.database.validate()?;
        self.logging.validate()?;
        self.security.validate()
    }
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::Message(message.into())
}

impl ServerConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        let port = self
            .addr
            .rsplit_once(':')
            .and_then(|(_, port)| port.parse::<u16>().ok())
            .ok_or_else(|| invalid(format!("Invalid server address: {}", self.addr)))?;

        // 0 表示随机端口（测试用）
        if port != 0 && port < 1024 {
            return Err(invalid("Server port should be >= 1024"));
        }
        if self.max_body_bytes == 0 {
            return Err(invalid("max_body_bytes must be positive"));
        }

        Ok(())
    }
}

impl DatabaseConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_connections == 0 || self.max_connections < self.min_connections {
            return Err(invalid(
                "max_connections must be positive and >= min_connections",
            ));
        }
        Ok(())
    }
}

impl LoggingConfig {
    const LEVELS: [&'static str; 5] = ["trace", "debug", "info", "warn", "error"];
    const FORMATS: [&'static str; 2] = ["json", "pretty"];

    fn validate(&self) -> Result<(), ConfigError> {
        let level = self.level.to_lowercase();
        if !Self::LEVELS.contains(&level.as_str()) {
            return Err(invalid(format!(
                "Invalid log level: {}. Must be one of: {}",
                self.level,
                Self::LEVELS.join(", ")
            )));
        }

        let format = self.format.to_lowercase();
        if !Self::FORMATS.contains(&format.as_str()) {
            return Err(invalid(format!(
                "Invalid log format: {}. Must be one of: {}",
                self.format,
                Self::FORMATS.join(", ")
            )));
        }

        Ok(())
    }
}

impl SecurityConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.expose_secret().len() < 32 {
            return Err(invalid("JWT secret must be at least 32 characters long"));
        }
        if !(60..=86_400).contains(&self.access_token_exp_secs) {
            return Err(invalid(
                "access_token_exp_secs must be between 60 and 86400 (1 minute to 24 hours)",
            ));
        }
        if self.user_manage_authority.trim().is_empty() {
            return Err(invalid("user_manage_authority must not be empty"));
        }
        if !(6..=128).contains(&self.password_min_length) {
            return Err(invalid("password_min_length must be between 6 and 128"));
        }

        Ok(())
    }
}
