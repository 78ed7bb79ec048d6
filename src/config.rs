//! 配置系统
//! 从环境变量加载所有配置，使用 Secret 包装敏感信息

use config::{Config, ConfigError, Environment};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址，例如 "0.0.0.0:3000"
    pub addr: String,
    /// 优雅关闭超时时间（秒）
    pub graceful_shutdown_timeout_secs: u64,
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
    /// JWT 签名密钥（使用 Secret 包装，防止日志泄露）
    pub jwt_secret: Secret<String>,
    /// 管理员密码哈希记录，格式 `salt:iterations:key`（或 argon2 PHC 字符串）
    pub admin_password_hash: Secret<String>,
    /// 密码哈希方案: pbkdf2, argon2
    pub password_scheme: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeviceConfig {
    /// 风扇控制器地址，例如 "192.168.1.50" 或 "192.168.1.50:8080"
    pub addr: String,
    /// 设备静态认证令牌，随每个请求以 X-Auth-Token 头发送
    pub auth_token: Secret<String>,
    /// 设备请求超时时间（秒）
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub security: SecurityConfig,
    pub device: DeviceConfig,
}

impl AppConfig {
    /// 从环境变量加载配置
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut settings = Config::builder();

        // 添加默认配置
        // jwt_secret / admin_password_hash / device.addr 没有默认值，缺失时启动失败
        settings = settings
            .set_default("server.addr", "0.0.0.0:3000")?
            .set_default("server.graceful_shutdown_timeout_secs", 30)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "json")?
            .set_default("security.password_scheme", "pbkdf2")?
            .set_default("device.auth_token", "")?
            .set_default("device.timeout_secs", 5)?;

        // 从环境变量加载配置（前缀为 FAN_）
        // 不开启 try_parsing：密钥和令牌必须按原样保留，数值字段在反序列化时再转换
        settings = settings.add_source(
            Environment::with_prefix("FAN")
                .prefix_separator("_")
                .separator("__"),
        );

        let config: AppConfig = settings.build()?.try_deserialize()?;

        // 验证配置
        config.validate()?;

        Ok(config)
    }

    /// 验证配置合法性
    fn validate(&self) -> Result<(), ConfigError> {
        // 验证日志级别
        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::Message(format!(
                    "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                    self.logging.level
                )))
            }
        }

        // 验证日志格式
        match self.logging.format.to_lowercase().as_str() {
            "json" | "pretty" => {}
            _ => {
                return Err(ConfigError::Message(format!(
                    "Invalid log format: {}. Must be one of: json, pretty",
                    self.logging.format
                )))
            }
        }

        if self.security.jwt_secret.expose_secret().is_empty() {
            return Err(ConfigError::Message("JWT secret must not be empty".to_string()));
        }

        if self.security.admin_password_hash.expose_secret().trim().is_empty() {
            return Err(ConfigError::Message(
                "Admin password hash must not be empty".to_string(),
            ));
        }

        match self.security.password_scheme.to_lowercase().as_str() {
            "pbkdf2" | "argon2" => {}
            _ => {
                return Err(ConfigError::Message(format!(
                    "Invalid password scheme: {}. Must be one of: pbkdf2, argon2",
                    self.security.password_scheme
                )))
            }
        }

        if self.device.addr.trim().is_empty() {
            return Err(ConfigError::Message("Device address must not be empty".to_string()));
        }

        if self.device.timeout_secs < 1 || self.device.timeout_secs > 60 {
            return Err(ConfigError::Message(
                "device.timeout_secs must be between 1 and 60".to_string(),
            ));
        }

        Ok(())
    }
}
