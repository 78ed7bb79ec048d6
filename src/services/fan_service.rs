//! 风扇控制器中继
//! 将已认证的命令和状态查询转发到设备的 HTTP 接口

use crate::{config::AppConfig, error::AppError, models::fan::{DeviceStateRequest, FanCommand}};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use std::time::Duration;
use thiserror::Error;

/// 设备认证头
pub const DEVICE_AUTH_HEADER: &str = "X-Auth-Token";

/// 设备通信错误
#[derive(Debug, Error)]
pub enum DeviceError {
    /// 网络错误、超时或响应体读取失败
    #[error("fan controller unreachable: {0}")]
    Unreachable(String),

    #[error("fan controller returned status {0}")]
    Status(u16),
}

impl From<DeviceError> for AppError {
    fn from(e: DeviceError) -> Self {
        AppError::DeviceUnavailable(e.to_string())
    }
}

/// 风扇控制器抽象，路由只依赖此 trait
#[async_trait]
pub trait FanController: Send + Sync {
    /// 设置风扇状态，返回设备原始响应体
    async fn set_state(&self, command: FanCommand) -> Result<String, DeviceError>;

    /// 查询风扇状态，返回设备原始响应体
    async fn status(&self) -> Result<String, DeviceError>;
}

/// 基于 reqwest 的设备客户端
pub struct HttpFanController {
    client: Client,
    base_url: String,
    auth_token: Secret<String>,
}

impl HttpFanController {
    pub fn new(addr: &str, auth_token: Secret<String>, timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build device HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url(addr),
            auth_token,
        })
    }

    /// 从配置创建
    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        Self::new(
            &config.device.addr,
            config.device.auth_token.clone(),
            Duration::from_secs(config.device.timeout_secs),
        )
    }

    async fn read_body(response: reqwest::Response) -> Result<String, DeviceError> {
        let status = response.status();
        if !status.is_success() {
            return Err(DeviceError::Status(status.as_u16()));
        }

        response
            .text()
            .await
            .map_err(|e| DeviceError::Unreachable(e.to_string()))
    }
}

#[async_trait]
impl FanController for HttpFanController {
    async fn set_state(&self, command: FanCommand) -> Result<String, DeviceError> {
        tracing::debug!(command = %command, "Sending command to fan controller");

        let response = self
            .client
            .post(format!("{}/fan", self.base_url))
            .header(DEVICE_AUTH_HEADER, self.auth_token.expose_secret())
            .json(&DeviceStateRequest { state: command })
            .send()
            .await
            .map_err(|e| DeviceError::Unreachable(e.to_string()))?;

        Self::read_body(response).await
    }

    async fn status(&self) -> Result<String, DeviceError> {
        let response = self
            .client
            .get(format!("{}/status", self.base_url))
            .header(DEVICE_AUTH_HEADER, self.auth_token.expose_secret())
            .send()
            .await
            .map_err(|e| DeviceError::Unreachable(e.to_string()))?;

        Self::read_body(response).await
    }
}

/// 裸地址默认使用 http://
fn base_url(addr: &str) -> String {
    let addr = addr.trim().trim_end_matches('/');
    if addr.starts_with("http://") || addr.starts_with("https://") {
        addr.to_string()
    } else {
        format!("http://{}", addr)
    }
}
