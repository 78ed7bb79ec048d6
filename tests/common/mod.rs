//! 测试公共模块
//! 提供测试配置、替身设备和辅助函数

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{body::Body, http::Response};
use fan_gate::{
    auth::{CredentialVerifier, Pbkdf2Scheme, StoredCredential, TokenIssuer},
    config::{AppConfig, DeviceConfig, LoggingConfig, SecurityConfig, ServerConfig},
    middleware::AppState,
    models::fan::FanCommand,
    services::{DeviceError, FanController},
};
use http_body_util::BodyExt;
use secrecy::Secret;
use std::sync::{Arc, Mutex};

pub const TEST_JWT_SECRET: &str = "test-secret-key-for-testing-only-min-32-chars";

pub const TEST_PASSWORD: &str = "letmein";

/// PBKDF2-HMAC-SHA256("letmein", "integration-salt", 1000)
pub const TEST_PASSWORD_RECORD: &str =
    "aW50ZWdyYXRpb24tc2FsdA==:1000:QsQ6/JRMP5jiiiuDAKB6/ah6qWneAHzNEeiKUbzB1Qc=";

/// 创建测试配置
pub fn create_test_config() -> AppConfig {
    AppConfig {
        server: ServerConfig {
            addr: "127.0.0.1:0".to_string(),
            graceful_shutdown_timeout_secs: 5,
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
            format: "pretty".to_string(),
        },
        security: SecurityConfig {
            jwt_secret: Secret::new(TEST_JWT_SECRET.to_string()),
            admin_password_hash: Secret::new(TEST_PASSWORD_RECORD.to_string()),
            password_scheme: "pbkdf2".to_string(),
        },
        device: DeviceConfig {
            addr: "127.0.0.1:9".to_string(),
            auth_token: Secret::new("device-token".to_string()),
            timeout_secs: 1,
        },
    }
}

/// 替身风扇控制器：记录收到的命令，按配置返回成功或失败
pub struct StubFan {
    pub commands: Mutex<Vec<FanCommand>>,
    pub reachable: bool,
}

impl StubFan {
    pub fn online() -> Arc<Self> {
        Arc::new(Self {
            commands: Mutex::new(Vec::new()),
            reachable: true,
        })
    }

    pub fn offline() -> Arc<Self> {
        Arc::new(Self {
            commands: Mutex::new(Vec::new()),
            reachable: false,
        })
    }

    pub fn received(&self) -> Vec<FanCommand> {
        self.commands.lock().unwrap().clone()
    }
}

#[async_trait]
impl FanController for StubFan {
    async fn set_state(&self, command: FanCommand) -> Result<String, DeviceError> {
        if !self.reachable {
            return Err(DeviceError::Unreachable("connection refused".to_string()));
        }
        self.commands.lock().unwrap().push(command);
        Ok(format!(r#"{{"state":"{}"}}"#, command))
    }

    async fn status(&self) -> Result<String, DeviceError> {
        if !self.reachable {
            return Err(DeviceError::Unreachable("connection refused".to_string()));
        }
        let state = match self.commands.lock().unwrap().last() {
            Some(FanCommand::On) => "on",
            _ => "off",
        };
        Ok(format!(r#"{{"state":"{}","uptime":42}}"#, state))
    }
}

/// 创建测试应用状态
pub fn create_test_app_state(fan: Arc<dyn FanController>) -> Arc<AppState> {
    let verifier = CredentialVerifier::new(
        StoredCredential::new(TEST_PASSWORD_RECORD),
        Box::new(Pbkdf2Scheme),
    );
    let issuer = TokenIssuer::new(TEST_JWT_SECRET.as_bytes()).expect("Failed to create token issuer");

    Arc::new(AppState::new(verifier, issuer, fan))
}

/// 读取 JSON 响应体
pub async fn read_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
