//! HTTP 中间件
//! 应用状态与请求追踪

use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

use crate::{
    auth::{CredentialVerifier, TokenIssuer},
    config::AppConfig,
    error::AppError,
    services::{AuthService, FanController, HttpFanController},
};

/// 应用状态
///
/// 启动时构建一次，之后只读；服务用 Arc 包装以便在请求间共享
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub token_issuer: Arc<TokenIssuer>,
    pub fan_controller: Arc<dyn FanController>,
}

impl AppState {
    /// 用显式组件构建（测试中可注入替身设备）
    pub fn new(
        verifier: CredentialVerifier,
        token_issuer: TokenIssuer,
        fan_controller: Arc<dyn FanController>,
    ) -> Self {
        let token_issuer = Arc::new(token_issuer);
        let auth_service = Arc::new(AuthService::new(Arc::new(verifier), token_issuer.clone()));

        Self {
            auth_service,
            token_issuer,
            fan_controller,
        }
    }

    /// 从配置构建全部组件；配置缺失或非法时返回错误并中止启动
    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let verifier = CredentialVerifier::from_config(config)?;
        let token_issuer = TokenIssuer::from_config(config)?;
        let fan_controller: Arc<dyn FanController> =
            Arc::new(HttpFanController::from_config(config)?);

        tracing::info!(
            scheme = verifier.scheme_name(),
            device = %config.device.addr,
            "Application state initialized"
        );

        Ok(Self::new(verifier, token_issuer, fan_controller))
    }
}

/// 请求追踪中间件
/// 为每个请求生成 trace_id 和 request_id，并记录指标
pub async fn request_tracking_middleware(req: Request, next: Next) -> Response {
    let trace_id = extract_or_generate_trace_id(req.headers());
    let request_id = Uuid::new_v4().to_string();

    let method = req.method().to_string();
    let uri = req.uri().path().to_string();

    let span = tracing::info_span!(
        "http_request",
        trace_id = %trace_id,
        request_id = %request_id,
        method = %method,
        uri = %uri,
    );

    async move {
        let start = Instant::now();

        let mut response = next.run(req).await;

        let elapsed = start.elapsed();

        // 指标标签使用静态字符串
        let status = response.status().as_u16();
        let method_name = match method.as_str() {
            "GET" => "GET",
            "POST" => "POST",
            "OPTIONS" => "OPTIONS",
            _ => "UNKNOWN",
        };
        let status_code = match status {
            200 => "200",
            204 => "204",
            400 => "400",
            401 => "401",
            404 => "404",
            500 => "500",
            503 => "503",
            _ => "other",
        };

        metrics::counter!("http_requests_total", "method" => method_name, "status" => status_code)
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
