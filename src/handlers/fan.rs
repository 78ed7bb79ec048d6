//! 风扇控制处理器
//! 两个端点都要求 Bearer 认证，由路由层的中间件保证

use crate::{
    auth::AuthContext,
    error::AppError,
    middleware::AppState,
    models::fan::{DisconnectedStatus, FanControlRequest},
};
use axum::{
    body::Bytes,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

/// 设备原始 JSON 响应体
fn device_body(body: String) -> Response {
    (StatusCode::OK, [(header::CONTENT_TYPE, "application/json")], body).into_response()
}

/// 设置风扇开关
pub async fn fan_control(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    body: Bytes,
) -> Result<Response, AppError> {
    let req: FanControlRequest = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("Bad Request: {}", e)))?;
    let command = req.parse_command().map_err(AppError::BadRequest)?;

    let body = state.fan_controller.set_state(command).await?;

    tracing::info!(subject = %auth_context.subject, command = %command, "Fan command relayed");

    Ok(device_body(body))
}

/// 查询风扇状态
/// 设备不可达时返回 503 与 disconnected 状态
pub async fn fan_status(State(state): State<Arc<AppState>>, _auth_context: AuthContext) -> Response {
    match state.fan_controller.status().await {
        Ok(body) => device_body(body),
        Err(e) => {
            tracing::warn!(error = %e, "Fan status unavailable");
            (StatusCode::SERVICE_UNAVAILABLE, Json(DisconnectedStatus::default())).into_response()
        }
    }
}
