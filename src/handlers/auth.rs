//! 认证相关的 HTTP 处理器

use crate::{error::AppError, middleware::AppState, models::auth::LoginRequest};
use axum::{body::Bytes, extract::State, response::IntoResponse, Json};
use std::sync::Arc;

/// 登录
/// 请求体无法解析时返回通用 500，密码错误或缺失返回 401
pub async fn login(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let req: LoginRequest = serde_json::from_slice(&body)
        .map_err(|e| AppError::Internal(format!("Malformed login payload: {}", e)))?;

    let response = state.auth_service.login(req).await?;

    Ok(Json(response))
}
