//! 错误处理单元测试
//!
//! 测试应用错误类型的状态码、用户消息和响应格式

use axum::{http::StatusCode, response::IntoResponse};
use fan_gate::error::AppError;
use http_body_util::BodyExt;

#[test]
fn test_error_status_codes() {
    assert_eq!(AppError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        AppError::BadRequest("invalid".to_string()).status_code(),
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        AppError::DeviceUnavailable("timeout".to_string()).status_code(),
        StatusCode::SERVICE_UNAVAILABLE
    );
    assert_eq!(
        AppError::Config("missing key".to_string()).status_code(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
    assert_eq!(
        AppError::Internal("boom".to_string()).status_code(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}

#[test]
fn test_user_messages_hide_internal_detail() {
    let message = AppError::Config("FAN_SECURITY__JWT_SECRET missing".to_string()).user_message();
    assert_eq!(message, "Configuration error");
    assert!(!message.contains("JWT"));

    let message = AppError::DeviceUnavailable("error sending request for url".to_string()).user_message();
    assert_eq!(message, "Could not reach fan controller");
    assert!(!message.contains("url"));

    assert_eq!(
        AppError::BadRequest("Invalid command: toggle".to_string()).user_message(),
        "Invalid command: toggle"
    );
}

#[tokio::test]
async fn test_error_response_shape() {
    let response = AppError::Unauthorized.into_response();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(json["error"]["code"], 401);
    assert_eq!(json["error"]["message"], "Authentication failed");
    assert!(json["error"]["request_id"].is_string());
}

#[tokio::test]
async fn test_join_error_becomes_internal() {
    let handle = tokio::task::spawn_blocking(|| panic!("worker crashed"));
    let err: AppError = handle.await.unwrap_err().into();

    assert_eq!(err.code(), 500);
    assert_eq!(err.user_message(), "Internal server error");
}
