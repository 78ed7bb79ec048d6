//! 路由注册
//! 创建所有 API 路由并应用中间件

use axum::{
    http::{header, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
};

use crate::{auth::middleware::bearer_auth_middleware, handlers, middleware::AppState};

/// 请求体上限，登录和控制命令都很小
const MAX_BODY_BYTES: usize = 16 * 1024;

/// 创建应用路由
pub fn create_router(state: Arc<AppState>) -> Router {
    // 公开端点
    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/api/auth", post(handlers::auth::login));

    // 需要 Bearer 认证的路由
    // route_layer 只包裹已注册的路由，未知路径仍然返回 404
    let authenticated_routes = Router::new()
        .route("/api/fan-control", post(handlers::fan::fan_control))
        .route("/api/fan-status", get(handlers::fan::fan_status))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            bearer_auth_middleware,
        ));

    // 组合所有路由；CORS 在最外层，预检请求不经过认证
    Router::new()
        .merge(public_routes)
        .merge(authenticated_routes)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(axum::middleware::from_fn(crate::middleware::request_tracking_middleware))
        .layer(cors_layer())
        .with_state(state)
}

/// 浏览器前端跨域配置
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}
