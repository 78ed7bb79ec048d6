//! 风扇远程控制网关
//! 管理员密码校验、访问令牌签发与设备中继

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod telemetry;
