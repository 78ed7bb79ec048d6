//! Business logic services layer

pub mod auth_service;
pub mod fan_service;

pub use auth_service::AuthService;
pub use fan_service::{DeviceError, FanController, HttpFanController};
