//! # HTTP 服务
//!
//! 路由、处理器、认证中间件与统一响应格式

mod api_server;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;

pub use api_server::{ApiServer, AppState};
