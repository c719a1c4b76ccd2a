//! # 中间件

pub mod auth;

pub use auth::{AuthContext, require_auth};
