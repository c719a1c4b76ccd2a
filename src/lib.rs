//! # Exercise API Library
//!
//! 编程练习平台后端核心库：第三方 OAuth 登录、会话令牌、练习目录与提交记录

pub mod app;
pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod exercises;
pub mod logging;
pub mod server;
pub mod submissions;
pub mod testing;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{AppError, Result};
