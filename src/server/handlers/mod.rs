//! # 请求处理器

pub mod auth;
pub mod exercises;
pub mod submissions;
pub mod system;
