//! HTTP 处理器模块

pub mod health;
pub mod role;
pub mod user;
