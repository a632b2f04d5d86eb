//! 数据模型模块
//! 角色、权限与用户的实体及请求/响应 DTO

pub mod role;
pub mod user;
