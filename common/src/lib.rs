//! 号码分配服务公共模块
//!
//! 提供各服务共享的基础组件：
//! - 统一错误类型与 HTTP 映射
//! - 环境变量配置
//! - 统一响应格式
//! - 请求 ID 中间件
//! - 数据模型与号码池工具

pub mod config;
pub mod errors;
pub mod middleware;
pub mod models;
pub mod response;
pub mod utils;
