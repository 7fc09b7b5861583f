//! 共享库
//!
//! 包含模拟器共用的配置、错误处理、日志与指标等基础设施代码。

pub mod config;
pub mod error;
pub mod observability;
