//! 共享库
//!
//! 包含宝箱兑换系统共用的配置、错误处理、可观测性以及键值存储等基础设施代码。

pub mod config;
pub mod error;
pub mod observability;
pub mod storage;
