//! 服务层
//!
//! 实现兑换业务逻辑，协调规则引擎、仓储层和远程备份。
//!
//! ## 模块结构
//!
//! - `dto`: 数据传输对象定义
//! - `exchange_service`: 宝箱兑换
//! - `session_service`: 注册与登录
//! - `snapshot_service`: 导出导入、本地备份与统计

pub mod dto;
mod exchange_service;
mod session_service;
mod snapshot_service;

pub use dto::*;
pub use exchange_service::ExchangeService;
pub use session_service::SessionService;
pub use snapshot_service::{SnapshotService, validate_state};
