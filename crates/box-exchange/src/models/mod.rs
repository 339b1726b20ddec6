//! 领域模型
//!
//! - `enums`: 宝箱类型与记录状态
//! - `user`: 用户与用户名册
//! - `inventory`: 宝箱库存
//! - `history`: 兑换记录与全局日志
//! - `settings`: 系统设置
//! - `snapshot`: 完整状态、导出文档与本地备份

mod enums;
mod history;
mod inventory;
mod settings;
mod snapshot;
mod user;

pub use enums::{BoxType, ExchangeStatus};
pub use history::{ExchangeLog, ExchangeRecord};
pub use inventory::{BoxInventory, BoxSpec};
pub use settings::SystemSettings;
pub use snapshot::{ExchangeState, ExportDocument, LocalBackup};
pub use user::{User, UserRoster};
