//! 全量状态与快照定义
//!
//! 包含内存中的完整状态、导出文档和本地备份三种形态

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::history::ExchangeLog;
use super::inventory::BoxInventory;
use super::settings::SystemSettings;
use super::user::UserRoster;

/// 内存中的完整业务状态
///
/// 启动时整体加载，每次变更后按聚合整体保存
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeState {
    pub users: UserRoster,
    pub boxes: BoxInventory,
    pub history: ExchangeLog,
    pub system: SystemSettings,
}

/// 导出文档
///
/// 四个聚合加导出时间，作为可下载的 JSON 文件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub users: UserRoster,
    pub boxes: BoxInventory,
    pub exchange_history: ExchangeLog,
    pub system: SystemSettings,
    pub export_date: DateTime<Utc>,
}

impl ExportDocument {
    pub fn from_state(state: &ExchangeState, now: DateTime<Utc>) -> Self {
        Self {
            users: state.users.clone(),
            boxes: state.boxes.clone(),
            exchange_history: state.history.clone(),
            system: state.system.clone(),
            export_date: now,
        }
    }

    /// 导出文件名，按日期命名
    pub fn file_name(date: NaiveDate) -> String {
        format!("box-exchange-backup-{}.json", date.format("%Y-%m-%d"))
    }

    pub fn into_state(self) -> ExchangeState {
        ExchangeState {
            users: self.users,
            boxes: self.boxes,
            history: self.exchange_history,
            system: self.system,
        }
    }
}

/// 本地备份
///
/// 恢复时缺失的聚合保留当前值
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalBackup {
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub users: Option<UserRoster>,
    #[serde(default)]
    pub boxes: Option<BoxInventory>,
    #[serde(default)]
    pub exchange_history: Option<ExchangeLog>,
    #[serde(default)]
    pub system: Option<SystemSettings>,
}

impl LocalBackup {
    pub fn from_state(state: &ExchangeState, now: DateTime<Utc>) -> Self {
        Self {
            timestamp: now,
            users: Some(state.users.clone()),
            boxes: Some(state.boxes.clone()),
            exchange_history: Some(state.history.clone()),
            system: Some(state.system.clone()),
        }
    }

    /// 以备份覆盖当前状态，备份中缺失的聚合保持不变
    pub fn merge_into(self, current: &ExchangeState) -> ExchangeState {
        ExchangeState {
            users: self.users.unwrap_or_else(|| current.users.clone()),
            boxes: self.boxes.unwrap_or_else(|| current.boxes.clone()),
            history: self
                .exchange_history
                .unwrap_or_else(|| current.history.clone()),
            system: self.system.unwrap_or_else(|| current.system.clone()),
        }
    }
}
