//! 系统设置定义

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 系统设置（进程级单例）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemSettings {
    /// 全局兑换开关
    pub exchange_enabled: bool,
    /// 上次重置时间（仅展示）
    pub last_reset: DateTime<Utc>,
    /// 至尊宝箱下次对普通用户开放的时间，始终为某个周一 10:00（本地时间）
    pub next_premium_open: DateTime<Utc>,
}

impl SystemSettings {
    pub fn new(now: DateTime<Utc>, next_premium_open: DateTime<Utc>) -> Self {
        Self {
            exchange_enabled: true,
            last_reset: now,
            next_premium_open,
        }
    }
}
