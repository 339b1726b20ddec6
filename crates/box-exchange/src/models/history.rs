//! 兑换记录定义

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::enums::{BoxType, ExchangeStatus};

/// 兑换记录
///
/// 创建后不可修改
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRecord {
    pub user_id: String,
    pub box_type: BoxType,
    pub cost: u64,
    /// 兑换日期（按天）
    pub date: NaiveDate,
    #[serde(default)]
    pub status: ExchangeStatus,
}

impl ExchangeRecord {
    pub fn completed(
        user_id: impl Into<String>,
        box_type: BoxType,
        cost: u64,
        date: NaiveDate,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            box_type,
            cost,
            date,
            status: ExchangeStatus::Completed,
        }
    }
}

/// 全局兑换日志
///
/// 新记录在前；只追加，不修改也不删除
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExchangeLog(Vec<ExchangeRecord>);

impl ExchangeLog {
    pub fn new(records: Vec<ExchangeRecord>) -> Self {
        Self(records)
    }

    /// 在日志头部插入新记录
    pub fn prepend(&mut self, record: ExchangeRecord) {
        self.0.insert(0, record);
    }

    pub fn latest(&self) -> Option<&ExchangeRecord> {
        self.0.first()
    }

    /// 指定用户的记录（新记录在前），最多 limit 条
    pub fn for_user(&self, user_id: &str, limit: usize) -> Vec<&ExchangeRecord> {
        self.0
            .iter()
            .filter(|r| r.user_id == user_id)
            .take(limit)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExchangeRecord> {
        self.0.iter()
    }
}
