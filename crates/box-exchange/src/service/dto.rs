//! 数据传输对象
//!
//! 服务层返回给展示层的结构

use serde::Serialize;

use crate::display::{self, HistoryRow, WeeklyStatus};
use crate::engine::ExchangeQuote;
use crate::models::{BoxSpec, BoxType, ExchangeRecord, User};

use chrono::{DateTime, Utc};
use exchange_shared::config::LowStockConfig;

/// 兑换结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RedemptionReceipt {
    pub record: ExchangeRecord,
    pub box_name: String,
    pub cost: u64,
    /// 兑换后的积分余额
    pub remaining_points: u64,
    /// 兑换后的宝箱剩余数量
    pub remaining_stock: u32,
}

impl RedemptionReceipt {
    pub fn new(
        quote: &ExchangeQuote,
        record: ExchangeRecord,
        remaining_points: u64,
        remaining_stock: u32,
    ) -> Self {
        Self {
            record,
            box_name: quote.box_name.clone(),
            cost: quote.cost,
            remaining_points,
            remaining_stock,
        }
    }

    /// 成功提示文案
    pub fn message(&self) -> String {
        format!("兑换成功！扣除{}积分", self.cost)
    }
}

/// 当前用户概览
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSummaryDto {
    pub id: String,
    pub points: u64,
    /// `管理员` / `普通用户`
    pub account_label: &'static str,
    /// `可兑换` / `不可兑换`
    pub weekly_label: &'static str,
    /// `{n}天后可兑换` / `无`
    pub next_exchange_label: String,
    /// `{n}天` / `无冷却`
    pub premium_cooldown_label: String,
}

impl UserSummaryDto {
    pub fn of(user: &User, now: DateTime<Utc>) -> Self {
        let weekly = WeeklyStatus::of(user, now);
        Self {
            id: user.id.clone(),
            points: user.points,
            account_label: display::account_label(user),
            weekly_label: weekly.label(),
            next_exchange_label: weekly.next_label(),
            premium_cooldown_label: display::premium_cooldown_label(user, now),
        }
    }
}

/// 宝箱展示信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoxDto {
    pub box_type: BoxType,
    pub name: String,
    pub cost: u64,
    /// `剩余: {remaining}/{total}`
    pub stock_label: String,
    pub low_stock: bool,
}

impl BoxDto {
    pub fn of(box_type: BoxType, spec: &BoxSpec, thresholds: &LowStockConfig) -> Self {
        Self {
            box_type,
            name: spec.name.clone(),
            cost: spec.cost,
            stock_label: display::stock_label(spec),
            low_stock: display::is_low_stock(box_type, spec, thresholds),
        }
    }
}

/// 主界面
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardDto {
    /// 未登录时为 None
    pub user: Option<UserSummaryDto>,
    pub boxes: Vec<BoxDto>,
    pub exchange_enabled: bool,
    /// `HH:MM:SS` 或 `已开启`
    pub countdown: String,
    pub history: Vec<HistoryRow>,
}

/// 统计信息
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatsDto {
    pub users: usize,
    pub exchanges: usize,
    /// 全量备份次数
    pub snapshot_backups: u64,
    /// 兑换记录远程备份次数
    pub exchange_backups: u64,
}
