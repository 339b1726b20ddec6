//! 展示用派生值
//!
//! 均为状态的纯函数，不产生任何变更。

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use exchange_shared::config::LowStockConfig;

use crate::engine::cooldown_until;
use crate::models::{BoxSpec, BoxType, ExchangeLog, User};

const DAY_MILLIS: i64 = 24 * 60 * 60 * 1000;

/// 距目标时间的剩余天数（向上取整）
pub fn days_until(target: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let millis = (target - now).num_milliseconds();
    if millis <= 0 {
        return 0;
    }
    (millis + DAY_MILLIS - 1) / DAY_MILLIS
}

/// 每周兑换资格
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeeklyStatus {
    pub available: bool,
    /// 剩余天数，可兑换时为 None
    pub days_left: Option<i64>,
}

impl WeeklyStatus {
    pub fn of(user: &User, now: DateTime<Utc>) -> Self {
        let days_left =
            cooldown_until(user.last_weekly_exchange, now).map(|until| days_until(until, now));
        Self {
            available: days_left.is_none(),
            days_left,
        }
    }

    /// `可兑换` / `不可兑换`
    pub fn label(&self) -> &'static str {
        if self.available { "可兑换" } else { "不可兑换" }
    }

    /// `{n}天后可兑换` / `无`
    pub fn next_label(&self) -> String {
        match self.days_left {
            Some(days) => format!("{}天后可兑换", days),
            None => "无".to_string(),
        }
    }
}

/// 至尊宝箱冷却标签：`{n}天` / `无冷却`
pub fn premium_cooldown_label(user: &User, now: DateTime<Utc>) -> String {
    match cooldown_until(user.last_premium_exchange, now) {
        Some(until) => format!("{}天", days_until(until, now)),
        None => "无冷却".to_string(),
    }
}

/// 账号身份标签
pub fn account_label(user: &User) -> &'static str {
    if user.is_admin { "管理员" } else { "普通用户" }
}

/// 库存标签：`剩余: {remaining}/{total}`
pub fn stock_label(spec: &BoxSpec) -> String {
    format!("剩余: {}/{}", spec.remaining, spec.total)
}

/// 是否低库存
pub fn is_low_stock(box_type: BoxType, spec: &BoxSpec, thresholds: &LowStockConfig) -> bool {
    let threshold = match box_type {
        BoxType::Premium => thresholds.premium,
        BoxType::Regular => thresholds.regular,
    };
    spec.remaining <= threshold
}

/// 兑换记录展示行
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryRow {
    pub date: NaiveDate,
    pub box_label: &'static str,
    pub cost: u64,
    pub status_label: &'static str,
}

/// 用户兑换记录，最新在前，最多 `limit` 条
pub fn history_rows(history: &ExchangeLog, user_id: &str, limit: usize) -> Vec<HistoryRow> {
    history
        .for_user(user_id, limit)
        .into_iter()
        .map(|record| HistoryRow {
            date: record.date,
            box_label: record.box_type.label(),
            cost: record.cost,
            status_label: record.status.label(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ExchangeRecord;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 15, 6, 0, 0).unwrap()
    }

    #[test]
    fn test_days_until_rounds_up() {
        assert_eq!(days_until(now() + Duration::hours(1), now()), 1);
        assert_eq!(days_until(now() + Duration::days(2), now()), 2);
        assert_eq!(
            days_until(now() + Duration::days(2) + Duration::milliseconds(1), now()),
            3
        );
        assert_eq!(days_until(now() - Duration::hours(1), now()), 0);
    }

    #[test]
    fn test_weekly_status_labels() {
        let mut user = User::new("1234567", "hash", now());
        let status = WeeklyStatus::of(&user, now());
        assert_eq!(status.label(), "可兑换");
        assert_eq!(status.next_label(), "无");

        user.last_weekly_exchange = Some(now() - Duration::days(2) - Duration::hours(3));
        let status = WeeklyStatus::of(&user, now());
        assert_eq!(status.label(), "不可兑换");
        assert_eq!(status.next_label(), "5天后可兑换");
    }

    #[test]
    fn test_premium_cooldown_label() {
        let mut user = User::new("1234567", "hash", now());
        assert_eq!(premium_cooldown_label(&user, now()), "无冷却");

        user.last_premium_exchange = Some(now() - Duration::hours(1));
        assert_eq!(premium_cooldown_label(&user, now()), "7天");
    }

    #[test]
    fn test_stock_labels() {
        let inventory = crate::models::BoxInventory::default();
        let thresholds = LowStockConfig::default();

        assert_eq!(stock_label(&inventory.regular), "剩余: 18/30");
        assert!(!is_low_stock(BoxType::Regular, &inventory.regular, &thresholds));

        let mut premium = inventory.premium.clone();
        premium.remaining = 2;
        assert!(is_low_stock(BoxType::Premium, &premium, &thresholds));
    }

    #[test]
    fn test_history_rows_are_limited_and_filtered() {
        let mut log = ExchangeLog::default();
        for day in 1..=12 {
            let date = NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
            log.prepend(ExchangeRecord::completed("1234567", BoxType::Regular, 6000, date));
            log.prepend(ExchangeRecord::completed("7654321", BoxType::Premium, 20000, date));
        }

        let rows = history_rows(&log, "1234567", 10);
        assert_eq!(rows.len(), 10);
        assert_eq!(rows[0].date, NaiveDate::from_ymd_opt(2024, 1, 12).unwrap());
        assert!(rows.iter().all(|r| r.box_label == "战功宝箱"));
        assert_eq!(rows[0].status_label, "已完成");
    }

    #[test]
    fn test_account_label() {
        let user = User::new("1234567", "hash", now());
        assert_eq!(account_label(&user), "普通用户");
        assert_eq!(account_label(&user.with_admin(true)), "管理员");
    }
}
