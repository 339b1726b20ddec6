//! 兑换资格校验
//!
//! 按固定顺序执行校验，第一个失败项即返回，不汇总多个违规：
//!
//! 1. 系统开关（管理员豁免）
//! 2. 每周限额：任意宝箱共用一个名额
//! 3. 至尊宝箱冷却
//! 4. 至尊宝箱开启时间（管理员豁免）
//! 5. 积分余额
//! 6. 库存

use chrono::{DateTime, Duration, Utc};

use super::rejection::Rejection;
use crate::models::{BoxInventory, BoxType, SystemSettings, User};

/// 兑换冷却时长（7×24 小时滚动窗口）
pub fn exchange_cooldown() -> Duration {
    Duration::days(7)
}

/// 若上次兑换仍在冷却窗口内，返回可再次兑换的时间
pub fn cooldown_until(last: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let window_start = now - exchange_cooldown();
    last.filter(|t| *t > window_start)
        .map(|t| t + exchange_cooldown())
}

/// 校验通过后的兑换报价
///
/// 确认弹窗直接使用其中已校验的名称与积分，提交时无需重新推导
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeQuote {
    pub user_id: String,
    pub box_type: BoxType,
    pub box_name: String,
    pub cost: u64,
}

impl ExchangeQuote {
    /// 确认提示文案
    pub fn confirmation_message(&self) -> String {
        format!("确定要兑换{}吗？\n需要消耗{}积分", self.box_name, self.cost)
    }
}

/// 评估兑换资格（纯函数，不修改任何状态）
pub fn evaluate(
    user: &User,
    box_type: BoxType,
    boxes: &BoxInventory,
    system: &SystemSettings,
    now: DateTime<Utc>,
) -> Result<ExchangeQuote, Rejection> {
    // 1. 系统开关
    if !system.exchange_enabled && !user.is_admin {
        return Err(Rejection::ExchangeDisabled);
    }

    // 2. 每周限额
    if let Some(available_at) = cooldown_until(user.last_weekly_exchange, now) {
        return Err(Rejection::WeeklyLimit { available_at });
    }

    if box_type.is_premium() {
        // 3. 至尊宝箱冷却
        if let Some(available_at) = cooldown_until(user.last_premium_exchange, now) {
            return Err(Rejection::PremiumCooldown { available_at });
        }

        // 4. 开启时间
        if now < system.next_premium_open && !user.is_admin {
            return Err(Rejection::PremiumLocked {
                opens_at: system.next_premium_open,
            });
        }
    }

    let spec = boxes.get(box_type);

    // 5. 积分
    if user.points < spec.cost {
        return Err(Rejection::InsufficientPoints {
            required: spec.cost,
            available: user.points,
        });
    }

    // 6. 库存
    if !spec.has_stock() {
        return Err(Rejection::SoldOut { box_type });
    }

    Ok(ExchangeQuote {
        user_id: user.id.clone(),
        box_type,
        box_name: spec.name.clone(),
        cost: spec.cost,
    })
}
