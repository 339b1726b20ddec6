//! 兑换拒绝原因
//!
//! 每个变体对应一项资格校验，`Display` 为面向用户的原文案，`code` 为稳定错误码

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::BoxType;

/// 兑换拒绝原因
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("兑换系统暂时关闭")]
    ExchangeDisabled,

    #[error("本周已兑换过宝箱，请下周再来")]
    WeeklyLimit { available_at: DateTime<Utc> },

    #[error("至尊宝箱兑换需间隔一周，请下周再来")]
    PremiumCooldown { available_at: DateTime<Utc> },

    #[error("至尊宝箱每周一10:00开启，请等待")]
    PremiumLocked { opens_at: DateTime<Utc> },

    #[error("积分不足，无法兑换")]
    InsufficientPoints { required: u64, available: u64 },

    #[error("该宝箱已兑换完，请选择其他宝箱")]
    SoldOut { box_type: BoxType },

    #[error("已取消兑换")]
    ConfirmationDeclined,
}

impl Rejection {
    pub fn code(&self) -> &'static str {
        match self {
            Self::ExchangeDisabled => "EXCHANGE_DISABLED",
            Self::WeeklyLimit { .. } => "WEEKLY_LIMIT",
            Self::PremiumCooldown { .. } => "PREMIUM_COOLDOWN",
            Self::PremiumLocked { .. } => "PREMIUM_LOCKED",
            Self::InsufficientPoints { .. } => "INSUFFICIENT_POINTS",
            Self::SoldOut { .. } => "SOLD_OUT",
            Self::ConfirmationDeclined => "CONFIRMATION_DECLINED",
        }
    }
}
