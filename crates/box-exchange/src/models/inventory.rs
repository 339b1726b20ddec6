//! 宝箱库存定义

use serde::{Deserialize, Serialize};

use super::enums::BoxType;

/// 单个宝箱的库存条目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoxSpec {
    /// 发放总量
    pub total: u32,
    /// 剩余数量，只减不增，下限为 0
    pub remaining: u32,
    /// 兑换所需积分
    pub cost: u64,
    /// 展示名称
    pub name: String,
}

impl BoxSpec {
    pub fn has_stock(&self) -> bool {
        self.remaining > 0
    }

    /// 库存是否满足 remaining <= total
    pub fn is_consistent(&self) -> bool {
        self.remaining <= self.total
    }
}

/// 宝箱库存表
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoxInventory {
    pub premium: BoxSpec,
    pub regular: BoxSpec,
}

impl Default for BoxInventory {
    fn default() -> Self {
        Self {
            premium: BoxSpec {
                total: 10,
                remaining: 5,
                cost: 20_000,
                name: BoxType::Premium.label().to_string(),
            },
            regular: BoxSpec {
                total: 30,
                remaining: 18,
                cost: 6_000,
                name: BoxType::Regular.label().to_string(),
            },
        }
    }
}

impl BoxInventory {
    pub fn get(&self, box_type: BoxType) -> &BoxSpec {
        match box_type {
            BoxType::Premium => &self.premium,
            BoxType::Regular => &self.regular,
        }
    }

    pub fn get_mut(&mut self, box_type: BoxType) -> &mut BoxSpec {
        match box_type {
            BoxType::Premium => &mut self.premium,
            BoxType::Regular => &mut self.regular,
        }
    }

    /// 第一个违反 remaining <= total 的宝箱
    pub fn first_inconsistent(&self) -> Option<BoxType> {
        BoxType::ALL
            .into_iter()
            .find(|box_type| !self.get(*box_type).is_consistent())
    }
}
