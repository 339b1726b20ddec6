//! 兑换服务枚举类型定义
//!
//! 所有枚举都支持 JSON（serde）序列化，序列化值与历史数据保持兼容

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// 宝箱类型
///
/// 固定两种：至尊宝箱受每周开启时间与独立冷却约束，战功宝箱只受每周限额约束
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoxType {
    /// 至尊宝箱
    Premium,
    /// 战功宝箱
    Regular,
}

impl BoxType {
    pub const ALL: [BoxType; 2] = [BoxType::Premium, BoxType::Regular];

    /// 存储与命令行使用的键
    pub fn key(&self) -> &'static str {
        match self {
            Self::Premium => "premium",
            Self::Regular => "regular",
        }
    }

    /// 默认展示名称（库存表中的 name 字段可覆盖）
    pub fn label(&self) -> &'static str {
        match self {
            Self::Premium => "至尊宝箱",
            Self::Regular => "战功宝箱",
        }
    }

    pub fn is_premium(&self) -> bool {
        matches!(self, Self::Premium)
    }
}

impl fmt::Display for BoxType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for BoxType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "premium" => Ok(Self::Premium),
            "regular" => Ok(Self::Regular),
            other => Err(format!("未知的宝箱类型: {other}")),
        }
    }
}

/// 兑换记录状态
///
/// 兑换是同步完成的，当前只有"已完成"一种状态
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExchangeStatus {
    #[default]
    #[serde(alias = "已完成")]
    Completed,
}

impl ExchangeStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Completed => "已完成",
        }
    }
}
