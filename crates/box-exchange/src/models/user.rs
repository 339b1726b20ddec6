//! 用户实体定义

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 用户
///
/// 注册时创建（积分为 0），或由初始数据预置为管理员；只在兑换成功时被修改，从不删除
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// 7 位数字账号（预置账号可不受格式限制）
    pub id: String,
    /// bcrypt 密码哈希
    ///
    /// 旧版网页导出的 `password` 为明文，导入时再哈希
    #[serde(alias = "password")]
    pub password_hash: String,
    pub points: u64,
    /// 管理员可绕过系统开关与至尊宝箱开启时间，但不能绕过每周限额与冷却
    pub is_admin: bool,
    /// 最近一次兑换至尊宝箱的时间
    pub last_premium_exchange: Option<DateTime<Utc>>,
    /// 最近一次兑换任意宝箱的时间
    pub last_weekly_exchange: Option<DateTime<Utc>>,
    pub registered: DateTime<Utc>,
}

impl User {
    pub fn new(id: impl Into<String>, password_hash: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            password_hash: password_hash.into(),
            points: 0,
            is_admin: false,
            last_premium_exchange: None,
            last_weekly_exchange: None,
            registered: now,
        }
    }

    pub fn with_points(mut self, points: u64) -> Self {
        self.points = points;
        self
    }

    pub fn with_admin(mut self, is_admin: bool) -> Self {
        self.is_admin = is_admin;
        self
    }
}

/// 用户名册
///
/// 按注册顺序保存全部用户，账号唯一
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserRoster(Vec<User>);

impl UserRoster {
    pub fn new(users: Vec<User>) -> Self {
        Self(users)
    }

    pub fn find(&self, id: &str) -> Option<&User> {
        self.0.iter().find(|u| u.id == id)
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut User> {
        self.0.iter_mut().find(|u| u.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    /// 追加用户，账号已存在时返回 false
    pub fn insert(&mut self, user: User) -> bool {
        if self.contains(&user.id) {
            return false;
        }
        self.0.push(user);
        true
    }

    /// 第一个重复的账号（用于导入校验）
    pub fn first_duplicate(&self) -> Option<&str> {
        self.0
            .iter()
            .enumerate()
            .find(|(i, u)| self.0[..*i].iter().any(|prev| prev.id == u.id))
            .map(|(_, u)| u.id.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &User> {
        self.0.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut User> {
        self.0.iter_mut()
    }
}
