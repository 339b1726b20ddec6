//! 初始数据加载
//!
//! 启动时由配置的初始数据文件（JSON 或 TOML，按扩展名识别）补齐缺失数据。
//! 程序本身不内置任何账号凭据。
//!
//! 规则：
//! - 用户仅在账号不存在时插入，从不覆盖已有用户
//! - 库存、日志只在存储中不存在时使用文件中的值
//! - 都未提供时库存使用默认值，系统设置以当前时间初始化
//! - 文件中的库存总量为 0 或剩余量超过总量时拒绝启动

use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use config::{Config, File};
use serde::Deserialize;
use tracing::{debug, info};

use crate::auth::{self, hash_password};
use crate::error::{ExchangeError, Result, ValidationError};
use crate::models::{
    BoxInventory, BoxType, ExchangeLog, ExchangeRecord, ExchangeState, SystemSettings, User,
    UserRoster,
};
use crate::repository::Aggregate;

/// 初始用户
#[derive(Debug, Clone, Deserialize)]
pub struct SeedUser {
    pub id: String,
    /// 明文密码，加载时哈希
    #[serde(default)]
    pub password: Option<String>,
    /// 已哈希的密码，优先于明文
    #[serde(default)]
    pub password_hash: Option<String>,
    #[serde(default)]
    pub points: u64,
    #[serde(default)]
    pub is_admin: bool,
}

/// 初始兑换记录
#[derive(Debug, Clone, Deserialize)]
pub struct SeedRecord {
    pub user_id: String,
    pub box_type: String,
    pub cost: u64,
    /// `YYYY-MM-DD`
    pub date: String,
}

/// 初始数据文件
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SeedFixture {
    pub users: Vec<SeedUser>,
    pub boxes: Option<BoxInventory>,
    pub history: Vec<SeedRecord>,
    pub exchange_enabled: Option<bool>,
}

impl SeedFixture {
    /// 从文件加载
    pub fn load(path: &Path) -> Result<Self> {
        let fixture: Self = Config::builder()
            .add_source(File::from(path))
            .build()
            .and_then(|c| c.try_deserialize::<Self>())
            .map_err(|e| ExchangeError::Seed(format!("{}: {}", path.display(), e)))?;

        debug!(
            path = %path.display(),
            users = fixture.users.len(),
            records = fixture.history.len(),
            "初始数据文件已加载"
        );
        Ok(fixture)
    }

    fn build_history(&self) -> Result<ExchangeLog> {
        let records = self
            .history
            .iter()
            .map(|r| {
                let box_type: BoxType = r.box_type.parse().map_err(ExchangeError::Seed)?;
                let date = NaiveDate::parse_from_str(&r.date, "%Y-%m-%d")
                    .map_err(|e| ExchangeError::Seed(format!("无效的日期 {}: {}", r.date, e)))?;
                Ok(ExchangeRecord::completed(
                    r.user_id.clone(),
                    box_type,
                    r.cost,
                    date,
                ))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(ExchangeLog::new(records))
    }

    fn checked_boxes(&self) -> Result<BoxInventory> {
        let boxes = self.boxes.clone().unwrap_or_default();
        if let Some(box_type) = boxes.first_inconsistent() {
            let spec = boxes.get(box_type);
            let invalid = ValidationError::InvalidInventory {
                box_type,
                remaining: spec.remaining,
                total: spec.total,
            };
            return Err(ExchangeError::Seed(invalid.to_string()));
        }
        if let Some(box_type) = BoxType::ALL.into_iter().find(|b| boxes.get(*b).total == 0) {
            return Err(ExchangeError::Seed(format!(
                "{} 总量不能为 0",
                box_type.label()
            )));
        }
        Ok(boxes)
    }

    fn build_user(&self, seed: &SeedUser, bcrypt_cost: u32, now: DateTime<Utc>) -> Result<User> {
        auth::validate_account_id(&seed.id)
            .map_err(|e| ExchangeError::Seed(format!("账号 {}: {}", seed.id, e)))?;

        let password_hash = match (&seed.password_hash, &seed.password) {
            (Some(hash), _) => hash.clone(),
            (None, Some(password)) => hash_password(password, bcrypt_cost)?,
            (None, None) => {
                return Err(ExchangeError::Seed(format!("账号 {} 缺少密码", seed.id)));
            }
        };

        Ok(User::new(seed.id.clone(), password_hash, now)
            .with_points(seed.points)
            .with_admin(seed.is_admin))
    }
}

/// 存储中已有的聚合
#[derive(Debug, Clone, Default)]
pub struct StoredState {
    pub users: Option<UserRoster>,
    pub boxes: Option<BoxInventory>,
    pub history: Option<ExchangeLog>,
    pub system: Option<SystemSettings>,
}

/// 合并存储数据与初始数据
///
/// 返回完整状态以及需要保存的聚合
pub fn initial_state(
    stored: StoredState,
    fixture: &SeedFixture,
    bcrypt_cost: u32,
    now: DateTime<Utc>,
    next_premium_open: DateTime<Utc>,
) -> Result<(ExchangeState, Vec<Aggregate>)> {
    let mut dirty = Vec::new();

    let mut users = match stored.users {
        Some(users) => users,
        None => {
            dirty.push(Aggregate::Users);
            UserRoster::default()
        }
    };
    let mut seeded = 0usize;
    for seed in &fixture.users {
        if users.contains(&seed.id) {
            continue;
        }
        users.insert(fixture.build_user(seed, bcrypt_cost, now)?);
        seeded += 1;
    }
    if seeded > 0 && !dirty.contains(&Aggregate::Users) {
        dirty.push(Aggregate::Users);
    }

    let boxes = match stored.boxes {
        Some(boxes) => boxes,
        None => {
            dirty.push(Aggregate::Inventory);
            fixture.checked_boxes()?
        }
    };

    let history = match stored.history {
        Some(history) => history,
        None => {
            dirty.push(Aggregate::History);
            fixture.build_history()?
        }
    };

    let system = match stored.system {
        Some(system) => system,
        None => {
            dirty.push(Aggregate::System);
            let mut system = SystemSettings::new(now, next_premium_open);
            if let Some(enabled) = fixture.exchange_enabled {
                system.exchange_enabled = enabled;
            }
            system
        }
    };

    if seeded > 0 {
        info!(seeded, "已插入初始用户");
    }

    Ok((
        ExchangeState {
            users,
            boxes,
            history,
            system,
        },
        dirty,
    ))
}
