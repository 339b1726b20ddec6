//! 聚合状态仓储
//!
//! 四个业务聚合、两个备份计数器以及本地全量备份的读写

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::debug;

use exchange_shared::error::Result;
use exchange_shared::storage::KeyValueStore;

use super::keys;
use crate::models::{
    BoxInventory, ExchangeLog, ExchangeState, LocalBackup, SystemSettings, UserRoster,
};

/// 可独立保存的聚合
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregate {
    Users,
    Inventory,
    History,
    System,
}

impl Aggregate {
    pub const ALL: [Aggregate; 4] = [
        Aggregate::Users,
        Aggregate::Inventory,
        Aggregate::History,
        Aggregate::System,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Self::Users => keys::USERS,
            Self::Inventory => keys::INVENTORY,
            Self::History => keys::HISTORY,
            Self::System => keys::SYSTEM,
        }
    }
}

/// 状态仓储
///
/// 克隆后共享同一把计数器锁，后台备份任务与前台命令的计数更新不会互相覆盖
#[derive(Clone)]
pub struct StateRepository {
    store: Arc<dyn KeyValueStore>,
    counter_lock: Arc<Mutex<()>>,
}

impl StateRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            counter_lock: Arc::new(Mutex::new(())),
        }
    }

    async fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.store.get(key).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    async fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let value = serde_json::to_value(value)?;
        self.store.put(key, &value).await?;
        debug!(key, "聚合已保存");
        Ok(())
    }

    // 聚合读取
    pub async fn load_users(&self) -> Result<Option<UserRoster>> {
        self.load(keys::USERS).await
    }

    pub async fn load_inventory(&self) -> Result<Option<BoxInventory>> {
        self.load(keys::INVENTORY).await
    }

    pub async fn load_history(&self) -> Result<Option<ExchangeLog>> {
        self.load(keys::HISTORY).await
    }

    pub async fn load_system(&self) -> Result<Option<SystemSettings>> {
        self.load(keys::SYSTEM).await
    }

    // 聚合保存
    pub async fn save_users(&self, users: &UserRoster) -> Result<()> {
        self.save(keys::USERS, users).await
    }

    pub async fn save_inventory(&self, boxes: &BoxInventory) -> Result<()> {
        self.save(keys::INVENTORY, boxes).await
    }

    pub async fn save_history(&self, history: &ExchangeLog) -> Result<()> {
        self.save(keys::HISTORY, history).await
    }

    pub async fn save_system(&self, system: &SystemSettings) -> Result<()> {
        self.save(keys::SYSTEM, system).await
    }

    /// 保存状态中的单个聚合
    pub async fn save_aggregate(&self, state: &ExchangeState, aggregate: Aggregate) -> Result<()> {
        match aggregate {
            Aggregate::Users => self.save_users(&state.users).await,
            Aggregate::Inventory => self.save_inventory(&state.boxes).await,
            Aggregate::History => self.save_history(&state.history).await,
            Aggregate::System => self.save_system(&state.system).await,
        }
    }

    /// 依次保存全部聚合，遇到第一个失败即返回
    pub async fn save_all(&self, state: &ExchangeState) -> Result<()> {
        for aggregate in Aggregate::ALL {
            self.save_aggregate(state, aggregate).await?;
        }
        Ok(())
    }

    // 计数器

    /// 读取计数器，兼容数字与数字字符串两种存储形式
    pub async fn counter(&self, key: &str) -> Result<u64> {
        let count = match self.store.get(key).await? {
            Some(Value::Number(n)) => n.as_u64().unwrap_or(0),
            Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
            _ => 0,
        };
        Ok(count)
    }

    /// 计数器加一，返回新值
    pub async fn increment_counter(&self, key: &str) -> Result<u64> {
        let _guard = self.counter_lock.lock().await;
        let next = self.counter(key).await?.saturating_add(1);
        self.store.put(key, &Value::from(next)).await?;
        Ok(next)
    }

    // 本地备份

    /// 保存本地备份，返回使用的键
    pub async fn save_local_backup(&self, backup: &LocalBackup) -> Result<String> {
        let key = keys::local_backup(backup.timestamp.timestamp_millis());
        self.save(&key, backup).await?;
        Ok(key)
    }

    /// 读取最近的本地备份（键按字典序最大）
    pub async fn latest_local_backup(&self) -> Result<Option<(String, LocalBackup)>> {
        let keys = self.store.keys_with_prefix(keys::LOCAL_BACKUP_PREFIX).await?;
        let Some(latest) = keys.into_iter().next_back() else {
            return Ok(None);
        };

        let backup = self.load(&latest).await?;
        Ok(backup.map(|backup| (latest, backup)))
    }
}
