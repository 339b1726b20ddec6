//! 远程备份连接器接口

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Result;
use crate::models::{ExchangeRecord, LocalBackup};

/// 备份结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackupOutcome {
    /// 已写入远端，附带可访问地址
    Stored { url: String },
    /// 未配置凭据，跳过
    NotConfigured,
}

/// 远端已存在的兑换记录备份
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteBackup {
    pub number: u64,
    pub title: String,
    pub html_url: String,
    pub created_at: DateTime<Utc>,
}

/// 远程备份连接器
///
/// 所有调用都是尽力而为，调用方只记录结果，不据此回滚业务变更
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BackupConnector: Send + Sync {
    /// 是否已配置远程凭据
    fn is_configured(&self) -> bool;

    /// 备份单条兑换记录
    async fn backup_exchange(&self, record: &ExchangeRecord) -> Result<BackupOutcome>;

    /// 备份全量快照
    async fn backup_snapshot(&self, snapshot: &LocalBackup) -> Result<BackupOutcome>;

    /// 列出远端的兑换记录备份
    async fn list_exchange_backups(&self) -> Result<Vec<RemoteBackup>>;
}

/// 未配置凭据时使用的连接器
///
/// 所有调用直接返回 `NotConfigured`，首次调用时输出一次警告
#[derive(Debug, Default)]
pub struct DisabledBackupConnector {
    warned: AtomicBool,
}

impl DisabledBackupConnector {
    pub fn new() -> Self {
        Self::default()
    }

    fn warn_once(&self) {
        if !self.warned.swap(true, Ordering::Relaxed) {
            warn!("远程备份未配置 token，已跳过远程备份");
        }
    }
}

#[async_trait]
impl BackupConnector for DisabledBackupConnector {
    fn is_configured(&self) -> bool {
        false
    }

    async fn backup_exchange(&self, _record: &ExchangeRecord) -> Result<BackupOutcome> {
        self.warn_once();
        Ok(BackupOutcome::NotConfigured)
    }

    async fn backup_snapshot(&self, _snapshot: &LocalBackup) -> Result<BackupOutcome> {
        self.warn_once();
        Ok(BackupOutcome::NotConfigured)
    }

    async fn list_exchange_backups(&self) -> Result<Vec<RemoteBackup>> {
        self.warn_once();
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BoxType;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_disabled_connector_skips_everything() {
        let connector = DisabledBackupConnector::new();
        let record = ExchangeRecord::completed(
            "1234567",
            BoxType::Regular,
            6000,
            NaiveDate::from_ymd_opt(2024, 5, 20).unwrap(),
        );

        assert!(!connector.is_configured());
        assert_eq!(
            connector.backup_exchange(&record).await.unwrap(),
            BackupOutcome::NotConfigured
        );
        assert!(connector.list_exchange_backups().await.unwrap().is_empty());
    }
}
