//! 备份发送器
//!
//! 在兑换成功或本地备份完成后，把远程备份丢到后台任务执行。
//!
//! ## 设计说明
//!
//! `BackupSender` 不向调用方返回备份结果：
//! - 成功时记录地址并更新备份计数
//! - 未配置时只记录调试日志
//! - 失败时记录警告，不影响已提交的业务变更

use std::sync::{Arc, Mutex};

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use exchange_shared::observability::metrics;

use super::connector::{BackupConnector, BackupOutcome, RemoteBackup};
use crate::error::Result;
use crate::models::{ExchangeRecord, LocalBackup};
use crate::repository::{StateRepository, keys};

/// 备份发送器
#[derive(Clone)]
pub struct BackupSender {
    connector: Arc<dyn BackupConnector>,
    repo: StateRepository,
    pending: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl BackupSender {
    pub fn new(connector: Arc<dyn BackupConnector>, repo: StateRepository) -> Self {
        Self {
            connector,
            repo,
            pending: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn track(&self, handle: JoinHandle<()>) {
        let mut pending = self.pending.lock().unwrap_or_else(|p| p.into_inner());
        pending.retain(|h| !h.is_finished());
        pending.push(handle);
    }

    /// 等待所有已派发的后台备份结束，返回等待的任务数
    ///
    /// 命令行进程退出前调用，避免运行时关闭时丢弃仍在进行的请求
    pub async fn flush(&self) -> usize {
        let handles: Vec<_> = {
            let mut pending = self.pending.lock().unwrap_or_else(|p| p.into_inner());
            pending.drain(..).collect()
        };

        let count = handles.len();
        for handle in handles {
            if let Err(e) = handle.await {
                warn!(error = %e, "后台备份任务异常退出");
            }
        }
        count
    }

    pub fn is_configured(&self) -> bool {
        self.connector.is_configured()
    }

    /// 异步备份兑换记录（fire-and-forget）
    pub fn send_exchange(&self, record: ExchangeRecord) {
        let connector = self.connector.clone();
        let repo = self.repo.clone();

        let handle = tokio::spawn(async move {
            match connector.backup_exchange(&record).await {
                Ok(BackupOutcome::Stored { url }) => {
                    info!(user_id = %record.user_id, url = %url, "兑换记录远程备份成功");
                    metrics::record_backup("exchange", "success");

                    if let Err(e) = repo.increment_counter(keys::EXCHANGE_BACKUP_COUNT).await {
                        warn!(error = %e, "更新兑换备份计数失败");
                    }
                }
                Ok(BackupOutcome::NotConfigured) => {
                    debug!(user_id = %record.user_id, "远程备份未配置，跳过");
                    metrics::record_backup("exchange", "not_configured");
                }
                Err(e) => {
                    warn!(user_id = %record.user_id, error = %e, "兑换记录远程备份失败");
                    metrics::record_backup("exchange", "failed");
                }
            }
        });
        self.track(handle);
    }

    /// 异步备份全量快照（fire-and-forget）
    pub fn send_snapshot(&self, snapshot: LocalBackup) {
        let connector = self.connector.clone();

        let handle = tokio::spawn(async move {
            match connector.backup_snapshot(&snapshot).await {
                Ok(BackupOutcome::Stored { url }) => {
                    info!(url = %url, "全量快照远程备份成功");
                    metrics::record_backup("snapshot", "success");
                }
                Ok(BackupOutcome::NotConfigured) => {
                    debug!("远程备份未配置，跳过");
                    metrics::record_backup("snapshot", "not_configured");
                }
                Err(e) => {
                    warn!(error = %e, "全量快照远程备份失败");
                    metrics::record_backup("snapshot", "failed");
                }
            }
        });
        self.track(handle);
    }

    /// 列出远端兑换记录备份（同步等待结果）
    pub async fn list_exchange_backups(&self) -> Result<Vec<RemoteBackup>> {
        self.connector.list_exchange_backups().await
    }
}
