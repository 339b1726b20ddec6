//! 远程备份
//!
//! 可选的尽力备份通道：兑换记录写入 GitHub Issues，全量快照写入私有 Gist。
//! 未配置 token 时整体禁用，任何失败都只记录日志。

mod connector;
mod github;
mod sender;

pub use connector::{BackupConnector, BackupOutcome, DisabledBackupConnector, RemoteBackup};
#[cfg(test)]
pub use connector::MockBackupConnector;
pub use github::{GithubBackupConnector, gist_payload, issue_body, issue_payload, issue_title};
pub use sender::BackupSender;

use std::sync::Arc;

use tracing::info;

use exchange_shared::config::BackupConfig;

use crate::error::Result;

/// 根据配置选择连接器
pub fn connector_from_config(config: &BackupConfig) -> Result<Arc<dyn BackupConnector>> {
    if config.is_configured() {
        info!(owner = %config.owner, repo = %config.repo, "已启用 GitHub 远程备份");
        Ok(Arc::new(GithubBackupConnector::new(config)?))
    } else {
        Ok(Arc::new(DisabledBackupConnector::new()))
    }
}
