//! 快照服务
//!
//! 全量导出/导入、本地备份与恢复、统计信息

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{error, info, instrument};

use crate::backup::BackupSender;
use crate::error::{ExchangeError, Result, ValidationError};
use crate::models::{ExchangeState, ExportDocument, LocalBackup};
use crate::repository::{StateRepository, keys};
use crate::service::dto::StatsDto;

/// 校验待写入的完整状态
///
/// - 每种宝箱 `remaining <= total`
/// - 账号不重复
pub fn validate_state(state: &ExchangeState) -> std::result::Result<(), ValidationError> {
    if let Some(box_type) = state.boxes.first_inconsistent() {
        let spec = state.boxes.get(box_type);
        return Err(ValidationError::InvalidInventory {
            box_type,
            remaining: spec.remaining,
            total: spec.total,
        });
    }

    if let Some(id) = state.users.first_duplicate() {
        return Err(ValidationError::DuplicateUser(id.to_string()));
    }

    Ok(())
}

/// 快照服务
#[derive(Clone)]
pub struct SnapshotService {
    repo: StateRepository,
    backups: BackupSender,
}

impl SnapshotService {
    pub fn new(repo: StateRepository, backups: BackupSender) -> Self {
        Self { repo, backups }
    }

    /// 生成导出文档
    pub fn export(&self, state: &ExchangeState, now: DateTime<Utc>) -> ExportDocument {
        ExportDocument::from_state(state, now)
    }

    /// 将导出文档写入目录，文件名按本地日期生成
    pub async fn write_export(
        &self,
        document: &ExportDocument,
        dir: &Path,
        today: NaiveDate,
    ) -> Result<PathBuf> {
        let path = dir.join(ExportDocument::file_name(today));
        let content = serde_json::to_string_pretty(document)?;
        tokio::fs::write(&path, content)
            .await
            .map_err(|e| ExchangeError::Persistence(e.into()))?;

        info!(path = %path.display(), "数据已导出");
        Ok(path)
    }

    /// 读取导出文件
    pub async fn read_export(&self, path: &Path) -> Result<ExportDocument> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ExchangeError::Persistence(e.into()))?;
        Ok(serde_json::from_str(&content)?)
    }

    /// 以导出文档整体替换当前状态
    #[instrument(skip(self, state, document))]
    pub async fn import(&self, state: &mut ExchangeState, document: ExportDocument) -> Result<()> {
        let incoming = document.into_state();
        validate_state(&incoming)?;

        self.replace(state, incoming).await?;
        info!(
            users = state.users.len(),
            exchanges = state.history.len(),
            "数据导入成功"
        );
        Ok(())
    }

    /// 保存本地全量备份并派发远程快照备份，返回备份键
    #[instrument(skip(self, state))]
    pub async fn backup_local(&self, state: &ExchangeState, now: DateTime<Utc>) -> Result<String> {
        let backup = LocalBackup::from_state(state, now);
        let key = self.repo.save_local_backup(&backup).await?;
        let count = self
            .repo
            .increment_counter(keys::SNAPSHOT_BACKUP_COUNT)
            .await?;

        info!(key = %key, count, "本地备份已保存");
        self.backups.send_snapshot(backup);
        Ok(key)
    }

    /// 从最近一次本地备份恢复，返回使用的备份键
    ///
    /// 备份中缺失的聚合保留当前值
    #[instrument(skip(self, state))]
    pub async fn restore_latest_local(&self, state: &mut ExchangeState) -> Result<String> {
        let Some((key, backup)) = self.repo.latest_local_backup().await? else {
            return Err(ExchangeError::NoLocalBackup);
        };

        let restored = backup.merge_into(state);
        validate_state(&restored)?;

        self.replace(state, restored).await?;
        info!(key = %key, "已从本地备份恢复");
        Ok(key)
    }

    /// 统计信息
    pub async fn stats(&self, state: &ExchangeState) -> Result<StatsDto> {
        Ok(StatsDto {
            users: state.users.len(),
            exchanges: state.history.len(),
            snapshot_backups: self.repo.counter(keys::SNAPSHOT_BACKUP_COUNT).await?,
            exchange_backups: self.repo.counter(keys::EXCHANGE_BACKUP_COUNT).await?,
        })
    }

    /// 保存新状态，失败时恢复旧状态
    async fn replace(&self, state: &mut ExchangeState, incoming: ExchangeState) -> Result<()> {
        if let Err(e) = self.repo.save_all(&incoming).await {
            error!(error = %e, "保存失败，恢复原有数据");
            if let Err(restore_err) = self.repo.save_all(state).await {
                error!(error = %restore_err, "恢复原有数据失败");
            }
            return Err(e.into());
        }

        *state = incoming;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::TimeZone;
    use exchange_shared::storage::MemoryStore;

    use crate::backup::DisabledBackupConnector;
    use crate::models::{
        BoxInventory, BoxType, ExchangeLog, ExchangeRecord, SystemSettings, User, UserRoster,
    };

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 15, 6, 0, 0).unwrap()
    }

    fn state() -> ExchangeState {
        let mut history = ExchangeLog::default();
        history.prepend(ExchangeRecord::completed(
            "1234567",
            BoxType::Regular,
            6000,
            now().date_naive(),
        ));
        ExchangeState {
            users: UserRoster::new(vec![User::new("1234567", "hash", now())]),
            boxes: BoxInventory::default(),
            history,
            system: SystemSettings::new(now(), now()),
        }
    }

    fn service() -> (SnapshotService, StateRepository) {
        let repo = StateRepository::new(Arc::new(MemoryStore::new()));
        let sender = BackupSender::new(Arc::new(DisabledBackupConnector::new()), repo.clone());
        (SnapshotService::new(repo.clone(), sender), repo)
    }

    #[test]
    fn test_validate_state_rejects_overfull_inventory() {
        let mut state = state();
        state.boxes.premium.remaining = 11;
        assert_eq!(
            validate_state(&state),
            Err(ValidationError::InvalidInventory {
                box_type: BoxType::Premium,
                remaining: 11,
                total: 10
            })
        );
    }

    #[tokio::test]
    async fn test_import_rejects_duplicate_users_without_changes() {
        let (service, repo) = service();
        let mut current = state();
        let mut incoming = state();
        incoming.users = UserRoster::new(vec![
            User::new("1111111", "hash", now()),
            User::new("1111111", "hash", now()),
        ]);

        let err = service
            .import(&mut current, ExportDocument::from_state(&incoming, now()))
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "DUPLICATE_USER");
        assert_eq!(current, state());
        assert!(repo.load_users().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_backup_local_increments_counter() {
        let (service, repo) = service();
        let state = state();

        let key = service.backup_local(&state, now()).await.unwrap();
        assert_eq!(key, keys::local_backup(now().timestamp_millis()));
        assert_eq!(service.stats(&state).await.unwrap().snapshot_backups, 1);
        assert!(repo.latest_local_backup().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_restore_without_backup() {
        let (service, _) = service();
        let mut state = state();
        let err = service.restore_latest_local(&mut state).await.unwrap_err();
        assert_eq!(err.to_string(), "没有找到本地备份数据");
    }

    #[tokio::test]
    async fn test_write_and_read_export() {
        let (service, _) = service();
        let dir = tempfile::tempdir().unwrap();
        let document = service.export(&state(), now());

        let path = service
            .write_export(&document, dir.path(), now().date_naive())
            .await
            .unwrap();
        assert!(path.ends_with("box-exchange-backup-2024-05-15.json"));
        assert_eq!(service.read_export(&path).await.unwrap(), document);
    }
}
