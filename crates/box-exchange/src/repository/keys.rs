//! 存储键定义

/// 用户名册
pub const USERS: &str = "boxUsers";

/// 宝箱库存
pub const INVENTORY: &str = "boxInventory";

/// 兑换日志
pub const HISTORY: &str = "exchangeHistory";

/// 系统设置
pub const SYSTEM: &str = "systemSettings";

/// 全量备份次数
pub const SNAPSHOT_BACKUP_COUNT: &str = "githubBackupCount";

/// 兑换记录远程备份次数
pub const EXCHANGE_BACKUP_COUNT: &str = "githubExchangeBackupCount";

/// 本地备份键前缀
pub const LOCAL_BACKUP_PREFIX: &str = "boxBackup_";

/// 本地备份键：`boxBackup_{unix_millis}`
pub fn local_backup(unix_millis: i64) -> String {
    format!("{}{}", LOCAL_BACKUP_PREFIX, unix_millis)
}
