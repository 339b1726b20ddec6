//! 兑换服务错误类型
//!
//! 定义服务层的业务错误和系统错误。业务错误面向用户的文案保持不变，
//! 同时通过 `error_code` 提供稳定的错误码。

use thiserror::Error;

use exchange_shared::error::StoreError;

use crate::engine::Rejection;
use crate::models::BoxType;

/// 输入校验错误
///
/// 本地可恢复，不产生任何状态变更
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("账号必须是7位数字")]
    InvalidAccountId,

    #[error("密码至少需要4位字符")]
    PasswordTooShort,

    #[error("两次输入的密码不一致")]
    PasswordMismatch,

    #[error("账号已存在，请直接登录")]
    AccountExists,

    #[error("库存数据无效: {box_type} 剩余 {remaining} 超过总量 {total}")]
    InvalidInventory {
        box_type: BoxType,
        remaining: u32,
        total: u32,
    },

    #[error("用户数据无效: 账号 {0} 重复")]
    DuplicateUser(String),
}

impl ValidationError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidAccountId => "INVALID_ACCOUNT_ID",
            Self::PasswordTooShort => "PASSWORD_TOO_SHORT",
            Self::PasswordMismatch => "PASSWORD_MISMATCH",
            Self::AccountExists => "ACCOUNT_EXISTS",
            Self::InvalidInventory { .. } => "INVALID_INVENTORY",
            Self::DuplicateUser(_) => "DUPLICATE_USER",
        }
    }
}

/// 兑换服务错误类型
#[derive(Debug, Error)]
pub enum ExchangeError {
    // === 用户输入 ===
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("账号或密码错误")]
    Authentication,

    #[error("请先登录")]
    NotAuthenticated,

    // === 兑换资格 ===
    #[error(transparent)]
    Rejected(#[from] Rejection),

    // === 系统错误 ===
    #[error("保存失败，兑换已撤销: {0}")]
    Persistence(#[from] StoreError),

    #[error("数据格式错误: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("远程备份失败: {0}")]
    Backup(String),

    #[error("凭据处理失败: {0}")]
    Credential(String),

    #[error("初始数据加载失败: {0}")]
    Seed(String),

    #[error("没有找到本地备份数据")]
    NoLocalBackup,
}

/// 兑换服务 Result 类型别名
pub type Result<T> = std::result::Result<T, ExchangeError>;

impl ExchangeError {
    /// 检查是否为业务错误（非系统错误）
    pub fn is_business_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::Authentication
                | Self::NotAuthenticated
                | Self::Rejected(_)
                | Self::NoLocalBackup
        )
    }

    /// 获取错误码
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(e) => e.code(),
            Self::Authentication => "AUTHENTICATION_FAILED",
            Self::NotAuthenticated => "NOT_AUTHENTICATED",
            Self::Rejected(r) => r.code(),
            Self::Persistence(_) => "SAVE_FAILED",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
            Self::Backup(_) => "BACKUP_FAILED",
            Self::Credential(_) => "CREDENTIAL_ERROR",
            Self::Seed(_) => "SEED_ERROR",
            Self::NoLocalBackup => "NO_LOCAL_BACKUP",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_messages_are_user_facing() {
        let err: ExchangeError = ValidationError::InvalidAccountId.into();
        assert_eq!(err.to_string(), "账号必须是7位数字");
        assert_eq!(err.error_code(), "INVALID_ACCOUNT_ID");
    }

    #[test]
    fn test_rejection_passes_message_through() {
        let err: ExchangeError = Rejection::SoldOut {
            box_type: BoxType::Regular,
        }
        .into();
        assert_eq!(err.to_string(), "该宝箱已兑换完，请选择其他宝箱");
        assert_eq!(err.error_code(), "SOLD_OUT");
        assert!(err.is_business_error());
    }

    #[test]
    fn test_persistence_is_system_error() {
        let err: ExchangeError = StoreError::Unavailable("disk".to_string()).into();
        assert_eq!(err.error_code(), "SAVE_FAILED");
        assert!(!err.is_business_error());
    }
}
