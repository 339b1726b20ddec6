//! 统一错误处理模块
//!
//! 定义基础设施层共享的错误类型，使用 thiserror 提供良好的错误信息。

use thiserror::Error;

/// 存储错误类型
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("存储 I/O 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON 序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("无效的存储键: {0}")]
    InvalidKey(String),

    #[error("存储不可用: {0}")]
    Unavailable(String),
}

/// 存储 Result 类型别名
pub type Result<T> = std::result::Result<T, StoreError>;

impl StoreError {
    /// 获取错误码
    pub fn code(&self) -> &'static str {
        match self {
            Self::Io(_) => "STORE_IO_ERROR",
            Self::Serialization(_) => "STORE_SERIALIZATION_ERROR",
            Self::InvalidKey(_) => "STORE_INVALID_KEY",
            Self::Unavailable(_) => "STORE_UNAVAILABLE",
        }
    }

    /// 是否为可重试错误
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io(_) | Self::Unavailable(_))
    }
}
