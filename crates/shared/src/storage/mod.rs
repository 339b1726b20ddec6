//! 键值存储模块
//!
//! 以"命名键 -> 完整 JSON 文档"的方式持久化聚合数据，每次保存整体覆盖。
//!
//! ## 后端实现
//!
//! - `JsonFileStore`: 每个键一个 JSON 文件，临时文件 + rename 保证整体替换
//! - `MemoryStore`: 基于 DashMap 的内存存储，用于测试和临时运行

mod file_store;
mod memory_store;

pub use file_store::JsonFileStore;
pub use memory_store::MemoryStore;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{Result, StoreError};

/// 键值存储接口
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// 读取键对应的文档，不存在时返回 None
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    /// 写入（整体覆盖）键对应的文档
    async fn put(&self, key: &str, value: &Value) -> Result<()>;

    /// 删除键，返回键是否存在
    async fn remove(&self, key: &str) -> Result<bool>;

    /// 列出指定前缀的全部键，按字典序升序
    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>>;
}

/// 校验存储键
///
/// 键会直接映射为文件名，只允许 ASCII 字母、数字、`_` 和 `-`
pub fn validate_key(key: &str) -> Result<()> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');

    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(key.to_string()))
    }
}
