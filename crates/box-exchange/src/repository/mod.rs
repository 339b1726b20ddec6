//! 状态仓储层
//!
//! 在键值存储之上提供按聚合的类型化读写。
//!
//! ## 设计原则
//!
//! - 每个聚合对应一个命名键，保存时整体序列化覆盖
//! - 仓储只负责数据持久化，不包含业务逻辑
//! - 保存顺序与失败回滚由服务层决定

pub mod keys;
mod state_repo;

pub use state_repo::{Aggregate, StateRepository};
