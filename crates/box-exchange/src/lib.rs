//! 宝箱兑换服务
//!
//! 用户以账号登录，积累积分，并在库存、每周限额与冷却期的约束下兑换两类宝箱。
//!
//! ## 核心功能
//!
//! - **兑换规则引擎**：按固定顺序校验兑换资格，首个失败项即拒绝；校验通过后原子地扣分、减库存、记账
//! - **开启时间调度**：至尊宝箱每周一 10:00（本地时间）开启，过期后惰性推进
//! - **会话管理**：注册、登录、登出，凭据以 bcrypt 哈希保存
//! - **展示投影**：兑换资格、冷却剩余天数、倒计时等纯函数
//! - **导出与备份**：全量快照导出/导入、本地备份与恢复、远程尽力备份
//!
//! ## 模块结构
//!
//! - `models`: 领域模型定义
//! - `error`: 错误类型定义
//! - `engine`: 兑换资格校验与兑换提交
//! - `schedule`: 至尊宝箱开启时间计算
//! - `display`: 展示用派生值
//! - `auth`: 凭据哈希与账号格式校验
//! - `repository`: 聚合数据的持久化
//! - `service`: 业务服务层
//! - `backup`: 远程备份连接器
//! - `seed`: 初始数据加载
//! - `app`: 面向展示层的应用门面
//! - `cli`: 命令行前端

pub mod app;
pub mod auth;
pub mod backup;
pub mod cli;
pub mod display;
pub mod engine;
pub mod error;
pub mod models;
pub mod repository;
pub mod schedule;
pub mod seed;
pub mod service;

pub use app::ExchangeApp;
pub use backup::{BackupConnector, BackupOutcome, BackupSender};
pub use engine::{ExchangeQuote, Rejection};
pub use error::{ExchangeError, Result, ValidationError};
pub use models::*;
pub use repository::StateRepository;
pub use service::{ExchangeService, SessionService, SnapshotService, dto};
