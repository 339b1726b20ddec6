//! CLI 模块
//!
//! 提供命令行前端，驱动与网页版相同的会话与兑换流程：
//!
//! - `register` - 注册账号
//! - `status` - 查看宝箱库存、账号状态与开启倒计时
//! - `redeem` - 兑换宝箱
//! - `history` - 查看个人兑换记录
//! - `countdown` / `watch` - 至尊宝箱开启倒计时
//! - `export` / `import` - 全量导出与导入
//! - `backup` / `restore` - 本地备份与恢复
//! - `issues` - 列出远端兑换记录备份
//! - `stats` - 统计信息
//!
//! # 使用示例
//!
//! ```bash
//! # 注册
//! box-exchange register -a 1234567 -p secret
//!
//! # 兑换战功宝箱（跳过确认）
//! box-exchange redeem -a 1234567 -p secret --box regular --yes
//!
//! # 持续刷新倒计时 10 秒
//! box-exchange watch --ticks 10
//! ```

pub mod commands;
pub mod runner;

pub use commands::{Cli, Commands, Credentials};
pub use runner::CommandRunner;
