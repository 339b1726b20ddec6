//! CLI 命令定义
//!
//! 使用 clap derive 宏定义命令行接口结构。

use clap::{Args, Parser, Subcommand};

use crate::auth::sanitize_account_input;
use crate::models::BoxType;

/// 宝箱兑换命令行工具
#[derive(Parser, Debug)]
#[command(name = "box-exchange")]
#[command(version, about = "宝箱兑换系统")]
#[command(propagate_version = true)]
pub struct Cli {
    /// 日志级别 (trace, debug, info, warn, error)，覆盖配置文件
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    /// 配置文件目录，覆盖 CONFIG_DIR
    #[arg(long, global = true)]
    pub config_dir: Option<String>,

    /// 使用内存存储，进程退出后数据丢失
    #[arg(long, global = true)]
    pub ephemeral: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// 登录凭据
#[derive(Args, Debug, Clone)]
pub struct Credentials {
    /// 7 位数字账号，非数字字符会被忽略
    #[arg(short, long, value_parser = parse_account)]
    pub account: String,

    /// 密码
    #[arg(short, long)]
    pub password: String,
}

/// 账号参数只保留数字，最多 7 位
fn parse_account(raw: &str) -> Result<String, String> {
    Ok(sanitize_account_input(raw))
}

/// 子命令枚举
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 注册新账号
    Register {
        #[command(flatten)]
        credentials: Credentials,

        /// 确认密码（缺省与密码相同）
        #[arg(long)]
        confirm: Option<String>,
    },

    /// 查看宝箱库存、开启倒计时，提供凭据时附带账号状态
    Status {
        /// 7 位数字账号
        #[arg(short, long, requires = "password", value_parser = parse_account)]
        account: Option<String>,

        /// 密码
        #[arg(short, long, requires = "account")]
        password: Option<String>,
    },

    /// 兑换宝箱
    ///
    /// 不带 `--yes` 时显示确认信息并等待输入 y/N。
    Redeem {
        #[command(flatten)]
        credentials: Credentials,

        /// 宝箱类型：premium 或 regular
        #[arg(short, long = "box")]
        box_type: BoxType,

        /// 跳过确认
        #[arg(short, long)]
        yes: bool,
    },

    /// 查看个人兑换记录
    History {
        #[command(flatten)]
        credentials: Credentials,
    },

    /// 显示至尊宝箱开启倒计时
    Countdown,

    /// 每秒刷新倒计时
    Watch {
        /// 刷新次数，缺省时持续运行直到 Ctrl-C
        #[arg(short, long)]
        ticks: Option<u64>,
    },

    /// 导出全部数据为 JSON 文件
    Export {
        /// 输出目录
        #[arg(short, long, default_value = ".")]
        output: String,
    },

    /// 从导出文件导入全部数据
    Import {
        /// 导出文件路径
        #[arg(short, long)]
        file: String,
    },

    /// 保存本地全量备份，并尝试同步到远端
    Backup,

    /// 从最近一次本地备份恢复
    Restore,

    /// 列出远端兑换记录备份
    Issues,

    /// 显示统计信息
    Stats,
}

// ============================================================================
// 单元测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_redeem() {
        let cli = Cli::parse_from([
            "box-exchange",
            "redeem",
            "-a",
            "1234567",
            "-p",
            "secret",
            "--box",
            "premium",
        ]);
        match cli.command {
            Commands::Redeem {
                credentials,
                box_type,
                yes,
            } => {
                assert_eq!(credentials.account, "1234567");
                assert_eq!(box_type, BoxType::Premium);
                assert!(!yes);
            }
            _ => panic!("预期 Redeem 命令"),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_box() {
        let result = Cli::try_parse_from([
            "box-exchange",
            "redeem",
            "-a",
            "1234567",
            "-p",
            "secret",
            "--box",
            "gold",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::parse_from(["box-exchange", "stats", "--ephemeral", "-l", "debug"]);
        assert!(cli.ephemeral);
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        assert!(matches!(cli.command, Commands::Stats));
    }

    #[test]
    fn test_status_requires_both_credentials() {
        assert!(Cli::try_parse_from(["box-exchange", "status", "-a", "1234567"]).is_err());

        let cli = Cli::parse_from(["box-exchange", "status"]);
        match cli.command {
            Commands::Status { account, password } => {
                assert!(account.is_none());
                assert!(password.is_none());
            }
            _ => panic!("预期 Status 命令"),
        }
    }

    #[test]
    fn test_account_argument_keeps_digits_only() {
        let cli = Cli::parse_from([
            "box-exchange",
            "register",
            "-a",
            "12-34 5678",
            "-p",
            "abcd",
        ]);
        match cli.command {
            Commands::Register { credentials, .. } => {
                assert_eq!(credentials.account, "1234567");
            }
            _ => panic!("预期 Register 命令"),
        }

        let cli = Cli::parse_from(["box-exchange", "status", "-a", "id:7654321", "-p", "abcd"]);
        match cli.command {
            Commands::Status { account, .. } => assert_eq!(account.as_deref(), Some("7654321")),
            _ => panic!("预期 Status 命令"),
        }
    }

    #[test]
    fn test_watch_defaults() {
        let cli = Cli::parse_from(["box-exchange", "watch"]);
        assert!(matches!(cli.command, Commands::Watch { ticks: None }));
    }
}
