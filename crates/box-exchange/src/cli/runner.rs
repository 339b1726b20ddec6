//! 命令执行器
//!
//! 负责执行各 CLI 子命令的具体逻辑，把命令行参数转化为对应用门面的调用。

use std::io::{BufRead, Write as _};
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{Local, TimeZone, Utc};
use tracing::{info, warn};

use crate::app::ExchangeApp;
use crate::cli::commands::{Commands, Credentials};
use crate::engine::Rejection;
use crate::error::ExchangeError;
use crate::models::BoxType;

/// 命令执行器
///
/// 作为 CLI 与应用门面之间的桥梁，简化 main 函数的复杂度。
pub struct CommandRunner<Tz: TimeZone = Local> {
    app: ExchangeApp<Tz>,
}

impl<Tz: TimeZone> CommandRunner<Tz> {
    pub fn new(app: ExchangeApp<Tz>) -> Self {
        Self { app }
    }

    /// 执行子命令，结束前等待后台远程备份完成
    pub async fn run(&mut self, command: Commands) -> Result<()> {
        let result = self.dispatch(command).await;

        let flushed = self.app.flush_backups().await;
        if flushed > 0 {
            info!(flushed, "后台远程备份已结束");
        }
        result
    }

    async fn dispatch(&mut self, command: Commands) -> Result<()> {
        match command {
            Commands::Register {
                credentials,
                confirm,
            } => self.run_register(&credentials, confirm.as_deref()).await,
            Commands::Status { account, password } => match (account, password) {
                (Some(account), Some(password)) => {
                    self.run_status(Some(&Credentials { account, password }))
                }
                _ => self.run_status(None),
            },
            Commands::Redeem {
                credentials,
                box_type,
                yes,
            } => self.run_redeem(&credentials, box_type, yes).await,
            Commands::History { credentials } => self.run_history(&credentials),
            Commands::Countdown => self.run_countdown().await,
            Commands::Watch { ticks } => self.run_watch(ticks).await,
            Commands::Export { output } => self.run_export(&output).await,
            Commands::Import { file } => self.run_import(&file).await,
            Commands::Backup => self.run_backup().await,
            Commands::Restore => self.run_restore().await,
            Commands::Issues => self.run_issues().await,
            Commands::Stats => self.run_stats().await,
        }
    }

    fn login(&mut self, credentials: &Credentials) -> Result<()> {
        self.app.login(&credentials.account, &credentials.password)?;
        Ok(())
    }

    /// 执行 register 命令
    async fn run_register(
        &mut self,
        credentials: &Credentials,
        confirm: Option<&str>,
    ) -> Result<()> {
        let user = self
            .app
            .register(
                &credentials.account,
                &credentials.password,
                confirm.unwrap_or(&credentials.password),
                Utc::now(),
            )
            .await?;

        println!("注册成功！账号: {}", user.id);
        Ok(())
    }

    /// 执行 status 命令
    fn run_status(&mut self, credentials: Option<&Credentials>) -> Result<()> {
        if let Some(credentials) = credentials {
            self.login(credentials)?;
        }

        let dashboard = self.app.dashboard(Utc::now());

        println!("\n宝箱库存:");
        println!("{}", "-".repeat(40));
        for b in &dashboard.boxes {
            let marker = if b.low_stock { " (库存紧张)" } else { "" };
            println!("  {} - {}积分 - {}{}", b.name, b.cost, b.stock_label, marker);
        }
        println!("{}", "-".repeat(40));

        if !dashboard.exchange_enabled {
            println!("兑换系统暂时关闭");
        }
        println!("至尊宝箱开启倒计时: {}", dashboard.countdown);

        match dashboard.user {
            Some(user) => {
                println!("\n账号: {} ({})", user.id, user.account_label);
                println!("积分: {}", user.points);
                println!("本周兑换: {}", user.weekly_label);
                println!("下次可兑换: {}", user.next_exchange_label);
                println!("至尊宝箱冷却: {}", user.premium_cooldown_label);
            }
            None => println!("\n未登录"),
        }
        Ok(())
    }

    /// 执行 redeem 命令
    async fn run_redeem(
        &mut self,
        credentials: &Credentials,
        box_type: BoxType,
        yes: bool,
    ) -> Result<()> {
        self.login(credentials)?;

        let quote = self.app.preview_exchange(box_type, Utc::now())?;
        let confirmed = yes || prompt_confirmation(&quote.confirmation_message())?;

        match self
            .app
            .confirm_exchange(box_type, confirmed, Utc::now())
            .await
        {
            Ok(receipt) => {
                println!("{}", receipt.message());
                println!("剩余积分: {}", receipt.remaining_points);
                Ok(())
            }
            Err(ExchangeError::Rejected(Rejection::ConfirmationDeclined)) => {
                println!("{}", Rejection::ConfirmationDeclined);
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// 执行 history 命令
    fn run_history(&mut self, credentials: &Credentials) -> Result<()> {
        self.login(credentials)?;
        let dashboard = self.app.dashboard(Utc::now());

        if dashboard.history.is_empty() {
            println!("暂无兑换记录");
            return Ok(());
        }

        println!("\n兑换记录:");
        println!("{}", "-".repeat(40));
        for row in &dashboard.history {
            println!(
                "  {}  {}  -{}积分  {}",
                row.date.format("%Y-%m-%d"),
                row.box_label,
                row.cost,
                row.status_label
            );
        }
        println!("{}", "-".repeat(40));
        Ok(())
    }

    /// 执行 countdown 命令
    async fn run_countdown(&mut self) -> Result<()> {
        let countdown = self.app.tick(Utc::now()).await?;
        println!("至尊宝箱开启倒计时: {}", countdown.label());
        Ok(())
    }

    /// 执行 watch 命令
    ///
    /// 每秒观察一次开启时间，过期时自动推进
    async fn run_watch(&mut self, ticks: Option<u64>) -> Result<()> {
        let mut interval = tokio::time::interval(Duration::from_secs(1));
        let mut remaining = ticks;

        loop {
            if remaining == Some(0) {
                break;
            }

            tokio::select! {
                _ = interval.tick() => {}
                _ = tokio::signal::ctrl_c() => {
                    println!();
                    break;
                }
            }

            let countdown = self.app.tick(Utc::now()).await?;
            print!("\r至尊宝箱开启倒计时: {}   ", countdown.label());
            std::io::stdout().flush().context("写入终端失败")?;

            remaining = remaining.map(|n| n - 1);
        }

        println!();
        Ok(())
    }

    /// 执行 export 命令
    async fn run_export(&mut self, output: &str) -> Result<()> {
        let path = self.app.write_export(Path::new(output), Utc::now()).await?;
        println!("数据已导出: {}", path.display());
        Ok(())
    }

    /// 执行 import 命令
    async fn run_import(&mut self, file: &str) -> Result<()> {
        self.app.import_file(Path::new(file)).await?;
        println!("数据导入成功");
        Ok(())
    }

    /// 执行 backup 命令
    async fn run_backup(&mut self) -> Result<()> {
        let key = self.app.backup_local(Utc::now()).await?;
        println!("数据已备份到本地: {}", key);
        Ok(())
    }

    /// 执行 restore 命令
    async fn run_restore(&mut self) -> Result<()> {
        match self.app.restore_latest_local().await {
            Ok(key) => {
                println!("数据已从本地备份恢复: {}", key);
                Ok(())
            }
            Err(ExchangeError::NoLocalBackup) => {
                println!("{}", ExchangeError::NoLocalBackup);
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// 执行 issues 命令
    async fn run_issues(&mut self) -> Result<()> {
        let issues = match self.app.list_remote_backups().await {
            Ok(issues) => issues,
            Err(e) => {
                warn!(error = %e, "获取远端备份失败");
                Vec::new()
            }
        };

        if issues.is_empty() {
            println!("没有远端兑换记录备份");
            return Ok(());
        }

        println!("\n远端兑换记录备份:");
        println!("{}", "-".repeat(60));
        for issue in &issues {
            println!("  #{} {} {}", issue.number, issue.title, issue.html_url);
        }
        println!("{}", "-".repeat(60));
        Ok(())
    }

    /// 执行 stats 命令
    async fn run_stats(&mut self) -> Result<()> {
        let stats = self.app.stats().await?;
        println!("本地用户: {}", stats.users);
        println!("兑换记录: {}", stats.exchanges);
        println!("本地备份: {}", stats.snapshot_backups);
        println!("远程兑换备份: {}", stats.exchange_backups);
        Ok(())
    }
}

/// 显示确认信息并读取 y/N
fn prompt_confirmation(message: &str) -> Result<bool> {
    println!("{}", message);
    print!("确认兑换? [y/N] ");
    std::io::stdout().flush().context("写入终端失败")?;

    let mut answer = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("读取输入失败")?;

    Ok(matches!(answer.trim(), "y" | "Y" | "yes" | "YES"))
}
