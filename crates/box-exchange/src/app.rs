//! 应用门面
//!
//! 持有内存中的完整状态、当前会话以及各业务服务，供展示层（命令行）调用。
//! 时区参数决定“本地时间”：开启时间、兑换日期和导出文件名都按该时区计算。

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use tracing::{error, info};

use exchange_shared::config::{AppConfig, ExchangeConfig};
use exchange_shared::observability::metrics;
use exchange_shared::storage::KeyValueStore;

use crate::backup::{BackupConnector, BackupSender, RemoteBackup};
use crate::display;
use crate::engine::ExchangeQuote;
use crate::error::{ExchangeError, Result};
use crate::models::{BoxType, ExchangeState, ExportDocument, User};
use crate::repository::{Aggregate, StateRepository};
use crate::schedule::{self, Countdown};
use crate::seed::{self, SeedFixture, StoredState};
use crate::service::{
    BoxDto, DashboardDto, ExchangeService, RedemptionReceipt, SessionService, SnapshotService,
    StatsDto, UserSummaryDto,
};

/// 应用门面
pub struct ExchangeApp<Tz: TimeZone = Local> {
    tz: Tz,
    repo: StateRepository,
    state: ExchangeState,
    session: Option<String>,
    exchange: ExchangeService,
    sessions: SessionService,
    snapshots: SnapshotService,
    backups: BackupSender,
    settings: ExchangeConfig,
}

impl<Tz: TimeZone> ExchangeApp<Tz> {
    /// 加载存储中的状态，并用初始数据补齐缺失部分
    pub async fn bootstrap(
        store: Arc<dyn KeyValueStore>,
        connector: Arc<dyn BackupConnector>,
        config: &AppConfig,
        fixture: Option<&SeedFixture>,
        tz: Tz,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        let repo = StateRepository::new(store);
        let stored = StoredState {
            users: repo.load_users().await?,
            boxes: repo.load_inventory().await?,
            history: repo.load_history().await?,
            system: repo.load_system().await?,
        };

        let empty = SeedFixture::default();
        let (mut state, mut dirty) = seed::initial_state(
            stored,
            fixture.unwrap_or(&empty),
            config.security.bcrypt_cost,
            now,
            schedule::next_premium_open(now, &tz),
        )?;

        // 启动即一次观察，过期的开启时间先补齐再提供服务
        let (next, weeks) = schedule::catch_up(state.system.next_premium_open, now, &tz);
        if weeks > 0 {
            state.system.next_premium_open = next;
            if !dirty.contains(&Aggregate::System) {
                dirty.push(Aggregate::System);
            }
            metrics::record_schedule_advance(weeks);
            info!(weeks, next_open = %next, "启动时补齐至尊宝箱开启时间");
        }

        for aggregate in &dirty {
            repo.save_aggregate(&state, *aggregate).await?;
        }

        info!(
            users = state.users.len(),
            exchanges = state.history.len(),
            initialized = dirty.len(),
            "兑换数据已加载"
        );

        let backups = BackupSender::new(connector, repo.clone());
        info!(
            environment = %config.environment,
            backup_configured = backups.is_configured(),
            "兑换服务已就绪"
        );
        Ok(Self {
            tz,
            exchange: ExchangeService::new(repo.clone(), backups.clone()),
            sessions: SessionService::new(repo.clone(), config.security.bcrypt_cost),
            snapshots: SnapshotService::new(repo.clone(), backups.clone()),
            repo,
            state,
            session: None,
            backups,
            settings: config.exchange.clone(),
        })
    }

    /// 当前完整状态（只读）
    pub fn state(&self) -> &ExchangeState {
        &self.state
    }

    /// 本地日期
    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.tz).date_naive()
    }

    // === 会话 ===

    /// 注册并登录
    pub async fn register(
        &mut self,
        account: &str,
        password: &str,
        confirm: &str,
        now: DateTime<Utc>,
    ) -> Result<User> {
        let user = self
            .sessions
            .register(&mut self.state, account, password, confirm, now)
            .await?;
        self.session = Some(user.id.clone());
        Ok(user)
    }

    pub fn login(&mut self, account: &str, password: &str) -> Result<User> {
        let user = self.sessions.login(&self.state, account, password)?;
        self.session = Some(user.id.clone());
        Ok(user)
    }

    /// 登出，总是成功
    pub fn logout(&mut self) {
        if let Some(user_id) = self.session.take() {
            info!(user_id = %user_id, "用户已登出");
        }
    }

    pub fn current_user(&self) -> Option<&User> {
        self.session
            .as_deref()
            .and_then(|id| self.state.users.find(id))
    }

    fn require_session(&self) -> Result<String> {
        self.current_user()
            .map(|u| u.id.clone())
            .ok_or(ExchangeError::NotAuthenticated)
    }

    // === 兑换 ===

    /// 校验兑换资格并返回确认信息，不修改任何状态
    pub fn preview_exchange(&self, box_type: BoxType, now: DateTime<Utc>) -> Result<ExchangeQuote> {
        let user_id = self.require_session()?;
        self.exchange.preview(&self.state, &user_id, box_type, now)
    }

    /// 提交兑换，`confirmed` 为用户对确认信息的答复
    pub async fn confirm_exchange(
        &mut self,
        box_type: BoxType,
        confirmed: bool,
        now: DateTime<Utc>,
    ) -> Result<RedemptionReceipt> {
        let user_id = self.require_session()?;
        let today = self.today(now);
        self.exchange
            .redeem(&mut self.state, &user_id, box_type, confirmed, now, today)
            .await
    }

    // === 开启时间 ===

    /// 一次观察：必要时推进开启时间并保存，返回倒计时
    pub async fn tick(&mut self, now: DateTime<Utc>) -> Result<Countdown> {
        let stored = self.state.system.next_premium_open;
        let (next, weeks) = schedule::catch_up(stored, now, &self.tz);

        if weeks > 0 {
            self.state.system.next_premium_open = next;
            if let Err(e) = self.repo.save_system(&self.state.system).await {
                error!(error = %e, "保存开启时间失败");
                self.state.system.next_premium_open = stored;
                return Err(e.into());
            }
            metrics::record_schedule_advance(weeks);
            info!(weeks, next_open = %next, "至尊宝箱开启时间已推进");
        }

        Ok(Countdown::until(self.state.system.next_premium_open, now))
    }

    /// 主界面数据
    pub fn dashboard(&self, now: DateTime<Utc>) -> DashboardDto {
        let user = self.current_user();
        DashboardDto {
            user: user.map(|u| UserSummaryDto::of(u, now)),
            boxes: BoxType::ALL
                .iter()
                .map(|&t| BoxDto::of(t, self.state.boxes.get(t), &self.settings.low_stock))
                .collect(),
            exchange_enabled: self.state.system.exchange_enabled,
            countdown: Countdown::until(self.state.system.next_premium_open, now).label(),
            history: user
                .map(|u| {
                    display::history_rows(
                        &self.state.history,
                        &u.id,
                        self.settings.history_display_limit,
                    )
                })
                .unwrap_or_default(),
        }
    }

    // === 导出与备份 ===

    pub fn export(&self, now: DateTime<Utc>) -> ExportDocument {
        self.snapshots.export(&self.state, now)
    }

    /// 导出到目录，返回文件路径
    pub async fn write_export(&self, dir: &Path, now: DateTime<Utc>) -> Result<PathBuf> {
        let document = self.export(now);
        self.snapshots
            .write_export(&document, dir, self.today(now))
            .await
    }

    pub async fn import(&mut self, mut document: ExportDocument) -> Result<()> {
        self.sessions.hash_plaintext_passwords(&mut document.users)?;
        self.snapshots.import(&mut self.state, document).await?;
        self.drop_stale_session();
        Ok(())
    }

    pub async fn import_file(&mut self, path: &Path) -> Result<()> {
        let document = self.snapshots.read_export(path).await?;
        self.import(document).await
    }

    /// 本地全量备份，并尽力同步到远端
    pub async fn backup_local(&self, now: DateTime<Utc>) -> Result<String> {
        self.snapshots.backup_local(&self.state, now).await
    }

    pub async fn restore_latest_local(&mut self) -> Result<String> {
        let key = self.snapshots.restore_latest_local(&mut self.state).await?;
        self.drop_stale_session();
        Ok(key)
    }

    pub async fn stats(&self) -> Result<StatsDto> {
        self.snapshots.stats(&self.state).await
    }

    /// 列出远端兑换记录备份
    pub async fn list_remote_backups(&self) -> Result<Vec<RemoteBackup>> {
        self.backups.list_exchange_backups().await
    }

    /// 等待所有后台远程备份结束
    pub async fn flush_backups(&self) -> usize {
        self.backups.flush().await
    }

    /// 替换数据后当前用户可能已不存在
    fn drop_stale_session(&mut self) {
        if self.session.is_some() && self.current_user().is_none() {
            self.logout();
        }
    }
}
