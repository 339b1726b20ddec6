//! 宝箱兑换服务
//!
//! 处理兑换的完整流程：
//! - 资格校验（按固定顺序，首个失败即拒绝）
//! - 用户确认
//! - 内存状态变更
//! - 按 用户 -> 库存 -> 日志 的顺序保存
//! - 保存成功后异步远程备份
//!
//! ## 保存失败
//!
//! 任一聚合保存失败时，内存状态恢复到提交前快照，已写入的聚合按快照重新保存，
//! 向调用方返回 `Persistence` 错误。远程备份只在全部保存成功后发出。

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{error, info, instrument, warn};

use exchange_shared::observability::metrics;

use crate::backup::BackupSender;
use crate::engine::{self, ExchangeQuote, Rejection};
use crate::error::{ExchangeError, Result};
use crate::models::{BoxType, ExchangeState};
use crate::repository::{Aggregate, StateRepository};
use crate::service::dto::RedemptionReceipt;

/// 兑换涉及的聚合及保存顺序
const COMMIT_ORDER: [Aggregate; 3] = [Aggregate::Users, Aggregate::Inventory, Aggregate::History];

/// 宝箱兑换服务
#[derive(Clone)]
pub struct ExchangeService {
    repo: StateRepository,
    backups: BackupSender,
}

impl ExchangeService {
    pub fn new(repo: StateRepository, backups: BackupSender) -> Self {
        Self { repo, backups }
    }

    /// 校验兑换资格，不修改任何状态
    ///
    /// 通过时返回报价，用于生成确认文案
    pub fn preview(
        &self,
        state: &ExchangeState,
        user_id: &str,
        box_type: BoxType,
        now: DateTime<Utc>,
    ) -> Result<ExchangeQuote> {
        let user = state
            .users
            .find(user_id)
            .ok_or(ExchangeError::NotAuthenticated)?;

        engine::evaluate(user, box_type, &state.boxes, &state.system, now).map_err(|rejection| {
            warn!(
                user_id = %user_id,
                box_type = %box_type,
                code = rejection.code(),
                "兑换资格校验未通过"
            );
            metrics::record_redemption(box_type.key(), rejection.code());
            ExchangeError::Rejected(rejection)
        })
    }

    /// 执行兑换
    ///
    /// `confirmed` 为用户对确认文案的答复，拒绝时不产生任何变更
    #[instrument(skip(self, state, box_type), fields(box_type = %box_type))]
    pub async fn redeem(
        &self,
        state: &mut ExchangeState,
        user_id: &str,
        box_type: BoxType,
        confirmed: bool,
        now: DateTime<Utc>,
        today: NaiveDate,
    ) -> Result<RedemptionReceipt> {
        // 1. 资格校验
        let quote = self.preview(state, user_id, box_type, now)?;

        // 2. 用户确认
        if !confirmed {
            info!(user_id = %user_id, "用户取消兑换");
            metrics::record_redemption(box_type.key(), Rejection::ConfirmationDeclined.code());
            return Err(Rejection::ConfirmationDeclined.into());
        }

        // 3. 内存变更
        let snapshot = state.clone();
        let record = {
            let ExchangeState {
                users,
                boxes,
                history,
                ..
            } = &mut *state;
            let user = users
                .find_mut(user_id)
                .ok_or(ExchangeError::NotAuthenticated)?;
            engine::apply(user, boxes.get_mut(box_type), history, &quote, now, today)
        };

        // 4. 持久化
        if let Err(e) = self.persist(state).await {
            error!(user_id = %user_id, error = %e, "兑换保存失败，回滚内存状态");
            *state = snapshot;
            self.restore(state).await;
            metrics::record_redemption(box_type.key(), "persistence_failed");
            return Err(e.into());
        }

        let receipt = RedemptionReceipt::new(
            &quote,
            record.clone(),
            state.users.find(user_id).map(|u| u.points).unwrap_or_default(),
            state.boxes.get(box_type).remaining,
        );

        info!(
            user_id = %user_id,
            cost = quote.cost,
            remaining = receipt.remaining_stock,
            "兑换成功"
        );
        metrics::record_redemption(box_type.key(), "success");

        // 5. 远程备份（不影响兑换结果）
        self.backups.send_exchange(record);

        Ok(receipt)
    }

    async fn persist(&self, state: &ExchangeState) -> exchange_shared::error::Result<()> {
        for aggregate in COMMIT_ORDER {
            self.repo.save_aggregate(state, aggregate).await?;
        }
        Ok(())
    }

    /// 以回滚后的状态覆盖可能已写入的聚合
    async fn restore(&self, state: &ExchangeState) {
        for aggregate in COMMIT_ORDER {
            if let Err(e) = self.repo.save_aggregate(state, aggregate).await {
                warn!(key = aggregate.key(), error = %e, "回滚时恢复聚合失败");
            }
        }
    }
}
