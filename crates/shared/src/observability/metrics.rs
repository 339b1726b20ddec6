//! Prometheus 指标模块
//!
//! 基于 metrics crate 记录业务指标，启用时通过 metrics-exporter-prometheus
//! 在独立端口暴露 `/metrics` 供 Prometheus 抓取。

use anyhow::Result;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::info;

use super::ObservabilityConfig;

/// Metrics 资源守卫
pub struct MetricsHandle {
    pub addr: SocketAddr,
}

/// 初始化 Prometheus 指标导出
///
/// 需要在 tokio 运行时内调用，导出器会在后台任务中监听端口。
pub fn init(config: &ObservabilityConfig) -> Result<MetricsHandle> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.metrics_port));
    PrometheusBuilder::new().with_http_listener(addr).install()?;

    register_common_metrics();
    info!(%addr, "Metrics exporter listening");

    Ok(MetricsHandle { addr })
}

/// 注册业务指标描述
fn register_common_metrics() {
    metrics::describe_counter!(
        "box_redemptions_total",
        "Total number of box redemption attempts by outcome"
    );
    metrics::describe_counter!(
        "box_backups_total",
        "Total number of remote backup attempts by outcome"
    );
    metrics::describe_counter!(
        "premium_schedule_advances_total",
        "Total number of weeks the premium unlock schedule advanced"
    );
}

/// 记录一次兑换尝试
///
/// outcome 为 "success"、拒绝原因码或 "persistence_failed"
pub fn record_redemption(box_type: &str, outcome: &str) {
    metrics::counter!(
        "box_redemptions_total",
        "box_type" => box_type.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

/// 记录一次远程备份
///
/// kind 为 "exchange" 或 "snapshot"
pub fn record_backup(kind: &str, outcome: &str) {
    metrics::counter!(
        "box_backups_total",
        "kind" => kind.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

/// 记录至尊宝箱开启时间的推进周数
pub fn record_schedule_advance(weeks: u32) {
    metrics::counter!("premium_schedule_advances_total").increment(u64::from(weeks));
}
