//! GitHub 备份连接器
//!
//! 兑换记录以 Issue 形式备份，全量快照以私有 Gist 形式备份。
//! 请求体由纯函数构造，便于单独测试。

use std::time::Duration;

use async_trait::async_trait;
use chrono::Local;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, info};

use exchange_shared::config::BackupConfig;

use super::connector::{BackupConnector, BackupOutcome, RemoteBackup};
use crate::error::{ExchangeError, Result};
use crate::models::{ExchangeRecord, LocalBackup};

const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";
const GIST_FILE_NAME: &str = "box-exchange-backup.json";
const USER_AGENT: &str = "box-exchange";

/// 创建接口返回的资源地址
#[derive(Debug, Deserialize)]
struct CreatedResource {
    html_url: String,
}

/// 兑换记录 Issue 标题
pub fn issue_title(record: &ExchangeRecord) -> String {
    format!("兑换记录备份 {}", record.date.format("%Y-%m-%d"))
}

/// 兑换记录 Issue 正文：摘要 + 原始 JSON
pub fn issue_body(record: &ExchangeRecord) -> Result<String> {
    let raw = serde_json::to_string_pretty(record)?;
    Ok(format!(
        "## 兑换记录备份\n\n\
         **用户**: {}\n\
         **宝箱类型**: {}\n\
         **消耗积分**: {}\n\
         **兑换日期**: {}\n\
         **状态**: {}\n\n\
         ## 原始数据\n\
         ```json\n{}\n```\n",
        record.user_id,
        record.box_type.label(),
        record.cost,
        record.date.format("%Y-%m-%d"),
        record.status.label(),
        raw
    ))
}

/// 创建 Issue 的请求体
pub fn issue_payload(record: &ExchangeRecord, labels: &[String]) -> Result<Value> {
    Ok(json!({
        "title": issue_title(record),
        "body": issue_body(record)?,
        "labels": labels,
    }))
}

/// 创建私有 Gist 的请求体
pub fn gist_payload(snapshot: &LocalBackup, description_time: &str) -> Result<Value> {
    let content = serde_json::to_string_pretty(snapshot)?;
    Ok(json!({
        "description": format!("宝箱兑换系统备份 {}", description_time),
        "public": false,
        "files": {
            GIST_FILE_NAME: { "content": content }
        }
    }))
}

/// GitHub 备份连接器
pub struct GithubBackupConnector {
    client: reqwest::Client,
    api_base: String,
    owner: String,
    repo: String,
    labels: Vec<String>,
}

impl GithubBackupConnector {
    /// 根据配置创建连接器，token 缺失时返回错误
    pub fn new(config: &BackupConfig) -> Result<Self> {
        let token = config
            .token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ExchangeError::Backup("未配置 GitHub token".to_string()))?;

        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("token {}", token))
            .map_err(|e| ExchangeError::Backup(format!("无效的 token: {e}")))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_ACCEPT));

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()
            .map_err(|e| ExchangeError::Backup(format!("创建 HTTP 客户端失败: {e}")))?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            owner: config.owner.clone(),
            repo: config.repo.clone(),
            labels: config.issue_labels.clone(),
        })
    }

    fn issues_url(&self) -> String {
        format!("{}/repos/{}/{}/issues", self.api_base, self.owner, self.repo)
    }

    fn gists_url(&self) -> String {
        format!("{}/gists", self.api_base)
    }

    async fn post(&self, url: &str, payload: &Value) -> Result<CreatedResource> {
        let resp = self
            .client
            .post(url)
            .json(payload)
            .send()
            .await
            .map_err(|e| ExchangeError::Backup(format!("请求 GitHub 失败: {e}")))?;

        if !resp.status().is_success() {
            return Err(ExchangeError::Backup(format!(
                "GitHub API 错误: {}",
                resp.status().as_u16()
            )));
        }

        resp.json()
            .await
            .map_err(|e| ExchangeError::Backup(format!("解析 GitHub 响应失败: {e}")))
    }
}

#[async_trait]
impl BackupConnector for GithubBackupConnector {
    fn is_configured(&self) -> bool {
        true
    }

    async fn backup_exchange(&self, record: &ExchangeRecord) -> Result<BackupOutcome> {
        let payload = issue_payload(record, &self.labels)?;
        let created = self.post(&self.issues_url(), &payload).await?;

        info!(user_id = %record.user_id, url = %created.html_url, "兑换记录已备份到 GitHub Issues");
        Ok(BackupOutcome::Stored {
            url: created.html_url,
        })
    }

    async fn backup_snapshot(&self, snapshot: &LocalBackup) -> Result<BackupOutcome> {
        let local_time = snapshot
            .timestamp
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string();
        let payload = gist_payload(snapshot, &local_time)?;
        let created = self.post(&self.gists_url(), &payload).await?;

        info!(url = %created.html_url, "数据已备份到 GitHub Gist");
        Ok(BackupOutcome::Stored {
            url: created.html_url,
        })
    }

    async fn list_exchange_backups(&self) -> Result<Vec<RemoteBackup>> {
        let labels = self.labels.join(",");
        let resp = self
            .client
            .get(self.issues_url())
            .query(&[("labels", labels.as_str())])
            .send()
            .await
            .map_err(|e| ExchangeError::Backup(format!("请求 GitHub 失败: {e}")))?;

        if !resp.status().is_success() {
            return Err(ExchangeError::Backup(format!(
                "GitHub API 错误: {}",
                resp.status().as_u16()
            )));
        }

        let issues: Vec<RemoteBackup> = resp
            .json()
            .await
            .map_err(|e| ExchangeError::Backup(format!("解析 GitHub 响应失败: {e}")))?;

        debug!(count = issues.len(), "已获取远端兑换记录备份");
        Ok(issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BoxInventory, BoxType, ExchangeLog, ExchangeState, SystemSettings, UserRoster};
    use chrono::{NaiveDate, TimeZone, Utc};

    fn record() -> ExchangeRecord {
        ExchangeRecord::completed(
            "1234567",
            BoxType::Premium,
            20000,
            NaiveDate::from_ymd_opt(2024, 5, 20).unwrap(),
        )
    }

    fn config(api_base: &str) -> BackupConfig {
        BackupConfig {
            api_base: api_base.to_string(),
            owner: "owner".to_string(),
            token: Some("secret".to_string()),
            timeout_seconds: 2,
            ..BackupConfig::default()
        }
    }

    #[test]
    fn test_issue_payload() {
        let labels = vec!["box-exchange-data".to_string()];
        let payload = issue_payload(&record(), &labels).unwrap();

        assert_eq!(payload["title"], "兑换记录备份 2024-05-20");
        assert_eq!(payload["labels"], json!(["box-exchange-data"]));

        let body = payload["body"].as_str().unwrap();
        assert!(body.contains("**用户**: 1234567"));
        assert!(body.contains("**宝箱类型**: 至尊宝箱"));
        assert!(body.contains("**消耗积分**: 20000"));
        assert!(body.contains("\"boxType\": \"premium\""));
    }

    #[test]
    fn test_gist_payload() {
        let now = Utc.with_ymd_and_hms(2024, 5, 20, 2, 0, 0).unwrap();
        let state = ExchangeState {
            users: UserRoster::default(),
            boxes: BoxInventory::default(),
            history: ExchangeLog::default(),
            system: SystemSettings::new(now, now),
        };
        let snapshot = LocalBackup::from_state(&state, now);
        let payload = gist_payload(&snapshot, "2024-05-20 10:00:00").unwrap();

        assert_eq!(payload["description"], "宝箱兑换系统备份 2024-05-20 10:00:00");
        assert_eq!(payload["public"], false);

        let content = payload["files"][GIST_FILE_NAME]["content"].as_str().unwrap();
        let parsed: LocalBackup = serde_json::from_str(content).unwrap();
        assert_eq!(parsed, snapshot);
    }

    #[test]
    fn test_missing_token_is_rejected() {
        let mut cfg = config("https://api.github.com");
        cfg.token = Some("  ".to_string());
        assert!(GithubBackupConnector::new(&cfg).is_err());
    }

    #[tokio::test]
    async fn test_transport_failure_is_backup_error() {
        // 端口 9 通常无人监听，连接会立即失败
        let connector = GithubBackupConnector::new(&config("http://127.0.0.1:9")).unwrap();
        let err = connector.backup_exchange(&record()).await.unwrap_err();
        assert_eq!(err.error_code(), "BACKUP_FAILED");
    }
}
