//! 配置管理模块
//!
//! 支持多格式配置文件加载，环境变量覆盖，以及类型安全的配置访问。

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::observability::ObservabilityConfig;

/// 存储配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// 键值存储目录，每个键对应一个 JSON 文件
    pub data_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "data".to_string(),
        }
    }
}

impl StorageConfig {
    pub fn data_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir)
    }
}

/// 低库存提示阈值
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LowStockConfig {
    pub premium: u32,
    pub regular: u32,
}

impl Default for LowStockConfig {
    fn default() -> Self {
        Self {
            premium: 2,
            regular: 5,
        }
    }
}

/// 兑换展示配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExchangeConfig {
    /// 用户兑换记录最多展示条数
    pub history_display_limit: usize,
    pub low_stock: LowStockConfig,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            history_display_limit: 10,
            low_stock: LowStockConfig::default(),
        }
    }
}

/// 安全配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// bcrypt 哈希成本（4..=31）
    pub bcrypt_cost: u32,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self { bcrypt_cost: 12 }
    }
}

/// 远程备份配置
///
/// 未配置 token 时远程备份整体禁用
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BackupConfig {
    pub enabled: bool,
    pub api_base: String,
    pub owner: String,
    pub repo: String,
    pub token: Option<String>,
    pub issue_labels: Vec<String>,
    pub timeout_seconds: u64,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_base: "https://api.github.com".to_string(),
            owner: String::new(),
            repo: "box-exchange".to_string(),
            token: None,
            issue_labels: vec!["box-exchange-data".to_string()],
            timeout_seconds: 30,
        }
    }
}

impl BackupConfig {
    /// 是否具备发起远程备份的全部条件
    pub fn is_configured(&self) -> bool {
        self.enabled
            && !self.owner.trim().is_empty()
            && !self.repo.trim().is_empty()
            && self
                .token
                .as_deref()
                .is_some_and(|token| !token.trim().is_empty())
    }
}

/// 初始数据配置
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct SeedConfig {
    /// 初始数据文件路径（JSON 或 TOML）
    pub fixture: Option<String>,
}

/// 应用配置
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub service_name: String,
    pub environment: String,
    pub storage: StorageConfig,
    pub exchange: ExchangeConfig,
    pub security: SecurityConfig,
    pub backup: BackupConfig,
    pub seed: SeedConfig,
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// 从配置文件和环境变量加载配置
    ///
    /// 加载顺序（后加载的会覆盖先加载的同名配置项）：
    /// 1. config/default.toml（默认配置）
    /// 2. config/{environment}.toml（环境特定配置）
    /// 3. config/{service_name}.toml（服务特定配置）
    /// 4. 环境变量（BOX_EXCHANGE 前缀，如 BOX_EXCHANGE__BACKUP__TOKEN -> backup.token）
    pub fn load(service_name: &str) -> Result<Self, ConfigError> {
        let config_dir = std::env::var("CONFIG_DIR").unwrap_or_else(|_| "config".to_string());
        Self::load_from(service_name, Path::new(&config_dir))
    }

    /// 从指定目录加载配置
    pub fn load_from(service_name: &str, config_dir: &Path) -> Result<Self, ConfigError> {
        let env =
            std::env::var("BOX_EXCHANGE_ENV").unwrap_or_else(|_| "development".to_string());

        let builder = Config::builder()
            .set_default("service_name", service_name)?
            .set_default("environment", env.clone())?
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            .add_source(File::from(config_dir.join(format!("{}.toml", env))).required(false))
            .add_source(
                File::from(config_dir.join(format!("{}.toml", service_name))).required(false),
            )
            .add_source(
                Environment::with_prefix("BOX_EXCHANGE")
                    .separator("__")
                    .try_parsing(true),
            );

        let mut config: Self = builder.build()?.try_deserialize()?;
        config.observability.service_name = config.service_name.clone();

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.storage.data_dir, "data");
        assert_eq!(config.exchange.history_display_limit, 10);
        assert_eq!(config.exchange.low_stock.premium, 2);
        assert_eq!(config.exchange.low_stock.regular, 5);
        assert_eq!(config.backup.issue_labels, vec!["box-exchange-data"]);
        assert!(config.seed.fixture.is_none());
    }

    #[test]
    fn test_backup_requires_token() {
        let mut backup = BackupConfig {
            owner: "octocat".to_string(),
            ..Default::default()
        };
        assert!(!backup.is_configured());

        backup.token = Some("   ".to_string());
        assert!(!backup.is_configured());

        backup.token = Some("ghp_test".to_string());
        assert!(backup.is_configured());

        backup.enabled = false;
        assert!(!backup.is_configured());
    }

    #[test]
    fn test_load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("default.toml"),
            r#"
[storage]
data_dir = "/var/lib/box-exchange"

[exchange]
history_display_limit = 5

[backup]
owner = "octocat"
"#,
        )
        .unwrap();

        let config = AppConfig::load_from("box-exchange", dir.path()).unwrap();
        assert_eq!(config.service_name, "box-exchange");
        assert_eq!(config.observability.service_name, "box-exchange");
        assert_eq!(config.storage.data_dir, "/var/lib/box-exchange");
        assert_eq!(config.exchange.history_display_limit, 5);
        // 未覆盖的字段保持默认值
        assert_eq!(config.exchange.low_stock.regular, 5);
        assert_eq!(config.backup.owner, "octocat");
        assert_eq!(config.backup.repo, "box-exchange");
    }

    #[test]
    fn test_load_without_files_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_from("box-exchange", dir.path()).unwrap();
        assert_eq!(config.security.bcrypt_cost, 12);
        assert_eq!(config.backup.timeout_seconds, 30);
    }
}
