//! Box Exchange CLI
//!
//! 宝箱兑换系统的命令行入口点。

use std::path::Path;
use std::sync::Arc;

use chrono::{Local, Utc};
use clap::Parser;

use box_exchange::ExchangeApp;
use box_exchange::backup::connector_from_config;
use box_exchange::cli::{Cli, CommandRunner};
use box_exchange::seed::SeedFixture;
use exchange_shared::config::AppConfig;
use exchange_shared::observability;
use exchange_shared::storage::{JsonFileStore, KeyValueStore, MemoryStore};

const SERVICE_NAME: &str = "box-exchange";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config_dir {
        Some(dir) => AppConfig::load_from(SERVICE_NAME, Path::new(dir))?,
        None => AppConfig::load(SERVICE_NAME)?,
    };

    // 命令行参数优先于配置文件
    if let Some(level) = &cli.log_level {
        config.observability = config.observability.with_log_level(level.clone());
    }
    let _guard = observability::init(&config.observability)?;

    let store: Arc<dyn KeyValueStore> = if cli.ephemeral {
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(JsonFileStore::new(config.storage.data_path()))
    };

    let connector = connector_from_config(&config.backup)?;

    let fixture = match &config.seed.fixture {
        Some(path) => Some(SeedFixture::load(Path::new(path))?),
        None => None,
    };

    let app = ExchangeApp::bootstrap(
        store,
        connector,
        &config,
        fixture.as_ref(),
        Local,
        Utc::now(),
    )
    .await?;

    let mut runner = CommandRunner::new(app);
    runner.run(cli.command).await?;

    Ok(())
}
