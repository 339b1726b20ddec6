//! 可观测性模块集成测试
//!
//! 测试 metrics 记录、日志过滤器以及配置到可观测性的传递。

// ============================================================================
// 指标记录测试
// ============================================================================

mod metrics_tests {
    use exchange_shared::observability::metrics::{
        record_backup, record_redemption, record_schedule_advance,
    };

    #[test]
    fn test_record_redemption_outcomes() {
        record_redemption("premium", "success");
        record_redemption("regular", "success");
        record_redemption("regular", "WEEKLY_LIMIT");
        record_redemption("premium", "PREMIUM_LOCKED");
        record_redemption("regular", "persistence_failed");
    }

    #[test]
    fn test_record_backup_outcomes() {
        record_backup("exchange", "success");
        record_backup("exchange", "failed");
        record_backup("snapshot", "not_configured");
    }

    #[test]
    fn test_record_schedule_advance() {
        record_schedule_advance(0);
        record_schedule_advance(1);
        // 长时间未运行后一次推进多周
        record_schedule_advance(52);
    }
}

// ============================================================================
// 日志过滤器测试
// ============================================================================

mod tracing_tests {
    use exchange_shared::observability::ObservabilityConfig;
    use exchange_shared::observability::tracing::build_filter;

    #[test]
    fn test_directive_level_is_kept() {
        if std::env::var("RUST_LOG").is_ok() {
            return;
        }
        let config = ObservabilityConfig::default().with_log_level("box_exchange=debug");
        assert_eq!(build_filter(&config).to_string(), "box_exchange=debug");
    }
}

// ============================================================================
// 配置传递测试
// ============================================================================

mod config_tests {
    use exchange_shared::config::AppConfig;

    #[test]
    fn test_observability_section_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("default.toml"),
            r#"
[observability]
log_level = "warn"
json_logs = true
metrics_port = 9191
"#,
        )
        .unwrap();

        let config = AppConfig::load_from("box-exchange", dir.path()).unwrap();
        assert_eq!(config.observability.service_name, "box-exchange");
        assert_eq!(config.observability.log_level, "warn");
        assert!(config.observability.json_logs);
        assert!(!config.observability.metrics_enabled);
        assert_eq!(config.observability.metrics_port, 9191);
    }
}
