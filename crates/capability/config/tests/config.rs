use udmi_config::{AppConfig, ConfigError, StoreBackend};

// 环境变量是进程级共享状态，所有场景放在同一个测试里顺序执行。
#[test]
fn load_config_from_env() {
    // Rust 2024 中 set_var 需要显式标注 unsafe（测试进程内可控）。
    unsafe {
        std::env::set_var("UDMI_HTTP_ADDR", "127.0.0.1:8081");
        std::env::set_var("UDMI_MAX_CONFLICT_RETRIES", "5");
        std::env::set_var("UDMI_INGEST", "on");
        std::env::remove_var("UDMI_STORE");
    }
    let config = AppConfig::from_env().expect("config");
    assert_eq!(config.http_addr, "127.0.0.1:8081");
    assert_eq!(config.store, StoreBackend::Memory);
    assert_eq!(config.max_conflict_retries, 5);
    assert!(config.ingest_enabled);
    assert_eq!(config.validator_device_id, "_validator");
    assert_eq!(config.mqtt_topic, "udmi/events");

    unsafe {
        std::env::set_var("UDMI_STORE", "postgres");
        std::env::remove_var("UDMI_DATABASE_URL");
    }
    match AppConfig::from_env() {
        Err(ConfigError::Missing(key)) => assert_eq!(key, "UDMI_DATABASE_URL"),
        other => panic!("unexpected result: {other:?}"),
    }

    unsafe {
        std::env::set_var("UDMI_STORE", "mongo");
    }
    assert!(matches!(
        AppConfig::from_env(),
        Err(ConfigError::Invalid(key, _)) if key == "UDMI_STORE"
    ));

    unsafe {
        std::env::set_var("UDMI_STORE", "memory");
        std::env::set_var("UDMI_MAX_CONFLICT_RETRIES", "many");
    }
    assert!(AppConfig::from_env().is_err());
}
