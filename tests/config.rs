use product_row_monitor::activity_log::DEFAULT_CAPACITY;
use product_row_monitor::config::{Config, ConfigError};
use std::path::Path;

#[test]
fn defaults_are_valid() {
    let config = Config::default();
    assert_eq!(config.capacity, DEFAULT_CAPACITY);
    assert_eq!(config.capacity, 25);
    assert!(config.api.token.is_none());
    assert!(config.api.timeout_ms.is_none());
    assert!(config.validate().is_ok());
    // no deal configured: not in a deal placement
    assert_eq!(config.placement.to_info().entity_id(), None);
}

#[test]
fn partial_file_keeps_other_defaults() {
    let config = Config::from_json(
        r#"{
            "capacity": 10,
            "api": { "endpoint": "https://api.example.com/p/{id}", "token": "abc" },
            "placement": { "entity_id": "314" }
        }"#,
    )
    .unwrap();
    assert_eq!(config.capacity, 10);
    assert_eq!(config.shutdown_grace_ms, Config::default().shutdown_grace_ms);
    assert_eq!(config.api.token.as_deref(), Some("abc"));
    assert_eq!(config.placement.placement, "CRM_DEAL_DETAIL_TAB");
    assert_eq!(config.placement.to_info().entity_id().as_deref(), Some("314"));
}

#[test]
fn zero_capacity_and_empty_endpoint_are_invalid() {
    let mut config = Config::default();
    config.capacity = 0;
    assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

    let mut config = Config::default();
    config.api.endpoint = "  ".into();
    assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
}

#[test]
fn unreadable_and_malformed_files_are_reported() {
    let err = Config::load(Path::new("/definitely/not/here.json")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));

    let path = std::env::temp_dir().join(format!("prm-config-{}.json", std::process::id()));
    std::fs::write(&path, "{ capacity: oops").unwrap();
    let err = Config::load(&path).unwrap_err();
    std::fs::remove_file(&path).ok();
    assert!(matches!(err, ConfigError::Parse { .. }));
}
