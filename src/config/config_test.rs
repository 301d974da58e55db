use serial_test::serial;
use temp_env::with_vars;

use super::*;

fn cleanup_all_hub_env_vars() {
    for (key, _) in std::env::vars() {
        if key.starts_with("REFHUB__") {
            std::env::remove_var(&key);
        }
    }
}

#[test]
#[serial]
fn default_config_should_initialize_with_hardcoded_values() {
    let config = HubConfig::default();

    assert_eq!(config.pending_warn_threshold, 64);
    assert_eq!(config.channel_capacity_hint, 16);
}

#[test]
#[serial]
fn load_without_sources_should_match_defaults() {
    cleanup_all_hub_env_vars();
    let empty_vars: Vec<(&str, Option<&str>)> = vec![];
    with_vars(empty_vars, || {
        let config = HubConfig::load(None).expect("success");

        assert_eq!(config.pending_warn_threshold, 64);
        assert_eq!(config.channel_capacity_hint, 16);
    });
}

#[test]
#[serial]
fn load_should_merge_environment_overrides() {
    cleanup_all_hub_env_vars();
    with_vars(
        vec![("REFHUB__PENDING_WARN_THRESHOLD", Some("128"))],
        || {
            let config = HubConfig::load(None).expect("success");

            assert_eq!(config.pending_warn_threshold, 128);
            assert_eq!(config.channel_capacity_hint, 16);
        },
    );
}

#[test]
#[serial]
fn load_should_merge_file_settings() {
    cleanup_all_hub_env_vars();
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("hub_config.toml");

    std::fs::write(
        &config_path,
        r#"
        pending_warn_threshold = 8
        channel_capacity_hint = 4
        "#,
    )
    .unwrap();

    let empty_vars: Vec<(&str, Option<&str>)> = vec![];
    with_vars(empty_vars, || {
        let config = HubConfig::load(config_path.to_str()).expect("success");

        assert_eq!(config.pending_warn_threshold, 8);
        assert_eq!(config.channel_capacity_hint, 4);
    });
}

#[test]
#[serial]
fn environment_variables_should_override_file_settings() {
    cleanup_all_hub_env_vars();
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("hub_config.toml");

    std::fs::write(&config_path, "pending_warn_threshold = 8\n").unwrap();

    with_vars(
        vec![("REFHUB__PENDING_WARN_THRESHOLD", Some("256"))],
        || {
            let config = HubConfig::load(config_path.to_str()).expect("success");

            assert_eq!(config.pending_warn_threshold, 256);
        },
    );
}

#[test]
fn validation_should_reject_zero_warn_threshold() {
    let config = HubConfig {
        pending_warn_threshold: 0,
        ..HubConfig::default()
    };

    assert!(config.validate().is_err());
}
