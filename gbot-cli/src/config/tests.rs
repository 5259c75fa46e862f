//! Config tests.

use super::GbotConfig;
use serial_test::serial;
use std::env;

const VARS: [&str; 5] = [
    "LOG_FILE",
    "GBOT_BACK_ENDPOINT",
    "GBOT_MAX_BACK_HOPS",
    "GBOT_MAX_STACK_DEPTH",
    "GBOT_ALLOWED_USERS",
];

fn clear_env() {
    for var in VARS {
        env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_load_config_with_defaults() {
    clear_env();

    let config = GbotConfig::from_env().unwrap();

    assert_eq!(config, GbotConfig::default());
    assert_eq!(config.log_file, "logs/gbot.log");
    assert_eq!(config.back_endpoint, "/back");
    assert_eq!(config.max_back_hops, 16);
    assert!(config.max_stack_depth.is_none());
    assert!(config.allowed_users.is_empty());
    config.validate().unwrap();
}

#[test]
#[serial]
fn test_load_config_with_custom_values() {
    clear_env();
    env::set_var("LOG_FILE", "/tmp/gbot-test.log");
    env::set_var("GBOT_BACK_ENDPOINT", "/return");
    env::set_var("GBOT_MAX_BACK_HOPS", "4");
    env::set_var("GBOT_MAX_STACK_DEPTH", " 32 ");
    env::set_var("GBOT_ALLOWED_USERS", "1, 2,,3");

    let config = GbotConfig::from_env().unwrap();

    assert_eq!(config.log_file, "/tmp/gbot-test.log");
    assert_eq!(config.back_endpoint, "/return");
    assert_eq!(config.max_back_hops, 4);
    assert_eq!(config.max_stack_depth, Some(32));
    assert_eq!(config.allowed_users, vec![1, 2, 3]);

    let router_config = config.router_config();
    assert_eq!(router_config.back_endpoint, "/return");
    assert_eq!(router_config.max_back_hops, 4);
    assert_eq!(router_config.max_stack_depth, Some(32));
    clear_env();
}

#[test]
#[serial]
fn test_invalid_number_is_error() {
    clear_env();
    env::set_var("GBOT_MAX_BACK_HOPS", "many");

    let err = GbotConfig::from_env().unwrap_err();

    assert!(err.to_string().contains("GBOT_MAX_BACK_HOPS"));
    clear_env();
}

#[test]
#[serial]
fn test_invalid_user_id_is_error() {
    clear_env();
    env::set_var("GBOT_ALLOWED_USERS", "1,alice");

    assert!(GbotConfig::from_env().is_err());
    clear_env();
}

#[test]
fn test_validate_rejects_bad_values() {
    let relative = GbotConfig {
        back_endpoint: "back".to_string(),
        ..GbotConfig::default()
    };
    assert!(relative.validate().is_err());

    let no_hops = GbotConfig {
        max_back_hops: 0,
        ..GbotConfig::default()
    };
    assert!(no_hops.validate().is_err());

    let no_depth = GbotConfig {
        max_stack_depth: Some(0),
        ..GbotConfig::default()
    };
    assert!(no_depth.validate().is_err());
}
