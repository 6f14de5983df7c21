#![allow(clippy::unwrap_used)]

use std::env;
use std::sync::Mutex;
use std::time::Duration;
use trelox_bot::config::Config;
use trelox_bot::services::rewards::BadgePolicy;

// Config tests share process environment, so they run one at a time
static CONFIG_TEST_MUTEX: Mutex<()> = Mutex::new(());

const VARS: [&str; 8] = [
    "TELEGRAM_BOT_TOKEN",
    "DATABASE_URL",
    "HTTP_PORT",
    "PORT",
    "SCHEDULER_POLL_SECONDS",
    "HANDLER_TIMEOUT_SECONDS",
    "MISFIRE_GRACE_SECONDS",
    "WEEKLY_BADGE_POLICY",
];

fn clear_env() {
    for var in VARS {
        env::remove_var(var);
    }
}

#[test]
fn test_config_from_env_with_all_vars() {
    let _guard = CONFIG_TEST_MUTEX.lock().unwrap();
    clear_env();
    
    env::set_var("TELEGRAM_BOT_TOKEN", "test_token_123");
    env::set_var("DATABASE_URL", "sqlite:test.db");
    env::set_var("HTTP_PORT", "8080");
    env::set_var("SCHEDULER_POLL_SECONDS", "2");
    env::set_var("HANDLER_TIMEOUT_SECONDS", "10");
    env::set_var("MISFIRE_GRACE_SECONDS", "300");
    env::set_var("WEEKLY_BADGE_POLICY", "once-per-week");
    
    let config = Config::from_env().unwrap();
    
    assert_eq!(config.telegram_bot_token, "test_token_123");
    assert_eq!(config.database_url, "sqlite:test.db");
    assert_eq!(config.http_port, 8080);
    assert_eq!(config.scheduler_poll_interval, Duration::from_secs(2));
    assert_eq!(config.handler_timeout, Duration::from_secs(10));
    assert_eq!(config.misfire_grace, Some(Duration::from_secs(300)));
    assert_eq!(config.badge_policy, BadgePolicy::OncePerWeek);
    
    clear_env();
}

#[test]
fn test_config_from_env_with_defaults() {
    let _guard = CONFIG_TEST_MUTEX.lock().unwrap();
    clear_env();
    
    env::set_var("TELEGRAM_BOT_TOKEN", "required_token");
    
    let config = Config::from_env().unwrap();
    
    assert_eq!(config.database_url, "sqlite:./data/trelox.db");
    assert_eq!(config.http_port, 10000);
    assert_eq!(config.scheduler_poll_interval, Duration::from_secs(5));
    assert_eq!(config.handler_timeout, Duration::from_secs(30));
    assert_eq!(config.misfire_grace, None);
    assert_eq!(config.badge_policy, BadgePolicy::Repeat);
    
    clear_env();
}

#[test]
fn test_config_missing_required_token() {
    let _guard = CONFIG_TEST_MUTEX.lock().unwrap();
    clear_env();
    
    let error_msg = Config::from_env().unwrap_err().to_string();
    assert!(error_msg.contains("TELEGRAM_BOT_TOKEN must be set"));
    
    env::set_var("TELEGRAM_BOT_TOKEN", "   ");
    assert!(Config::from_env().is_err());
    
    clear_env();
}

#[test]
fn test_config_port_fallback() {
    let _guard = CONFIG_TEST_MUTEX.lock().unwrap();
    clear_env();
    
    env::set_var("TELEGRAM_BOT_TOKEN", "test_token");
    env::set_var("PORT", "4000");
    assert_eq!(Config::from_env().unwrap().http_port, 4000);
    
    // HTTP_PORT takes precedence
    env::set_var("HTTP_PORT", " 8081 ");
    assert_eq!(Config::from_env().unwrap().http_port, 8081);
    
    clear_env();
}

#[test]
fn test_config_invalid_port() {
    let _guard = CONFIG_TEST_MUTEX.lock().unwrap();
    clear_env();
    
    env::set_var("TELEGRAM_BOT_TOKEN", "test_token");
    
    for bad in ["invalid_port", "-1", "65536"] {
        env::set_var("HTTP_PORT", bad);
        let error_msg = Config::from_env().unwrap_err().to_string();
        assert!(error_msg.contains("Invalid HTTP_PORT"), "accepted {bad}");
    }
    
    clear_env();
}

#[test]
fn test_config_invalid_scheduler_settings() {
    let _guard = CONFIG_TEST_MUTEX.lock().unwrap();
    clear_env();
    
    env::set_var("TELEGRAM_BOT_TOKEN", "test_token");
    
    env::set_var("SCHEDULER_POLL_SECONDS", "0");
    assert!(Config::from_env().is_err());
    
    env::set_var("SCHEDULER_POLL_SECONDS", "soon");
    let error_msg = Config::from_env().unwrap_err().to_string();
    assert!(error_msg.contains("SCHEDULER_POLL_SECONDS"));
    env::remove_var("SCHEDULER_POLL_SECONDS");
    
    env::set_var("MISFIRE_GRACE_SECONDS", "1.5");
    assert!(Config::from_env().is_err());
    
    env::set_var("MISFIRE_GRACE_SECONDS", "0");
    let error_msg = Config::from_env().unwrap_err().to_string();
    assert!(error_msg.contains("MISFIRE_GRACE_SECONDS must be greater than zero"));
    env::remove_var("MISFIRE_GRACE_SECONDS");
    
    env::set_var("WEEKLY_BADGE_POLICY", "sometimes");
    assert!(Config::from_env().is_err());
    
    clear_env();
}

#[test]
fn test_config_empty_values_use_defaults() {
    let _guard = CONFIG_TEST_MUTEX.lock().unwrap();
    clear_env();
    
    env::set_var("TELEGRAM_BOT_TOKEN", "valid_token");
    env::set_var("DATABASE_URL", "");
    env::set_var("MISFIRE_GRACE_SECONDS", "");
    
    let config = Config::from_env().unwrap();
    assert_eq!(config.database_url, "sqlite:./data/trelox.db");
    assert_eq!(config.misfire_grace, None);
    
    clear_env();
}

#[test]
fn test_config_invalid_fallback_port_names_port() {
    let _guard = CONFIG_TEST_MUTEX.lock().unwrap();
    clear_env();
    
    env::set_var("TELEGRAM_BOT_TOKEN", "test_token");
    env::set_var("PORT", "not_a_port");
    
    let error_msg = Config::from_env().unwrap_err().to_string();
    assert!(error_msg.contains("Invalid PORT"));
    assert!(!error_msg.contains("HTTP_PORT"));
    
    clear_env();
}
