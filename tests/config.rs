use std::path::PathBuf;
use std::time::Duration;

use roster_terminal::config::{AppConfig, DEFAULT_API_URL};

const VARS: [&str; 5] = [
    "ROSTER_API_URL",
    "ROSTER_HTTP_TIMEOUT_SECS",
    "ROSTER_DOWNLOAD_DIR",
    "ROSTER_SUCCESS_MODAL_MS",
    "ROSTER_LOG_FILE",
];

#[test]
fn defaults_apply_when_unset() {
    temp_env::with_vars_unset(VARS, || {
        assert_eq!(AppConfig::from_env(), AppConfig::default());
        assert_eq!(AppConfig::from_env().api_base_url, DEFAULT_API_URL);
    });
}

#[test]
fn values_come_from_environment() {
    temp_env::with_vars(
        [
            ("ROSTER_API_URL", Some("https://rosters.example.com/")),
            ("ROSTER_HTTP_TIMEOUT_SECS", Some("30")),
            ("ROSTER_DOWNLOAD_DIR", Some("/tmp/exports")),
            ("ROSTER_SUCCESS_MODAL_MS", Some("500")),
            ("ROSTER_LOG_FILE", Some("/tmp/roster.log")),
        ],
        || {
            let config = AppConfig::from_env();
            assert_eq!(config.api_base_url, "https://rosters.example.com");
            assert_eq!(config.request_timeout, Duration::from_secs(30));
            assert_eq!(config.download_dir, PathBuf::from("/tmp/exports"));
            assert_eq!(config.success_modal_duration, Duration::from_millis(500));
            assert_eq!(config.log_file, PathBuf::from("/tmp/roster.log"));
        },
    );
}

#[test]
fn invalid_numbers_fall_back() {
    temp_env::with_vars(
        [
            ("ROSTER_HTTP_TIMEOUT_SECS", Some("soon")),
            ("ROSTER_SUCCESS_MODAL_MS", Some("0")),
            ("ROSTER_API_URL", Some("   ")),
        ],
        || {
            let config = AppConfig::from_env();
            let defaults = AppConfig::default();
            assert_eq!(config.request_timeout, defaults.request_timeout);
            assert_eq!(config.success_modal_duration, defaults.success_modal_duration);
            assert_eq!(config.api_base_url, DEFAULT_API_URL);
        },
    );
}
