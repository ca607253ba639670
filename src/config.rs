use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:3000";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_SUCCESS_MODAL_MS: u64 = 2000;
pub const DEFAULT_LOG_FILE: &str = "roster_terminal.log";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub api_base_url: String,
    pub request_timeout: Duration,
    pub download_dir: PathBuf,
    pub success_modal_duration: Duration,
    pub log_file: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            download_dir: PathBuf::from("."),
            success_modal_duration: Duration::from_millis(DEFAULT_SUCCESS_MODAL_MS),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

impl AppConfig {
    /// Reads settings from the process environment. Callers that want `.env`
    /// support load it with `dotenvy` first.
    pub fn from_env() -> Self {
        Self {
            api_base_url: api_base_url(),
            request_timeout: request_timeout(),
            download_dir: download_dir(),
            success_modal_duration: success_modal_duration(),
            log_file: log_file(),
        }
    }
}

pub fn api_base_url() -> String {
    std::env::var("ROSTER_API_URL")
        .ok()
        .map(|value| value.trim().trim_end_matches('/').to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_API_URL.to_string())
}

pub fn request_timeout() -> Duration {
    std::env::var("ROSTER_HTTP_TIMEOUT_SECS")
        .ok()
        .and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|value| *value > 0)
        .map(Duration::from_secs)
        .unwrap_or_else(|| Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS))
}

pub fn download_dir() -> PathBuf {
    std::env::var("ROSTER_DOWNLOAD_DIR")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
}

pub fn success_modal_duration() -> Duration {
    std::env::var("ROSTER_SUCCESS_MODAL_MS")
        .ok()
        .and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|value| *value > 0)
        .map(Duration::from_millis)
        .unwrap_or_else(|| Duration::from_millis(DEFAULT_SUCCESS_MODAL_MS))
}

pub fn log_file() -> PathBuf {
    std::env::var("ROSTER_LOG_FILE")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE))
}
