use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub user_agent: String,
    pub request_timeout_secs: u64,
    pub max_concurrent_requests: usize,
    pub sp500_url: String,
    pub yahoo_chart_url: String,
    pub yahoo_summary_url: String,
    pub yahoo_cookie_url: String,
    pub yahoo_crumb_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) MomentumSniper/0.1".to_string(),
            request_timeout_secs: 10,
            max_concurrent_requests: 8,
            sp500_url: "https://en.wikipedia.org/wiki/List_of_S%26P_500_companies".to_string(),
            yahoo_chart_url: "https://query1.finance.yahoo.com/v8/finance/chart".to_string(),
            yahoo_summary_url: "https://query2.finance.yahoo.com/v10/finance/quoteSummary"
                .to_string(),
            yahoo_cookie_url: "https://fc.yahoo.com".to_string(),
            yahoo_crumb_url: "https://query1.finance.yahoo.com/v1/test/getcrumb".to_string(),
        }
    }
}

impl AppConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            timeout: self.request_timeout(),
            max_concurrent: self.max_concurrent_requests.max(1),
        }
    }
}

/// Knobs for the per-ticker fan-out.
#[derive(Debug, Clone, Copy)]
pub struct FetchSettings {
    pub timeout: Duration,
    pub max_concurrent: usize,
}

impl Default for FetchSettings {
    fn default() -> Self {
        AppConfig::default().fetch_settings()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Loads the JSON config at `path`; a missing file yields the defaults.
pub fn load_config(path: impl AsRef<Path>) -> Result<AppConfig, ConfigError> {
    let content = match fs::read_to_string(path.as_ref()) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(AppConfig::default()),
        Err(e) => return Err(e.into()),
    };
    let config: AppConfig = serde_json::from_str(&content)?;
    Ok(config)
}
