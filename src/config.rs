use std::{env, time::Duration};

#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,

    pub finnhub_api_key: String,
    pub telegram_token: String,
    pub webhook_url: Option<String>,

    pub max_workers: usize,
    pub max_queued_watchers: usize,

    pub poll_interval_secs: u64,
    pub retry_backoff_secs: u64,
    pub notify_backoff_secs: u64,
    pub max_retries: u32,
    pub notify_utc_offset_hours: i32,
}

/// Timing and capacity knobs for the monitoring core.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub poll_interval: Duration,
    pub retry_backoff: Duration,
    pub notify_backoff: Duration,
    pub max_retries: u32,
    pub max_workers: usize,
    pub max_queued: usize,
    pub utc_offset_hours: i32,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(30),
            retry_backoff: Duration::from_secs(10),
            notify_backoff: Duration::from_secs(2),
            max_retries: 5,
            max_workers: 20,
            max_queued: 100,
            utc_offset_hours: 8,
        }
    }
}

impl Settings {
    pub fn monitor_config(&self) -> MonitorConfig {
        MonitorConfig {
            poll_interval: Duration::from_secs(self.poll_interval_secs),
            retry_backoff: Duration::from_secs(self.retry_backoff_secs),
            notify_backoff: Duration::from_secs(self.notify_backoff_secs),
            max_retries: self.max_retries.max(1),
            max_workers: self.max_workers.max(1),
            max_queued: self.max_queued_watchers,
            utc_offset_hours: self.notify_utc_offset_hours,
        }
    }
}

fn parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.trim().parse::<T>().ok())
        .unwrap_or(default)
}

pub fn load() -> Settings {
    // Loads .env if present (no crash if missing)
    dotenvy::dotenv().ok();

    let defaults = MonitorConfig::default();

    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = parsed("PORT", 80u16);

    let finnhub_api_key = env::var("FINNHUB_API_KEY").unwrap_or_default();
    let telegram_token = env::var("TG_API_KEY").unwrap_or_default();
    let webhook_url = env::var("WEBHOOK_URL")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    Settings {
        host,
        port,
        finnhub_api_key,
        telegram_token,
        webhook_url,
        max_workers: parsed("MAX_WORKERS", defaults.max_workers),
        max_queued_watchers: parsed("MAX_QUEUED_WATCHERS", defaults.max_queued),
        poll_interval_secs: parsed("POLL_INTERVAL_SECS", defaults.poll_interval.as_secs()),
        retry_backoff_secs: parsed("RETRY_BACKOFF_SECS", defaults.retry_backoff.as_secs()),
        notify_backoff_secs: parsed("NOTIFY_BACKOFF_SECS", defaults.notify_backoff.as_secs()),
        max_retries: parsed("MAX_RETRIES", defaults.max_retries),
        notify_utc_offset_hours: parsed("NOTIFY_UTC_OFFSET_HOURS", defaults.utc_offset_hours)
            .clamp(-23, 23),
    }
}
