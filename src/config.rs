use std::net::IpAddr;
use std::time::Duration;

use ipnet::IpNet;

#[derive(Debug, Clone)]
pub struct Config {
    pub webhook_url: String,
    pub host: IpAddr,
    pub port: u16,
    pub max_body_size: usize,
    /// Peers whose `X-Forwarded-For` is believed.
    pub trusted_proxies: Vec<IpNet>,
    pub log_level: String,
    /// Window during which an identical tracked event is suppressed.
    pub dedup_window: Duration,
    /// Entries kept in the data layer and in the metrics channel.
    pub analytics_capacity: usize,
    pub webhook_timeout: Duration,
    pub session_ttl: Duration,
    pub rate_limit: u32,
    pub rate_limit_window_secs: u64,
    pub whatsapp_number: String,
    pub cookie_secure: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let webhook_url = env_required("LEADPIPE_WEBHOOK_URL")?;

        let host: IpAddr = env_or("LEADPIPE_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid LEADPIPE_HOST: {e}"))?;

        let port: u16 = env_or("LEADPIPE_PORT", "3000")
            .parse()
            .map_err(|e| format!("Invalid LEADPIPE_PORT: {e}"))?;

        let max_body_size: usize = env_or("LEADPIPE_MAX_BODY_SIZE", "65536")
            .parse()
            .map_err(|e| format!("Invalid LEADPIPE_MAX_BODY_SIZE: {e}"))?;

        let trusted_proxies: Vec<IpNet> = env_or("LEADPIPE_TRUSTED_PROXIES", "")
            .split(',')
            .filter(|s| !s.trim().is_empty())
            .map(|s| {
                s.trim()
                    .parse()
                    .map_err(|e| format!("Invalid LEADPIPE_TRUSTED_PROXIES entry '{s}': {e}"))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let log_level = env_or("LEADPIPE_LOG_LEVEL", "info");

        let dedup_window_ms: u64 = env_or("LEADPIPE_DEDUP_WINDOW_MS", "2000")
            .parse()
            .map_err(|e| format!("Invalid LEADPIPE_DEDUP_WINDOW_MS: {e}"))?;

        let analytics_capacity: usize = env_or("LEADPIPE_ANALYTICS_CAPACITY", "10000")
            .parse()
            .map_err(|e| format!("Invalid LEADPIPE_ANALYTICS_CAPACITY: {e}"))?;

        let webhook_timeout_secs: u64 = env_or("LEADPIPE_WEBHOOK_TIMEOUT_SECS", "30")
            .parse()
            .map_err(|e| format!("Invalid LEADPIPE_WEBHOOK_TIMEOUT_SECS: {e}"))?;

        let session_ttl_secs: u64 = env_or("LEADPIPE_SESSION_TTL_SECS", "1800")
            .parse()
            .map_err(|e| format!("Invalid LEADPIPE_SESSION_TTL_SECS: {e}"))?;

        let rate_limit: u32 = env_or("LEADPIPE_RATE_LIMIT", "10")
            .parse()
            .map_err(|e| format!("Invalid LEADPIPE_RATE_LIMIT: {e}"))?;

        let rate_limit_window_secs: u64 = env_or("LEADPIPE_RATE_LIMIT_WINDOW_SECS", "60")
            .parse()
            .map_err(|e| format!("Invalid LEADPIPE_RATE_LIMIT_WINDOW_SECS: {e}"))?;

        let whatsapp_number = env_or("LEADPIPE_WHATSAPP_NUMBER", "5511999999999");

        let cookie_secure = matches!(
            env_or("LEADPIPE_COOKIE_SECURE", "false").as_str(),
            "true" | "1" | "yes"
        );

        Ok(Config {
            webhook_url,
            host,
            port,
            max_body_size,
            trusted_proxies,
            log_level,
            dedup_window: Duration::from_millis(dedup_window_ms),
            analytics_capacity,
            webhook_timeout: Duration::from_secs(webhook_timeout_secs),
            session_ttl: Duration::from_secs(session_ttl_secs),
            rate_limit,
            rate_limit_window_secs,
            whatsapp_number,
            cookie_secure,
        })
    }
}

fn env_required(key: &str) -> Result<String, String> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| format!("Missing required environment variable: {key}"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
