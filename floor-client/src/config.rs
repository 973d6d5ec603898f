//! Client configuration

use std::time::Duration;

/// How a day schedule is fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadStrategy {
    /// One availability request per time slot, issued concurrently
    #[default]
    PerSlot,
    /// Single `availability/schedule` request for the whole day
    Aggregate,
}

impl LoadStrategy {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "per_slot" | "per-slot" | "slot" => Some(Self::PerSlot),
            "aggregate" | "schedule" => Some(Self::Aggregate),
            _ => None,
        }
    }
}

/// Client configuration for connecting to the reservation API
///
/// # 环境变量
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | FLOOR_API_URL | http://localhost:8080 | API 地址 |
/// | FLOOR_API_TOKEN | - | Bearer token |
/// | REQUEST_TIMEOUT_SECS | 30 | 请求超时(秒) |
/// | SCHEDULE_REFRESH_SECS | 300 | 后台刷新间隔(秒) |
/// | SCHEDULE_LOAD_STRATEGY | per_slot | per_slot / aggregate |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_DIR | - | 日志目录 (每日滚动) |
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server base URL (e.g., "http://localhost:8080")
    pub base_url: String,

    /// JWT token for authentication
    pub token: Option<String>,

    /// Request timeout in seconds
    pub timeout: u64,

    /// Background schedule refresh interval in seconds
    pub refresh_interval: u64,

    /// Schedule fetch strategy
    pub load_strategy: LoadStrategy,

    /// Log level for the binary
    pub log_level: String,

    /// Optional directory for rolling log files
    pub log_dir: Option<String>,
}

impl ClientConfig {
    /// Create a new client configuration
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            timeout: 30,
            refresh_interval: 300,
            load_strategy: LoadStrategy::PerSlot,
            log_level: "info".to_string(),
            log_dir: None,
        }
    }

    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        let mut config = Self::new(
            std::env::var("FLOOR_API_URL").unwrap_or_else(|_| "http://localhost:8080".into()),
        );
        config.token = std::env::var("FLOOR_API_TOKEN").ok().filter(|t| !t.is_empty());
        config.timeout = std::env::var("REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(config.timeout);
        config.refresh_interval = std::env::var("SCHEDULE_REFRESH_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(config.refresh_interval);
        config.load_strategy = std::env::var("SCHEDULE_LOAD_STRATEGY")
            .ok()
            .and_then(|v| LoadStrategy::parse(&v))
            .unwrap_or_default();
        config.log_level = std::env::var("LOG_LEVEL").unwrap_or(config.log_level);
        config.log_dir = std::env::var("LOG_DIR").ok().filter(|d| !d.is_empty());
        config
    }

    /// Set the JWT token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    /// Set the background refresh interval
    pub fn with_refresh_interval(mut self, seconds: u64) -> Self {
        self.refresh_interval = seconds;
        self
    }

    pub fn with_load_strategy(mut self, strategy: LoadStrategy) -> Self {
        self.load_strategy = strategy;
        self
    }

    pub fn refresh_period(&self) -> Duration {
        Duration::from_secs(self.refresh_interval.max(1))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://localhost:8080")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = ClientConfig::new("http://api.local")
            .with_token("abc")
            .with_timeout(5)
            .with_refresh_interval(0)
            .with_load_strategy(LoadStrategy::Aggregate);

        assert_eq!(config.base_url, "http://api.local");
        assert_eq!(config.token.as_deref(), Some("abc"));
        assert_eq!(config.timeout, 5);
        assert_eq!(config.refresh_period(), Duration::from_secs(1));
        assert_eq!(config.load_strategy, LoadStrategy::Aggregate);
    }

    #[test]
    fn test_load_strategy_parse() {
        assert_eq!(LoadStrategy::parse("aggregate"), Some(LoadStrategy::Aggregate));
        assert_eq!(LoadStrategy::parse(" Per-Slot "), Some(LoadStrategy::PerSlot));
        assert_eq!(LoadStrategy::parse("daily"), None);
    }
}
