use crate::domain::logging::LogLevel;
use crate::domain::notifications::DEFAULT_NOTIFICATION_DURATION;
use std::time::Duration;

pub const BACKEND_URL_VAR: &str = "PORTFOLIO_BACKEND_URL";
pub const NOTIFICATION_DURATION_VAR: &str = "PORTFOLIO_NOTIFICATION_DURATION_MS";
pub const LOG_LEVEL_VAR: &str = "PORTFOLIO_LOG_LEVEL";

/// Client settings. Values are baked in at build time, like any static
/// front-end bundle.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub backend_url: String,
    pub notification_duration: Duration,
    pub session_storage_key: String,
    pub log_level: LogLevel,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:8080".to_string(),
            notification_duration: DEFAULT_NOTIFICATION_DURATION,
            session_storage_key: "portfolio.identity".to_string(),
            log_level: if cfg!(debug_assertions) { LogLevel::Debug } else { LogLevel::Info },
        }
    }
}

impl AppConfig {
    /// Defaults overridden by the `PORTFOLIO_*` variables present at compile time.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|name| {
            let value = match name {
                BACKEND_URL_VAR => option_env!("PORTFOLIO_BACKEND_URL"),
                NOTIFICATION_DURATION_VAR => option_env!("PORTFOLIO_NOTIFICATION_DURATION_MS"),
                LOG_LEVEL_VAR => option_env!("PORTFOLIO_LOG_LEVEL"),
                _ => None,
            };
            value.map(str::to_string)
        })
    }

    /// Applies overrides from `lookup`; unparsable values keep the current setting.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(BACKEND_URL_VAR).filter(|u| !u.trim().is_empty()) {
            self.backend_url = url.trim().to_string();
        }
        if let Some(ms) = lookup(NOTIFICATION_DURATION_VAR).and_then(|v| v.trim().parse::<u64>().ok()) {
            self.notification_duration = Duration::from_millis(ms);
        }
        if let Some(level) = lookup(LOG_LEVEL_VAR).and_then(|v| v.parse::<LogLevel>().ok()) {
            self.log_level = level;
        }
        self
    }

    pub fn with_backend_url(mut self, url: impl Into<String>) -> Self {
        self.backend_url = url.into();
        self
    }

    pub fn with_notification_duration(mut self, duration: Duration) -> Self {
        self.notification_duration = duration;
        self
    }

    pub fn with_session_storage_key(mut self, key: impl Into<String>) -> Self {
        self.session_storage_key = key.into();
        self
    }

    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn overrides_replace_defaults() {
        let vars: HashMap<&str, &str> = HashMap::from([
            (BACKEND_URL_VAR, " https://api.example.test "),
            (NOTIFICATION_DURATION_VAR, "5000"),
            (LOG_LEVEL_VAR, "warn"),
        ]);
        let config = AppConfig::default().with_overrides(|name| vars.get(name).map(|v| v.to_string()));
        assert_eq!(config.backend_url, "https://api.example.test");
        assert_eq!(config.notification_duration, Duration::from_millis(5000));
        assert_eq!(config.log_level, LogLevel::Warn);
    }

    #[test]
    fn garbage_overrides_are_ignored() {
        let config = AppConfig::default()
            .with_overrides(|name| (name == NOTIFICATION_DURATION_VAR).then(|| "soon".to_string()));
        assert_eq!(config.notification_duration, Duration::from_millis(3000));
    }
}
