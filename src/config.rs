// src/config.rs
use std::env;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{name} must be a valid number, got '{value}'")]
    InvalidNumber { name: &'static str, value: String },
    #[error("{name} must be true or false, got '{value}'")]
    InvalidBool { name: &'static str, value: String },
    #[error("{name} is out of range: {reason}")]
    OutOfRange { name: &'static str, reason: String },
}

/// Runtime settings, read from the environment (and `.env`) once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub debug: bool,
    /// `memory` selects the in-memory interaction store.
    pub database_url: String,

    pub nlu_enabled: bool,
    pub nlu_url: String,
    pub nlu_timeout: Duration,
    pub nlu_confidence_threshold: f64,

    pub rate_limit_requests: u32,
    pub rate_limit_window: Duration,
    pub ip_rate_limit_requests: u32,
    /// How long an address stays banned after breaking the per-IP limit.
    pub ip_ban_duration: Duration,
    /// Take the client address from `X-Forwarded-For` / `X-Real-IP`.
    /// Only safe behind a reverse proxy that overwrites those headers.
    pub trust_proxy_headers: bool,

    pub max_message_length: usize,
    pub max_sender_id_length: usize,
    pub max_response_length: usize,

    pub cache_max_entries: usize,
    pub cache_ttl: Duration,

    pub jwt_secret: Option<String>,
    pub cors_allowed_origins: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            debug: false,
            database_url: "sqlite://health_chatbot.db".to_string(),
            nlu_enabled: false,
            nlu_url: "http://localhost:5005/webhooks/nlu".to_string(),
            nlu_timeout: Duration::from_millis(5000),
            nlu_confidence_threshold: 0.7,
            rate_limit_requests: 100,
            rate_limit_window: Duration::from_secs(60),
            ip_rate_limit_requests: 600,
            ip_ban_duration: Duration::from_secs(900),
            trust_proxy_headers: false,
            max_message_length: 1000,
            max_sender_id_length: 100,
            max_response_length: 1000,
            cache_max_entries: 1000,
            cache_ttl: Duration::from_secs(3600),
            jwt_secret: None,
            cors_allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:8000".to_string(),
            ],
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Settings::default();

        // RASA_* names are accepted for deployments that predate the NLU_* ones
        let nlu_url = match env::var("NLU_URL").ok().filter(|v| !v.is_empty()) {
            Some(url) => url,
            None => match env::var("RASA_API_URL").ok().filter(|v| !v.is_empty()) {
                Some(base) => format!("{}/webhooks/nlu", base.trim_end_matches('/')),
                None => defaults.nlu_url,
            },
        };
        let nlu_enabled = match env_bool("NLU_ENABLED")? {
            Some(enabled) => enabled,
            None => env_bool("RASA_ENABLED")?.unwrap_or(defaults.nlu_enabled),
        };

        let threshold = env_number("NLU_CONFIDENCE_THRESHOLD")?
            .unwrap_or(defaults.nlu_confidence_threshold);
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ConfigError::OutOfRange {
                name: "NLU_CONFIDENCE_THRESHOLD",
                reason: format!("{} is not within 0.0..=1.0", threshold),
            });
        }

        let rate_limit_requests =
            env_number("RATE_LIMIT_REQUESTS")?.unwrap_or(defaults.rate_limit_requests);
        if rate_limit_requests == 0 {
            return Err(ConfigError::OutOfRange {
                name: "RATE_LIMIT_REQUESTS",
                reason: "must allow at least one request".to_string(),
            });
        }

        let rate_limit_window = env_number("RATE_LIMIT_WINDOW_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(defaults.rate_limit_window);
        if rate_limit_window.is_zero() {
            return Err(ConfigError::OutOfRange {
                name: "RATE_LIMIT_WINDOW_SECS",
                reason: "window must be at least one second".to_string(),
            });
        }

        let cors_allowed_origins = match env::var("CORS_ALLOWED_ORIGINS") {
            Ok(list) => list
                .split(',')
                .map(|origin| origin.trim().to_string())
                .filter(|origin| !origin.is_empty())
                .collect(),
            Err(_) => defaults.cors_allowed_origins,
        };

        Ok(Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: env_number("PORT")?.unwrap_or(defaults.port),
            debug: env_bool("DEBUG")?.unwrap_or(defaults.debug),
            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            nlu_enabled,
            nlu_url,
            nlu_timeout: env_number("NLU_TIMEOUT_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.nlu_timeout),
            nlu_confidence_threshold: threshold,
            rate_limit_requests,
            rate_limit_window,
            ip_rate_limit_requests: env_number("IP_RATE_LIMIT_REQUESTS")?
                .unwrap_or(defaults.ip_rate_limit_requests),
            ip_ban_duration: env_number("IP_BAN_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.ip_ban_duration),
            trust_proxy_headers: env_bool("TRUST_PROXY_HEADERS")?
                .unwrap_or(defaults.trust_proxy_headers),
            max_message_length: env_number("MAX_MESSAGE_LENGTH")?
                .unwrap_or(defaults.max_message_length),
            max_sender_id_length: env_number("MAX_SENDER_ID_LENGTH")?
                .unwrap_or(defaults.max_sender_id_length),
            max_response_length: env_number("MAX_RESPONSE_LENGTH")?
                .unwrap_or(defaults.max_response_length),
            cache_max_entries: env_number("CACHE_MAX_ENTRIES")?
                .unwrap_or(defaults.cache_max_entries),
            cache_ttl: env_number("CACHE_TTL_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.cache_ttl),
            jwt_secret: env::var("JWT_SECRET").ok().filter(|s| !s.is_empty()),
            cors_allowed_origins,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn uses_memory_store(&self) -> bool {
        self.database_url.is_empty() || self.database_url.eq_ignore_ascii_case("memory")
    }
}

fn env_number<T: std::str::FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidNumber { name, value }),
        _ => Ok(None),
    }
}

fn env_bool(name: &'static str) -> Result<Option<bool>, ConfigError> {
    match env::var(name) {
        Ok(value) => match value.trim().to_ascii_lowercase().as_str() {
            "" => Ok(None),
            "true" | "1" | "yes" => Ok(Some(true)),
            "false" | "0" | "no" => Ok(Some(false)),
            _ => Err(ConfigError::InvalidBool { name, value }),
        },
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_values() {
        let settings = Settings::default();
        assert_eq!(settings.rate_limit_requests, 100);
        assert_eq!(settings.rate_limit_window, Duration::from_secs(60));
        assert_eq!(settings.nlu_timeout, Duration::from_secs(5));
        assert_eq!(settings.max_message_length, 1000);
        assert!(!settings.nlu_enabled);
        assert!(!settings.trust_proxy_headers);
        assert_eq!(settings.ip_ban_duration, Duration::from_secs(900));
        assert_eq!(settings.bind_address(), "127.0.0.1:8000");
    }

    #[test]
    fn test_memory_store_selection() {
        let mut settings = Settings::default();
        assert!(!settings.uses_memory_store());
        settings.database_url = "memory".to_string();
        assert!(settings.uses_memory_store());
        settings.database_url = "MEMORY".to_string();
        assert!(settings.uses_memory_store());
    }
}
