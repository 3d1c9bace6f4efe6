use anyhow::Result;
use chrono_tz::Tz;
use std::env;
use std::time::Duration;
use crate::constants::{
    DEFAULT_COMPATIBILITY_CACHE_TTL_SECS, DEFAULT_SERVER_PORT, DEFAULT_SWIPE_THRESHOLD_PX,
    DEFAULT_TIMEZONE,
};
use crate::engine::{CachePolicy, EngineSettings};

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub swipe_threshold_px: f64,
    /// `None` keeps compatibility scores for the life of the process.
    pub compatibility_cache_ttl: Option<Duration>,
    pub timezone: Tz,
    /// CORS origins; empty allows any origin.
    pub allowed_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key/value source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let ttl_secs: u64 = lookup("COMPATIBILITY_CACHE_TTL_SECS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_COMPATIBILITY_CACHE_TTL_SECS);

        let timezone_name = lookup("APP_TIMEZONE").unwrap_or_else(|| DEFAULT_TIMEZONE.to_string());
        let timezone: Tz = timezone_name
            .parse()
            .map_err(|_| anyhow::anyhow!("APP_TIMEZONE '{}' is not an IANA time zone", timezone_name))?;

        let swipe_threshold_px = lookup("SWIPE_THRESHOLD_PX")
            .and_then(|v| v.parse::<f64>().ok())
            .filter(|v| v.is_finite() && *v > 0.0)
            .unwrap_or(DEFAULT_SWIPE_THRESHOLD_PX);

        Ok(Self {
            database_url: lookup("DATABASE_URL")
                .ok_or_else(|| anyhow::anyhow!("DATABASE_URL must be set"))?,
            port: lookup("PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_SERVER_PORT),
            swipe_threshold_px,
            compatibility_cache_ttl: (ttl_secs > 0).then(|| Duration::from_secs(ttl_secs)),
            timezone,
            allowed_origins: lookup("ALLOWED_ORIGINS")
                .map(|origins| {
                    origins
                        .split(',')
                        .map(str::trim)
                        .filter(|origin| !origin.is_empty())
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_default(),
        })
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            cache_policy: match self.compatibility_cache_ttl {
                Some(ttl) => CachePolicy::Ttl(ttl),
                None => CachePolicy::Unbounded,
            },
            timezone: self.timezone,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://localhost/swipes")])).unwrap();
        assert_eq!(config.port, DEFAULT_SERVER_PORT);
        assert_eq!(config.swipe_threshold_px, DEFAULT_SWIPE_THRESHOLD_PX);
        assert_eq!(config.compatibility_cache_ttl, Some(Duration::from_secs(300)));
        assert_eq!(config.timezone, chrono_tz::UTC);
        assert!(config.allowed_origins.is_empty());
    }

    #[test]
    fn test_allowed_origins_split() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/swipes"),
            ("ALLOWED_ORIGINS", "https://app.example.com, ,https://admin.example.com"),
        ]))
        .unwrap();
        assert_eq!(
            config.allowed_origins,
            vec!["https://app.example.com".to_string(), "https://admin.example.com".to_string()]
        );
    }

    #[test]
    fn test_zero_ttl_means_unbounded() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/swipes"),
            ("COMPATIBILITY_CACHE_TTL_SECS", "0"),
        ]))
        .unwrap();
        assert_eq!(config.compatibility_cache_ttl, None);
        assert_eq!(config.engine_settings().cache_policy, CachePolicy::Unbounded);
    }

    #[test]
    fn test_missing_database_url() {
        assert!(Config::from_lookup(lookup_from(&[])).is_err());
    }

    #[test]
    fn test_invalid_timezone_rejected() {
        let result = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/swipes"),
            ("APP_TIMEZONE", "Mars/Olympus_Mons"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn test_negative_threshold_falls_back() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/swipes"),
            ("SWIPE_THRESHOLD_PX", "-20"),
            ("APP_TIMEZONE", "Europe/Berlin"),
        ]))
        .unwrap();
        assert_eq!(config.swipe_threshold_px, DEFAULT_SWIPE_THRESHOLD_PX);
        assert_eq!(config.timezone, chrono_tz::Europe::Berlin);
    }
}
