use anyhow::{bail, Context, Result};
use rand::Rng;
use std::env;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_MODEL: &str = "grok-4";
const DEFAULT_API_URL: &str = "https://api.x.ai/v1/chat/completions";

// Process-wide settings, read once at startup and never mutated
#[derive(Debug, Clone)]
pub struct Config {
    pub site_password: Option<String>,
    pub api_key: Option<String>,
    pub model: String,
    pub api_url: String,
    pub host: String,
    pub port: u16,
    pub production: bool,
    pub max_body_bytes: usize,
    pub connect_timeout: Duration,
    /// Bound on waiting for the provider's headers and its first body chunk.
    pub response_timeout: Duration,
    pub mock_delay: MockDelay,
}

/// Bounds of the pause inserted between mock words, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockDelay {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl MockDelay {
    pub const NONE: MockDelay = MockDelay { min_ms: 0, max_ms: 0 };

    pub fn sample(&self) -> Duration {
        if self.max_ms == 0 {
            return Duration::ZERO;
        }
        let ms = rand::thread_rng().gen_range(self.min_ms..=self.max_ms);
        Duration::from_millis(ms)
    }
}

impl Default for MockDelay {
    fn default() -> Self {
        MockDelay { min_ms: 50, max_ms: 150 }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key).filter(|v| !v.trim().is_empty())
        };

        let site_password = get("SITE_PASSWORD").or_else(|| get("BASIC_AUTH_PASS"));
        let api_key = get("XAI_API_KEY");
        let model = get("XAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let api_url = get("XAI_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let host = get("HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let production = get("APP_ENV")
            .map(|v| v.eq_ignore_ascii_case("production"))
            .unwrap_or(false);

        let port = parse_or(get("PORT"), "PORT", 3000u16)?;
        let max_body_bytes = parse_or(get("MAX_BODY_BYTES"), "MAX_BODY_BYTES", 2 * 1024 * 1024usize)?;
        let connect_timeout_secs = parse_or(
            get("UPSTREAM_CONNECT_TIMEOUT_SECS"),
            "UPSTREAM_CONNECT_TIMEOUT_SECS",
            10u64,
        )?;
        let response_timeout_secs = parse_or(
            get("UPSTREAM_RESPONSE_TIMEOUT_SECS"),
            "UPSTREAM_RESPONSE_TIMEOUT_SECS",
            30u64,
        )?;

        let defaults = MockDelay::default();
        let mock_delay = MockDelay {
            min_ms: parse_or(get("MOCK_DELAY_MIN_MS"), "MOCK_DELAY_MIN_MS", defaults.min_ms)?,
            max_ms: parse_or(get("MOCK_DELAY_MAX_MS"), "MOCK_DELAY_MAX_MS", defaults.max_ms)?,
        };
        if mock_delay.min_ms > mock_delay.max_ms {
            bail!(
                "MOCK_DELAY_MIN_MS ({}) must not exceed MOCK_DELAY_MAX_MS ({})",
                mock_delay.min_ms,
                mock_delay.max_ms
            );
        }

        Ok(Self {
            site_password,
            api_key,
            model,
            api_url,
            host,
            port,
            production,
            max_body_bytes,
            connect_timeout: Duration::from_secs(connect_timeout_secs),
            response_timeout: Duration::from_secs(response_timeout_secs),
            mock_delay,
        })
    }

    pub fn environment(&self) -> &'static str {
        if self.production {
            "production"
        } else {
            "development"
        }
    }
}

fn parse_or<T>(value: Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match value {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("invalid value for {}: {:?}", key, raw)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.site_password, None);
        assert_eq!(config.api_key, None);
        assert_eq!(config.model, "grok-4");
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.port, 3000);
        assert!(!config.production);
        assert_eq!(config.max_body_bytes, 2 * 1024 * 1024);
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.response_timeout, Duration::from_secs(30));
        assert_eq!(config.mock_delay, MockDelay { min_ms: 50, max_ms: 150 });
    }

    #[test]
    fn basic_auth_pass_is_a_fallback_for_site_password() {
        let config = config_from(&[("BASIC_AUTH_PASS", "legacy")]).unwrap();
        assert_eq!(config.site_password.as_deref(), Some("legacy"));

        let config = config_from(&[("SITE_PASSWORD", "primary"), ("BASIC_AUTH_PASS", "legacy")]).unwrap();
        assert_eq!(config.site_password.as_deref(), Some("primary"));
    }

    #[test]
    fn empty_values_count_as_unset() {
        let config = config_from(&[("SITE_PASSWORD", ""), ("XAI_API_KEY", "  ")]).unwrap();
        assert_eq!(config.site_password, None);
        assert_eq!(config.api_key, None);
    }

    #[test]
    fn production_flag_is_case_insensitive() {
        let config = config_from(&[("APP_ENV", "Production")]).unwrap();
        assert!(config.production);
        assert_eq!(config.environment(), "production");
    }

    #[test]
    fn invalid_numbers_are_rejected() {
        let err = config_from(&[("PORT", "eighty")]).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn upstream_timeouts_are_configurable() {
        let config = config_from(&[
            ("UPSTREAM_CONNECT_TIMEOUT_SECS", "3"),
            ("UPSTREAM_RESPONSE_TIMEOUT_SECS", "7"),
        ])
        .unwrap();
        assert_eq!(config.connect_timeout, Duration::from_secs(3));
        assert_eq!(config.response_timeout, Duration::from_secs(7));
    }

    #[test]
    fn inverted_mock_delay_bounds_are_rejected() {
        assert!(config_from(&[("MOCK_DELAY_MIN_MS", "200"), ("MOCK_DELAY_MAX_MS", "100")]).is_err());
    }

    #[test]
    fn mock_delay_sample_stays_in_bounds() {
        let delay = MockDelay { min_ms: 5, max_ms: 9 };
        for _ in 0..50 {
            let d = delay.sample();
            assert!(d >= Duration::from_millis(5) && d <= Duration::from_millis(9));
        }
        assert_eq!(MockDelay::NONE.sample(), Duration::ZERO);
    }
}
