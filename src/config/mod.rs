//! Configuration management for the framing advisor

pub mod file;

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;

use crate::api::DEFAULT_MAX_BODY_BYTES;
use crate::prompt::SYSTEM_PROMPT;
use crate::session::{DEFAULT_MAX_QUEUE_LENGTH, DEFAULT_SESSION_TTL, DEFAULT_SHARDS, StoreConfig};
use crate::{Error, Result};

use file::AdvisorConfigFile;

/// `DashScope` OpenAI-compatible endpoint
pub const DEFAULT_BASE_URL: &str = "https://dashscope.aliyuncs.com/compatible-mode/v1";

/// Default vision model
pub const DEFAULT_MODEL: &str = "qwen-vl-max-latest";

/// Environment variable holding the oracle credential
pub const API_KEY_ENV: &str = "DASHSCOPE_API_KEY";

/// Framing advisor configuration
#[derive(Debug)]
pub struct Config {
    /// Session store and turn handling
    pub advisor: AdvisorConfig,

    /// Oracle endpoint
    pub oracle: OracleConfig,

    /// HTTP server
    pub server: ServerConfig,
}

/// Session store and turn handling configuration
#[derive(Debug, Clone)]
pub struct AdvisorConfig {
    /// Maximum history entries kept per session
    pub max_queue_length: usize,

    /// Idle timeout before a session is evicted
    pub session_ttl: Duration,

    /// Number of lock shards in the session store
    pub shards: usize,

    /// Optional background sweep interval
    pub sweep_interval: Option<Duration>,

    /// Log raw oracle replies at info level
    pub detailed_logging: bool,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            max_queue_length: DEFAULT_MAX_QUEUE_LENGTH,
            session_ttl: DEFAULT_SESSION_TTL,
            shards: DEFAULT_SHARDS,
            sweep_interval: None,
            detailed_logging: false,
        }
    }
}

impl AdvisorConfig {
    /// Session store parameters
    #[must_use]
    pub const fn store_config(&self) -> StoreConfig {
        StoreConfig {
            max_queue_length: self.max_queue_length,
            session_ttl: self.session_ttl,
            shards: self.shards,
        }
    }
}

/// Oracle endpoint configuration
#[derive(Debug)]
pub struct OracleConfig {
    /// Base URL of the chat completions API
    pub base_url: String,

    /// Model identifier
    pub model: String,

    /// Sampling temperature (low = more consistent)
    pub temperature: f64,

    /// Maximum tokens in the reply
    pub max_tokens: u32,

    /// Request timeout
    pub timeout: Duration,

    /// API credential; absent means every call is a configuration error
    pub api_key: Option<SecretString>,

    /// System instruction sent with every request
    pub system_prompt: String,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.1,
            max_tokens: 500,
            timeout: Duration::from_secs(60),
            api_key: None,
            system_prompt: SYSTEM_PROMPT.to_string(),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Largest accepted request body in bytes
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl Config {
    /// Load configuration (env > toml > default)
    ///
    /// # Errors
    ///
    /// Returns error if the resulting values are invalid
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let fc = file::load_config_file(path);
        Self::from_sources(fc, |key| std::env::var(key).ok())
    }

    /// Build configuration from a parsed file and an environment lookup
    ///
    /// # Errors
    ///
    /// Returns error if the resulting values are invalid
    pub fn from_sources(fc: AdvisorConfigFile, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = AdvisorConfig::default();
        let advisor = AdvisorConfig {
            max_queue_length: env_parse(&env, "FRAMING_MAX_QUEUE_LENGTH")
                .or(fc.advisor.max_queue_length)
                .unwrap_or(defaults.max_queue_length),
            session_ttl: env_parse(&env, "FRAMING_SESSION_TTL_SECS")
                .or(fc.advisor.session_ttl_secs)
                .map_or(defaults.session_ttl, Duration::from_secs),
            shards: fc.advisor.shards.unwrap_or(defaults.shards),
            sweep_interval: fc.advisor.sweep_interval_secs.map(Duration::from_secs),
            detailed_logging: env_flag(&env, "FRAMING_DETAILED_LOGGING")
                .or(fc.advisor.detailed_logging)
                .unwrap_or(defaults.detailed_logging),
        };

        let defaults = OracleConfig::default();
        let oracle = OracleConfig {
            base_url: env("FRAMING_ORACLE_URL")
                .or(fc.oracle.base_url)
                .unwrap_or(defaults.base_url),
            model: env("FRAMING_MODEL")
                .or(fc.oracle.model)
                .unwrap_or(defaults.model),
            temperature: fc.oracle.temperature.unwrap_or(defaults.temperature),
            max_tokens: fc.oracle.max_tokens.unwrap_or(defaults.max_tokens),
            timeout: fc
                .oracle
                .timeout_secs
                .map_or(defaults.timeout, Duration::from_secs),
            api_key: env(API_KEY_ENV)
                .filter(|k| !k.trim().is_empty())
                .or(fc.oracle.api_key)
                .filter(|k| !k.trim().is_empty())
                .map(SecretString::from),
            system_prompt: fc.oracle.system_prompt.unwrap_or(defaults.system_prompt),
        };

        let defaults = ServerConfig::default();
        let server = ServerConfig {
            host: env("FRAMING_HOST")
                .or(fc.server.host)
                .unwrap_or(defaults.host),
            port: env_parse(&env, "FRAMING_PORT")
                .or(fc.server.port)
                .unwrap_or(defaults.port),
            max_body_bytes: env_parse(&env, "FRAMING_MAX_BODY_BYTES")
                .or(fc.server.max_body_bytes)
                .unwrap_or(defaults.max_body_bytes),
        };

        let config = Self {
            advisor,
            oracle,
            server,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` describing the first invalid value
    pub fn validate(&self) -> Result<()> {
        if self.advisor.max_queue_length == 0 {
            return Err(Error::Config("max_queue_length must be at least 1".to_string()));
        }
        if self.advisor.shards == 0 {
            return Err(Error::Config("shards must be at least 1".to_string()));
        }
        if self.advisor.session_ttl.is_zero() {
            return Err(Error::Config("session_ttl must be positive".to_string()));
        }
        if self.advisor.sweep_interval.is_some_and(|d| d.is_zero()) {
            return Err(Error::Config("sweep_interval must be positive".to_string()));
        }
        if !(0.0..=2.0).contains(&self.oracle.temperature) {
            return Err(Error::Config(format!(
                "temperature must be within 0.0..=2.0, got {}",
                self.oracle.temperature
            )));
        }
        if self.oracle.timeout.is_zero() {
            return Err(Error::Config("oracle timeout must be positive".to_string()));
        }
        if self.server.max_body_bytes == 0 {
            return Err(Error::Config("max_body_bytes must be positive".to_string()));
        }
        Ok(())
    }
}

/// Parse an environment value, ignoring (with a warning) values that don't parse
fn env_parse<T: FromStr>(env: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = env(key)?;
    raw.trim().parse().map_or_else(
        |_| {
            tracing::warn!(key, value = %raw, "ignoring invalid environment value");
            None
        },
        Some,
    )
}

/// Read an on/off switch: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off`
fn env_flag(env: &impl Fn(&str) -> Option<String>, key: &str) -> Option<bool> {
    let raw = env(key)?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => {
            tracing::warn!(key, value = %raw, "ignoring invalid environment value");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn env_from(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn file(toml_src: &str) -> AdvisorConfigFile {
        toml::from_str(toml_src).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_sources(AdvisorConfigFile::default(), no_env).unwrap();

        assert_eq!(config.advisor.max_queue_length, 10);
        assert_eq!(config.advisor.session_ttl, Duration::from_secs(600));
        assert!(config.advisor.sweep_interval.is_none());
        assert_eq!(config.oracle.model, DEFAULT_MODEL);
        assert_eq!(config.oracle.max_tokens, 500);
        assert!((config.oracle.temperature - 0.1).abs() < f64::EPSILON);
        assert!(config.oracle.api_key.is_none());
        assert_eq!(config.server.port, 8000);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let fc = file(
            "[advisor]\nmax_queue_length = 3\nsweep_interval_secs = 30\n[server]\nport = 9100\n",
        );

        let config = Config::from_sources(fc, no_env).unwrap();

        assert_eq!(config.advisor.max_queue_length, 3);
        assert_eq!(config.advisor.sweep_interval, Some(Duration::from_secs(30)));
        assert_eq!(config.server.port, 9100);
    }

    #[test]
    fn test_env_overrides_file() {
        let fc = file("[advisor]\nmax_queue_length = 3\n[oracle]\nmodel = \"from-file\"\n");
        let env = env_from(&[
            ("FRAMING_MAX_QUEUE_LENGTH", "7"),
            ("FRAMING_MODEL", "from-env"),
            (API_KEY_ENV, "sk-test"),
        ]);

        let config = Config::from_sources(fc, env).unwrap();

        assert_eq!(config.advisor.max_queue_length, 7);
        assert_eq!(config.oracle.model, "from-env");
        assert_eq!(
            config.oracle.api_key.as_ref().map(|k| k.expose_secret()),
            Some("sk-test")
        );
    }

    #[test]
    fn test_invalid_env_value_falls_through() {
        let fc = file("[advisor]\nmax_queue_length = 5\n");
        let env = env_from(&[("FRAMING_MAX_QUEUE_LENGTH", "lots")]);

        let config = Config::from_sources(fc, env).unwrap();

        assert_eq!(config.advisor.max_queue_length, 5);
    }

    #[test]
    fn test_detailed_logging_flag_spellings() {
        for (value, expected) in [("1", true), ("YES", true), ("on", true), ("0", false), ("no", false)] {
            let fc = file(&format!("[advisor]\ndetailed_logging = {}\n", !expected));
            let lookup = |key: &str| (key == "FRAMING_DETAILED_LOGGING").then(|| value.to_string());

            let config = Config::from_sources(fc, lookup).unwrap();

            assert_eq!(config.advisor.detailed_logging, expected, "{value}");
        }
    }

    #[test]
    fn test_unknown_flag_falls_through_to_file() {
        let fc = file("[advisor]\ndetailed_logging = true\n");
        let env = env_from(&[("FRAMING_DETAILED_LOGGING", "maybe")]);

        let config = Config::from_sources(fc, env).unwrap();

        assert!(config.advisor.detailed_logging);
    }

    #[test]
    fn test_body_limit_layers() {
        let config = Config::from_sources(AdvisorConfigFile::default(), no_env).unwrap();
        assert_eq!(config.server.max_body_bytes, DEFAULT_MAX_BODY_BYTES);

        let fc = file("[server]\nmax_body_bytes = 1048576\n");
        let config = Config::from_sources(fc, no_env).unwrap();
        assert_eq!(config.server.max_body_bytes, 1_048_576);

        let fc = file("[server]\nmax_body_bytes = 1048576\n");
        let env = env_from(&[("FRAMING_MAX_BODY_BYTES", "4096")]);
        let config = Config::from_sources(fc, env).unwrap();
        assert_eq!(config.server.max_body_bytes, 4096);
    }

    #[test]
    fn test_zero_body_limit_rejected() {
        let fc = file("[server]\nmax_body_bytes = 0\n");

        assert!(Config::from_sources(fc, no_env).is_err());
    }

    #[test]
    fn test_blank_api_key_is_absent() {
        let env = env_from(&[(API_KEY_ENV, "  ")]);

        let config = Config::from_sources(AdvisorConfigFile::default(), env).unwrap();

        assert!(config.oracle.api_key.is_none());
    }

    #[test]
    fn test_zero_queue_length_rejected() {
        let fc = file("[advisor]\nmax_queue_length = 0\n");

        let err = Config::from_sources(fc, no_env).unwrap_err();

        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_out_of_range_temperature_rejected() {
        let fc = file("[oracle]\ntemperature = 3.5\n");

        assert!(Config::from_sources(fc, no_env).is_err());
    }

    #[test]
    fn test_zero_sweep_interval_rejected() {
        let fc = file("[advisor]\nsweep_interval_secs = 0\n");

        assert!(Config::from_sources(fc, no_env).is_err());
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let env = env_from(&[(API_KEY_ENV, "sk-hidden-value")]);
        let config = Config::from_sources(AdvisorConfigFile::default(), env).unwrap();

        assert!(!format!("{config:?}").contains("sk-hidden-value"));
    }

    #[test]
    fn test_store_config_mirrors_advisor() {
        let advisor = AdvisorConfig {
            max_queue_length: 4,
            shards: 2,
            ..AdvisorConfig::default()
        };

        let store = advisor.store_config();

        assert_eq!(store.max_queue_length, 4);
        assert_eq!(store.shards, 2);
        assert_eq!(store.session_ttl, DEFAULT_SESSION_TTL);
    }
}
