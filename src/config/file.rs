//! TOML configuration file loading
//!
//! Supports `~/.config/framing-advisor/config.toml` as a persistent config source.
//! All fields are optional; the file is a partial overlay on top of defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct AdvisorConfigFile {
    /// Session store and turn handling
    #[serde(default)]
    pub advisor: AdvisorFileConfig,

    /// Oracle endpoint configuration
    #[serde(default)]
    pub oracle: OracleFileConfig,

    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerFileConfig,
}

/// Session store configuration
#[derive(Debug, Default, Deserialize)]
pub struct AdvisorFileConfig {
    /// Maximum history entries kept per session
    pub max_queue_length: Option<usize>,

    /// Idle timeout in seconds
    pub session_ttl_secs: Option<u64>,

    /// Number of lock shards
    pub shards: Option<usize>,

    /// Background sweep interval in seconds (unset = access-triggered only)
    pub sweep_interval_secs: Option<u64>,

    /// Log raw oracle replies at info level
    pub detailed_logging: Option<bool>,
}

/// Oracle configuration
#[derive(Debug, Default, Deserialize)]
pub struct OracleFileConfig {
    /// Base URL of the chat completions API
    pub base_url: Option<String>,

    /// Model identifier (e.g. "qwen-vl-max-latest")
    pub model: Option<String>,

    /// Sampling temperature
    pub temperature: Option<f64>,

    /// Maximum tokens in the reply
    pub max_tokens: Option<u32>,

    /// Request timeout in seconds
    pub timeout_secs: Option<u64>,

    /// API key (prefer the environment)
    pub api_key: Option<String>,

    /// Override for the system instruction
    pub system_prompt: Option<String>,
}

/// Server configuration
#[derive(Debug, Default, Deserialize)]
pub struct ServerFileConfig {
    /// Address to bind
    pub host: Option<String>,

    /// Port to listen on
    pub port: Option<u16>,

    /// Largest accepted request body in bytes
    pub max_body_bytes: Option<usize>,
}

/// Load the TOML config file
///
/// Uses `path` when given, otherwise the standard location. Returns
/// `AdvisorConfigFile::default()` if the file doesn't exist or can't be parsed.
pub fn load_config_file(path: Option<&Path>) -> AdvisorConfigFile {
    let Some(path) = path.map(Path::to_path_buf).or_else(config_file_path) else {
        return AdvisorConfigFile::default();
    };

    if !path.exists() {
        return AdvisorConfigFile::default();
    }

    match std::fs::read_to_string(&path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                AdvisorConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            AdvisorConfigFile::default()
        }
    }
}

/// Return the config file path: `~/.config/framing-advisor/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("dev", "omni", "framing-advisor")
        .map(|d| d.config_dir().join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_parses() {
        let fc: AdvisorConfigFile = toml::from_str(
            r#"
            [advisor]
            max_queue_length = 4

            [oracle]
            model = "gpt-4o"
            temperature = 0.3
            "#,
        )
        .unwrap();

        assert_eq!(fc.advisor.max_queue_length, Some(4));
        assert_eq!(fc.advisor.session_ttl_secs, None);
        assert_eq!(fc.oracle.model.as_deref(), Some("gpt-4o"));
        assert!(fc.server.port.is_none());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let fc = load_config_file(Some(Path::new("/nonexistent/framing-advisor.toml")));
        assert!(fc.advisor.max_queue_length.is_none());
    }

    #[test]
    fn test_unparsable_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "this is = = not toml").unwrap();

        let fc = load_config_file(Some(&path));

        assert!(fc.oracle.model.is_none());
    }

    #[test]
    fn test_file_is_read_from_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server]\nport = 9000\n").unwrap();

        let fc = load_config_file(Some(&path));

        assert_eq!(fc.server.port, Some(9000));
    }
}
